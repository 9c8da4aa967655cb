//! Language model access for the categorizer.
//!
//! The categorizer only sees `LlmProvider`. In production it is backed by a
//! rig-core Anthropic completion model through `RigAdapter`.

pub mod provider;
mod rig_adapter;

pub use provider::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role};
pub use rig_adapter::RigAdapter;

use std::sync::Arc;

use rig::client::CompletionClient;
use rig::providers::anthropic;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::error::LlmError;

/// Build the Anthropic-backed categorization model.
///
/// Key validity is only checked by the first request.
pub fn anthropic_provider(
    api_key: &SecretString,
    model: &str,
) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let client: rig::client::Client<anthropic::client::AnthropicExt> =
        anthropic::Client::new(api_key.expose_secret()).map_err(|e| LlmError::RequestFailed {
            provider: "anthropic".to_string(),
            reason: format!("client setup failed: {e}"),
        })?;

    info!(model, "Categorization model ready");
    Ok(Arc::new(RigAdapter::new(client.completion_model(model), model)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anthropic_provider_reports_model_name() {
        let provider =
            anthropic_provider(&SecretString::from("test-key"), "claude-3-5-haiku-latest").unwrap();
        assert_eq!(provider.model_name(), "claude-3-5-haiku-latest");
    }
}
