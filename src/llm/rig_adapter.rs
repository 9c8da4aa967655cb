//! Bridges rig-core's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::CompletionModel;
use rig::message::{AssistantContent, Message};

use crate::error::LlmError;
use crate::llm::provider::{CompletionRequest, CompletionResponse, LlmProvider, Role};

/// Anthropic's API rejects requests without an explicit token budget.
const DEFAULT_MAX_TOKENS: u64 = 1024;

/// Adapter wrapping any rig completion model.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
        }
    }
}

/// Split our chat messages into rig's preamble, history and final prompt.
fn split_messages(request: &CompletionRequest) -> (Option<String>, Vec<Message>, Option<String>) {
    let system: Vec<&str> = request
        .messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();
    let preamble = (!system.is_empty()).then(|| system.join("\n\n"));

    let mut turns: Vec<_> = request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .collect();

    let ends_with_user = turns.last().is_some_and(|m| m.role == Role::User);
    let prompt = if ends_with_user {
        turns.pop().map(|m| m.content.clone())
    } else {
        None
    };

    let history = turns
        .into_iter()
        .map(|m| match m.role {
            Role::Assistant => Message::assistant(m.content.clone()),
            _ => Message::user(m.content.clone()),
        })
        .collect();

    (preamble, history, prompt)
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let (preamble, history, prompt) = split_messages(&request);
        let prompt = prompt.ok_or_else(|| LlmError::InvalidRequest {
            reason: "request must end with a user message".to_string(),
        })?;

        let mut builder = self.model.completion_request(prompt);
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        for message in history {
            builder = builder.message(message);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        let max_tokens = request.max_tokens.map_or(DEFAULT_MAX_TOKENS, u64::from);
        builder = builder.max_tokens(max_tokens);

        let response = builder.send().await.map_err(|e| LlmError::RequestFailed {
            provider: self.model_name.clone(),
            reason: e.to_string(),
        })?;

        let content: String = response
            .choice
            .iter()
            .filter_map(|c| match c {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if content.trim().is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.model_name.clone(),
                reason: "completion contained no text".to_string(),
            });
        }

        Ok(CompletionResponse {
            content,
            input_tokens: u32::try_from(response.usage.input_tokens).unwrap_or(u32::MAX),
            output_tokens: u32::try_from(response.usage.output_tokens).unwrap_or(u32::MAX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::ChatMessage;

    #[test]
    fn split_moves_system_to_preamble() {
        let request = CompletionRequest::new(vec![
            ChatMessage::system("You categorize SMS replies."),
            ChatMessage::user("SMS response: \"not now\""),
        ]);
        let (preamble, history, prompt) = split_messages(&request);
        assert_eq!(preamble.as_deref(), Some("You categorize SMS replies."));
        assert!(history.is_empty());
        assert_eq!(prompt.as_deref(), Some("SMS response: \"not now\""));
    }

    #[test]
    fn split_keeps_prior_turns_as_history() {
        let request = CompletionRequest::new(vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("New"),
            ChatMessage::user("second"),
        ]);
        let (preamble, history, prompt) = split_messages(&request);
        assert!(preamble.is_none());
        assert_eq!(history.len(), 2);
        assert_eq!(prompt.as_deref(), Some("second"));
    }

    #[test]
    fn split_without_trailing_user_has_no_prompt() {
        let request = CompletionRequest::new(vec![
            ChatMessage::system("sys"),
            ChatMessage::assistant("hi"),
        ]);
        let (_, history, prompt) = split_messages(&request);
        assert!(prompt.is_none());
        assert_eq!(history.len(), 1);
    }
}
