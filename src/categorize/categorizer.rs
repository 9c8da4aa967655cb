//! SMS categorizer: asks the LLM to place a lead's reply in the sales funnel.
//!
//! Flow:
//! 1. Cache lookup (exact message text)
//! 2. Rate limiter admission
//! 3. LLM completion → label parsing
//!
//! `categorize()` never fails: any error degrades to `Uncategorized`.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::rate_limiter::RateLimiter;

use super::cache::CategoryCache;
use super::category::Category;

/// Labels are short; keep the budget tight.
const CATEGORIZE_MAX_TOKENS: u32 = 32;

/// Deterministic classification.
const CATEGORIZE_TEMPERATURE: f32 = 0.0;

/// Max characters of the SMS sent to the model.
const MAX_MESSAGE_CHARS: usize = 1600;

/// Classifies inbound SMS replies into sales-funnel categories.
pub struct Categorizer {
    llm: Arc<dyn LlmProvider>,
    limiter: Arc<RateLimiter>,
    cache: CategoryCache,
}

impl Categorizer {
    /// Create a categorizer sharing the process-wide rate limiter.
    pub fn new(llm: Arc<dyn LlmProvider>, limiter: Arc<RateLimiter>, cache: CategoryCache) -> Self {
        Self {
            llm,
            limiter,
            cache,
        }
    }

    pub fn cache(&self) -> &CategoryCache {
        &self.cache
    }

    /// Categorize a message, falling back to `Uncategorized` on any failure.
    pub async fn categorize(&self, message: &str) -> Category {
        if let Some(category) = self.cache.get(message) {
            debug!(category = %category, "Category cache hit");
            return category;
        }

        match self.classify(message).await {
            Ok(category) => {
                self.cache.insert(message, category);
                category
            }
            Err(e) => {
                error!(error = %e, "Error during SMS categorization");
                Category::Uncategorized
            }
        }
    }

    /// Call the LLM under the rate limiter. Errors are returned to the caller.
    pub async fn classify(&self, message: &str) -> Result<Category, LlmError> {
        self.limiter.acquire().await;

        let request = CompletionRequest::new(vec![
            ChatMessage::system(build_system_prompt()),
            ChatMessage::user(build_user_prompt(message)),
        ])
        .with_temperature(CATEGORIZE_TEMPERATURE)
        .with_max_tokens(CATEGORIZE_MAX_TOKENS);

        let response = self.llm.complete(request).await.inspect_err(|e| {
            error!(model = self.llm.model_name(), error = %e, "Error calling categorization model");
        })?;

        let category =
            Category::parse_label(&response.content).ok_or_else(|| LlmError::UnknownCategory {
                model: self.llm.model_name().to_string(),
                raw: response.content.trim().to_string(),
            })?;

        info!(
            category = %category,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Message categorized"
        );
        Ok(category)
    }
}

// ── Prompt construction ─────────────────────────────────────────────

/// Build the categorization system prompt.
fn build_system_prompt() -> String {
    let mut prompt = String::with_capacity(2048);
    prompt.push_str(
        "You are an AI assistant for a competitive mortgage sales brokerage. \
         Categorize the SMS response from a potential lead into exactly one of these categories:\n",
    );
    for category in Category::ALL {
        prompt.push_str(&format!("- {}\n", category.label()));
    }
    prompt.push_str(
        "\nGuidelines:\n\
         - 'Working With Someone Else' should be used when the lead explicitly mentions they're working with another lender, regardless of their tone.\n\
         - 'Not Interested' is for responses that indicate hostility or a very clear, firm rejection that would make further outreach potentially negative.\n\
         - 'Garden Lead - Send Quote' is for leads who express disinterest but aren't hostile. This allows for one final automated text with our best rates.\n\
         - Prioritize 'Ask For LE / Already In Process' for any hint of ongoing process or interest in rates.\n\
         - 'Hard DNC Language' only for explicit, unambiguous opt-out requests.\n\
         - For ambiguous responses, prefer categories that allow for follow-up.\n\
         - 'Spanish' for responses in Spanish, regardless of content.\n\n\
         Respond with ONLY the category name, exactly as written above.",
    );
    prompt
}

/// Build the user prompt carrying the SMS text.
fn build_user_prompt(message: &str) -> String {
    let preview: String = message.chars().take(MAX_MESSAGE_CHARS).collect();
    format!("SMS response: \"{}\"\n\nCategory:", preview)
}
