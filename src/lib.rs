//! SMS Categorizer: classifies inbound lead replies and tags CRM contacts.

pub mod categorize;
pub mod config;
pub mod crm;
pub mod error;
pub mod llm;
pub mod rate_limiter;
pub mod webhook;
