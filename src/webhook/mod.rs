//! Inbound SMS webhook.

pub mod request;
pub mod routes;

pub use request::{CategorizeRequest, CategorizeResponse};
pub use routes::{WebhookState, webhook_routes};
