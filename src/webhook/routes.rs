//! HTTP endpoints for SMS categorization and health.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::request::{CategorizeRequest, CategorizeResponse};
use crate::categorize::Categorizer;
use crate::crm::{CrmClient, OwnerKeys, spawn_contact_update};
use crate::error::ApiError;

/// Service name reported by the health probe.
const SERVICE_NAME: &str = "sms-categorizer";

/// Shared state for webhook routes.
#[derive(Clone)]
pub struct WebhookState {
    pub categorizer: Arc<Categorizer>,
    pub owner_keys: Arc<OwnerKeys>,
    pub crm: Arc<dyn CrmClient>,
}

/// GET|POST /api/categorize_sms
///
/// Validates the request, classifies the message and answers with the
/// category. The CRM contact is updated on a background task.
async fn categorize_sms(
    State(state): State<WebhookState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<CategorizeResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    info!(%request_id, "Processing SMS categorization request");

    let request = CategorizeRequest::parse(&body, &query).inspect_err(|e| {
        warn!(%request_id, error = %e, "Rejected categorization request");
    })?;

    let Some(api_key) = state.owner_keys.get(&request.owner_id) else {
        warn!(%request_id, owner_id = %request.owner_id, "Unknown owner id");
        return Err(ApiError::UnknownOwner);
    };

    let categorizer = Arc::clone(&state.categorizer);
    let message = request.message.clone();
    let category = tokio::spawn(async move { categorizer.categorize(&message).await })
        .await
        .map_err(|e| {
            error!(%request_id, error = %e, "Categorization task failed");
            ApiError::Internal {
                details: e.to_string(),
            }
        })?;

    info!(
        %request_id,
        contact_id = %request.contact_id,
        category = %category,
        "Categorized SMS"
    );

    spawn_contact_update(
        Arc::clone(&state.crm),
        api_key,
        request.contact_id.clone(),
        category,
    );

    Ok(Json(CategorizeResponse::success(request, category)))
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "service": SERVICE_NAME}))
}

/// Build the webhook routes.
pub fn webhook_routes(state: WebhookState) -> Router {
    Router::new()
        .route("/api/categorize_sms", get(categorize_sms).post(categorize_sms))
        .route("/health", get(health))
        .with_state(state)
}
