//! CRM contact updates: HTTP client and background dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::categorize::Category;
use crate::error::CrmError;

/// Default CRM API base URL.
pub const DEFAULT_CRM_BASE_URL: &str = "https://app.getbonzo.com/api/v3";

/// Custom field the category is written to.
const CATEGORY_FIELD: &str = "sms_category";

/// Custom field recording when the category was assigned.
const CATEGORIZED_AT_FIELD: &str = "sms_categorized_at";

/// Writes a lead's category onto its CRM contact record.
#[async_trait]
pub trait CrmClient: Send + Sync {
    async fn update_contact_category(
        &self,
        api_key: &SecretString,
        contact_id: &str,
        category: Category,
    ) -> Result<(), CrmError>;
}

/// CRM client speaking the prospects REST API.
pub struct HttpCrmClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCrmClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// `{base_url}/prospects/{contact_id}` with the id path-escaped.
    fn contact_url(&self, contact_id: &str) -> Result<reqwest::Url, CrmError> {
        let invalid = |reason: String| CrmError::RequestFailed {
            contact_id: contact_id.to_string(),
            reason,
        };

        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| invalid(format!("invalid CRM base URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| invalid(format!("CRM base URL {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push("prospects")
            .push(contact_id);
        Ok(url)
    }
}

#[async_trait]
impl CrmClient for HttpCrmClient {
    async fn update_contact_category(
        &self,
        api_key: &SecretString,
        contact_id: &str,
        category: Category,
    ) -> Result<(), CrmError> {
        let url = self.contact_url(contact_id)?;
        let body = serde_json::json!({
            "custom_fields": {
                CATEGORY_FIELD: category.label(),
                CATEGORIZED_AT_FIELD: Utc::now().to_rfc3339(),
            }
        });

        let resp = self
            .client
            .put(url)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| CrmError::RequestFailed {
                contact_id: contact_id.to_string(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CrmError::UpdateFailed {
                contact_id: contact_id.to_string(),
                status,
                body,
            });
        }

        Ok(())
    }
}

/// Update the contact on a background task.
///
/// Failures are logged and never reach the webhook caller.
pub fn spawn_contact_update(
    crm: Arc<dyn CrmClient>,
    api_key: Arc<SecretString>,
    contact_id: String,
    category: Category,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(contact_id = %contact_id, category = %category, "Updating CRM contact");
        match crm
            .update_contact_category(&api_key, &contact_id, category)
            .await
        {
            Ok(()) => {
                info!(contact_id = %contact_id, category = %category, "Updated CRM contact")
            }
            Err(e) => error!(contact_id = %contact_id, error = %e, "Error updating CRM contact"),
        }
    })
}
