//! Owner → CRM API key lookup.

use std::collections::HashMap;
use std::sync::Arc;

use secrecy::SecretString;

use crate::error::ConfigError;

/// CRM API keys indexed by lead owner id.
#[derive(Default)]
pub struct OwnerKeys {
    keys: HashMap<String, Arc<SecretString>>,
}

impl OwnerKeys {
    /// Parse a JSON object of `{"owner_id": "api_key", ...}`.
    ///
    /// Entries with a blank owner id or key are skipped.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let parsed: HashMap<String, String> =
            serde_json::from_str(raw).map_err(|e| ConfigError::InvalidValue {
                key: "BONZO_API_KEYS".to_string(),
                message: format!("expected a JSON object of owner id to API key: {e}"),
            })?;

        Ok(parsed.into_iter().collect())
    }

    /// API key for an owner, or `None` if the owner is unknown.
    pub fn get(&self, owner_id: &str) -> Option<Arc<SecretString>> {
        self.keys.get(owner_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<(String, String)> for OwnerKeys {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let keys = iter
            .into_iter()
            .filter(|(owner, key)| !owner.trim().is_empty() && !key.trim().is_empty())
            .map(|(owner, key)| (owner, Arc::new(SecretString::from(key))))
            .collect();
        Self { keys }
    }
}

impl std::fmt::Debug for OwnerKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut owners: Vec<&str> = self.keys.keys().map(String::as_str).collect();
        owners.sort_unstable();
        f.debug_struct("OwnerKeys").field("owners", &owners).finish()
    }
}
