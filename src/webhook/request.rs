//! Webhook request parsing and validation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::categorize::Category;
use crate::error::ApiError;

/// A validated categorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizeRequest {
    pub message: String,
    pub contact_id: String,
    pub owner_id: String,
}

/// Successful categorization response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizeResponse {
    pub status: String,
    pub message: String,
    pub category: Category,
    pub contact_id: String,
    pub owner_id: String,
}

impl CategorizeResponse {
    pub fn success(request: CategorizeRequest, category: Category) -> Self {
        Self {
            status: "success".to_string(),
            message: request.message,
            category,
            contact_id: request.contact_id,
            owner_id: request.owner_id,
        }
    }
}

/// How a field resolved across the JSON body and the query string.
#[derive(Debug, PartialEq, Eq)]
enum Field {
    Missing,
    Blank,
    Present(String),
}

/// One required field and its two distinct rejection messages.
struct RequiredField {
    name: &'static str,
    missing: &'static str,
    blank: &'static str,
}

const MESSAGE: RequiredField = RequiredField {
    name: "message",
    missing: "Please provide a 'message'",
    blank: "Please provide a non-empty 'message'",
};

const CONTACT_ID: RequiredField = RequiredField {
    name: "contactId",
    missing: "Please provide a 'contactId'",
    blank: "Please provide a valid 'contactId'",
};

const OWNER_ID: RequiredField = RequiredField {
    name: "ownerId",
    missing: "Please provide an 'ownerId'",
    blank: "Please provide a non-empty 'ownerId'",
};

impl CategorizeRequest {
    /// Parse from a raw body and query parameters.
    ///
    /// An empty body is treated as `{}` so query-only requests work. Each
    /// field takes the body value when it is a non-blank string or number,
    /// otherwise the query parameter of the same name.
    pub fn parse(body: &[u8], query: &HashMap<String, String>) -> Result<Self, ApiError> {
        let body = parse_body(body)?;

        Ok(Self {
            message: require(&body, query, &MESSAGE)?,
            contact_id: require(&body, query, &CONTACT_ID)?,
            owner_id: require(&body, query, &OWNER_ID)?,
        })
    }
}

fn parse_body(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ApiError::InvalidJson),
    }
}

fn require(
    body: &Map<String, Value>,
    query: &HashMap<String, String>,
    field: &RequiredField,
) -> Result<String, ApiError> {
    match resolve(body, query, field.name) {
        Field::Present(value) => Ok(value),
        Field::Blank => Err(ApiError::EmptyField(field.blank)),
        Field::Missing => Err(ApiError::MissingField(field.missing)),
    }
}

fn resolve(body: &Map<String, Value>, query: &HashMap<String, String>, name: &str) -> Field {
    let from_body = match body.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        // Present but unusable.
        Some(_) => Some(String::new()),
    };
    let from_query = query.get(name).cloned();

    if from_body.is_none() && from_query.is_none() {
        return Field::Missing;
    }
    [from_body, from_query]
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
        .map_or(Field::Blank, Field::Present)
}
