//! CRM integration: owner credentials and best-effort contact updates.

pub mod client;
pub mod credentials;

pub use client::{CrmClient, DEFAULT_CRM_BASE_URL, HttpCrmClient, spawn_contact_update};
pub use credentials::OwnerKeys;
