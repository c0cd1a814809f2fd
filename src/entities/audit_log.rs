// 🧾 Audit Log - append-only record of who did what to which resource
//
// Written by callers as a follow-up to an operation, never inside the
// operation's own transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{generate_id, Document};
use crate::schema::{Checker, Validate, ValidationResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub log_id: String,
    /// Actor; None for system actions.
    #[serde(default)]
    pub user_firebase_uid: Option<String>,
    pub action: String,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default = "empty_object")]
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

fn empty_object() -> serde_json::Value {
    serde_json::json!({})
}

impl AuditLog {
    pub fn new(action: impl Into<String>) -> Self {
        AuditLog {
            log_id: generate_id("log"),
            user_firebase_uid: None,
            action: action.into(),
            resource_type: None,
            resource_id: None,
            metadata: empty_object(),
            timestamp: Utc::now(),
        }
    }

    pub fn by(mut self, user_firebase_uid: impl Into<String>) -> Self {
        self.user_firebase_uid = Some(user_firebase_uid.into());
        self
    }

    pub fn on(mut self, resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

impl Validate for AuditLog {
    fn validate(&self) -> ValidationResult {
        Checker::new(Self::COLLECTION)
            .required("log_id", &self.log_id)
            .required("action", &self.action)
            .check(
                self.metadata.is_object(),
                "metadata",
                "Must be a JSON object",
            )
            .finish()
    }
}

impl Document for AuditLog {
    const COLLECTION: &'static str = "audit_logs";
    const KEY: &'static str = "log_id";

    fn key(&self) -> &str {
        &self.log_id
    }
}

/// Equality filters for audit log queries; unset fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLogFilter {
    pub user_firebase_uid: Option<String>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
}

impl AuditLogFilter {
    pub fn for_resource(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        AuditLogFilter {
            resource_type: Some(resource_type.into()),
            resource_id: Some(resource_id.into()),
            ..AuditLogFilter::default()
        }
    }
}
