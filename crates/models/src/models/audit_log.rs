use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    View,
}

/// Kind of record an audit entry refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuditEntityType {
    Job,
    Customer,
    Personnel,
    Equipment,
}

/// Audit log entry handed to the audit store
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateAuditLog {
    pub organization_id: i32,
    pub user_id: i32,
    pub action: AuditAction,
    pub entity_type: AuditEntityType,
    pub entity_id: i32,
    pub entity_name: Option<String>,
    pub changes: Option<String>, // JSON-serialized payload
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl CreateAuditLog {
    /// Entry recording that a user looked at (or computed something for) a job
    pub fn job_view(
        organization_id: i32,
        user_id: i32,
        job_id: i32,
        entity_name: impl Into<String>,
        changes: Option<String>,
    ) -> Self {
        Self {
            organization_id,
            user_id,
            action: AuditAction::View,
            entity_type: AuditEntityType::Job,
            entity_id: job_id,
            entity_name: Some(entity_name.into()),
            changes,
            ip_address: None,
            user_agent: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    /// Parse the `changes` JSON into a typed payload
    pub fn parsed_changes<T: DeserializeOwned>(&self) -> Option<T> {
        self.changes
            .as_ref()
            .and_then(|json| serde_json::from_str(json).ok())
    }
}
