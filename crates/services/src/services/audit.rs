//! Audit log sink used to record who assessed what, and with which result.

use async_trait::async_trait;
use models::models::audit_log::CreateAuditLog;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit store unavailable: {0}")]
    Unavailable(String),
    #[error("json error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Destination for audit entries - implemented by whatever store the host wires in
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: CreateAuditLog) -> Result<(), AuditError>;
}

/// Sink that emits each entry as a structured event on the `audit` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, entry: CreateAuditLog) -> Result<(), AuditError> {
        info!(
            target: "audit",
            organization_id = entry.organization_id,
            user_id = entry.user_id,
            action = %entry.action,
            entity_type = %entry.entity_type,
            entity_id = entry.entity_id,
            entity_name = entry.entity_name.as_deref().unwrap_or_default(),
            changes = entry.changes.as_deref().unwrap_or_default(),
            ip_address = entry.ip_address.as_deref().unwrap_or_default(),
            user_agent = entry.user_agent.as_deref().unwrap_or_default(),
            recorded_at = %entry.recorded_at,
            "Audit entry recorded"
        );
        Ok(())
    }
}
