//! Service wrapping the drift calculator with input validation and job auditing.

use std::sync::Arc;

use models::models::{
    audit_log::CreateAuditLog,
    drift::{DriftAssessmentRequest, DriftAuditChanges, DriftInput, DriftResult},
};
use thiserror::Error;
use tracing::{error, info, warn};

use super::{
    audit::{AuditError, AuditSink},
    config::DriftAssessmentConfig,
    drift_calculator::calculate_drift_risk,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DriftInputError {
    #[error("invalid input: {field} {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl DriftInputError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidInput { field, .. } => field,
        }
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<(), DriftInputError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DriftInputError::invalid(field, "must be a finite number"))
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), DriftInputError> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(DriftInputError::invalid(
            field,
            format!("must be at least 0 (got {})", value),
        ));
    }
    Ok(())
}

/// Check the ranges the calculator assumes. Fields are checked in declaration
/// order and the first violation is returned.
pub fn validate_drift_input(input: &DriftInput) -> Result<(), DriftInputError> {
    require_non_negative("windSpeed", input.wind_speed)?;
    if let Some(direction) = input.wind_direction {
        require_finite("windDirection", direction)?;
    }
    require_finite("temperature", input.temperature)?;
    require_finite("humidity", input.humidity)?;
    if !(0.0..=100.0).contains(&input.humidity) {
        return Err(DriftInputError::invalid(
            "humidity",
            format!("must be between 0 and 100 (got {})", input.humidity),
        ));
    }
    require_non_negative("boomHeight", input.boom_height)?;
    require_non_negative("aircraftSpeed", input.aircraft_speed)?;
    if let Some(distance) = input.distance_to_sensitive_area {
        require_finite("distanceToSensitiveArea", distance)?;
    }
    Ok(())
}

/// Identity of the caller, resolved by the request layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssessmentContext {
    pub organization_id: i32,
    pub user_id: i32,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Validates, scores, and audits drift assessments
#[derive(Clone)]
pub struct DriftAssessmentService {
    config: DriftAssessmentConfig,
    audit: Arc<dyn AuditSink>,
}

impl DriftAssessmentService {
    pub fn new(config: DriftAssessmentConfig, audit: Arc<dyn AuditSink>) -> Self {
        Self { config, audit }
    }

    pub fn from_env(audit: Arc<dyn AuditSink>) -> Self {
        Self::new(DriftAssessmentConfig::from_env(), audit)
    }

    pub fn config(&self) -> &DriftAssessmentConfig {
        &self.config
    }

    /// Run an assessment. When the request names a job, an audit entry is
    /// recorded in the background; its outcome never affects the result.
    pub async fn assess(
        &self,
        ctx: &AssessmentContext,
        request: DriftAssessmentRequest,
    ) -> Result<DriftResult, DriftInputError> {
        if let Err(e) = validate_drift_input(&request) {
            warn!(
                user_id = ctx.user_id,
                field = e.field(),
                error = %e,
                "Rejected drift assessment input"
            );
            return Err(e);
        }

        let result = calculate_drift_risk(&request);

        info!(
            organization_id = ctx.organization_id,
            user_id = ctx.user_id,
            job_id = ?request.job_id,
            risk_score = result.risk_score,
            risk_level = %result.risk_level,
            required_buffer_zone = result.required_buffer_zone,
            "Drift assessment completed"
        );

        // Job id 0 is treated as "no job"
        match request.job_id {
            Some(job_id) if job_id != 0 && self.config.audit_enabled => {
                self.spawn_audit(ctx, job_id, request, result.clone());
            }
            _ => {}
        }

        Ok(result)
    }

    /// Build the audit entry for an assessment tied to `job_id`
    pub fn audit_entry(
        &self,
        ctx: &AssessmentContext,
        job_id: i32,
        request: DriftAssessmentRequest,
        result: DriftResult,
    ) -> Result<CreateAuditLog, AuditError> {
        let changes = serde_json::to_string(&DriftAuditChanges {
            input: request,
            result,
        })?;

        Ok(CreateAuditLog::job_view(
            ctx.organization_id,
            ctx.user_id,
            job_id,
            self.config.audit_entity_name.clone(),
            Some(changes),
        )
        .with_client(ctx.ip_address.clone(), ctx.user_agent.clone()))
    }

    fn spawn_audit(
        &self,
        ctx: &AssessmentContext,
        job_id: i32,
        request: DriftAssessmentRequest,
        result: DriftResult,
    ) {
        let entry = match self.audit_entry(ctx, job_id, request, result) {
            Ok(entry) => entry,
            Err(e) => {
                error!(job_id = job_id, error = %e, "Failed to build drift audit entry");
                return;
            }
        };

        let audit = Arc::clone(&self.audit);
        tokio::spawn(async move {
            if let Err(e) = audit.record(entry).await {
                error!(
                    job_id = job_id,
                    error = %e,
                    "Failed to record drift assessment audit entry"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use models::models::{
        audit_log::{AuditAction, AuditEntityType},
        drift::{DropletSize, RiskLevel},
    };
    use tokio::sync::mpsc;

    use super::*;

    struct ChannelAuditSink {
        tx: mpsc::UnboundedSender<CreateAuditLog>,
    }

    #[async_trait]
    impl AuditSink for ChannelAuditSink {
        async fn record(&self, entry: CreateAuditLog) -> Result<(), AuditError> {
            self.tx
                .send(entry)
                .map_err(|e| AuditError::Unavailable(e.to_string()))
        }
    }

    struct FailingAuditSink;

    #[async_trait]
    impl AuditSink for FailingAuditSink {
        async fn record(&self, _entry: CreateAuditLog) -> Result<(), AuditError> {
            Err(AuditError::Unavailable("database offline".to_string()))
        }
    }

    fn channel_service(
        config: DriftAssessmentConfig,
    ) -> (DriftAssessmentService, mpsc::UnboundedReceiver<CreateAuditLog>) {
        utils::logging::init_tracing();
        let (tx, rx) = mpsc::unbounded_channel();
        let service = DriftAssessmentService::new(config, Arc::new(ChannelAuditSink { tx }));
        (service, rx)
    }

    fn ctx() -> AssessmentContext {
        AssessmentContext {
            organization_id: 7,
            user_id: 3,
            ip_address: Some("203.0.113.9".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        }
    }

    fn valid_input() -> DriftInput {
        DriftInput {
            wind_speed: 5.0,
            wind_direction: Some(180.0),
            temperature: 70.0,
            humidity: 50.0,
            boom_height: 10.0,
            droplet_size: DropletSize::Medium,
            aircraft_speed: 120.0,
            distance_to_sensitive_area: Some(100.0),
        }
    }

    #[test]
    fn test_validate_accepts_valid_input() {
        assert_eq!(validate_drift_input(&valid_input()), Ok(()));

        let mut edges = valid_input();
        edges.wind_speed = 0.0;
        edges.humidity = 100.0;
        edges.boom_height = 0.0;
        edges.aircraft_speed = 0.0;
        edges.temperature = -20.0;
        assert_eq!(validate_drift_input(&edges), Ok(()));
    }

    fn mutated(mutate: impl FnOnce(&mut DriftInput)) -> DriftInput {
        let mut input = valid_input();
        mutate(&mut input);
        input
    }

    #[test]
    fn test_validate_reports_offending_field() {
        let cases = [
            ("windSpeed", mutated(|i| i.wind_speed = -1.0)),
            ("windDirection", mutated(|i| i.wind_direction = Some(f64::NAN))),
            ("temperature", mutated(|i| i.temperature = f64::INFINITY)),
            ("humidity", mutated(|i| i.humidity = 100.5)),
            ("humidity", mutated(|i| i.humidity = -0.1)),
            ("boomHeight", mutated(|i| i.boom_height = -3.0)),
            ("aircraftSpeed", mutated(|i| i.aircraft_speed = f64::NAN)),
            (
                "distanceToSensitiveArea",
                mutated(|i| i.distance_to_sensitive_area = Some(f64::NEG_INFINITY)),
            ),
        ];

        for (field, input) in cases {
            let err = validate_drift_input(&input).unwrap_err();
            assert_eq!(err.field(), field, "{err}");
        }
    }

    #[test]
    fn test_validate_returns_first_violation() {
        let mut input = valid_input();
        input.humidity = 150.0;
        input.wind_speed = -5.0;

        let err = validate_drift_input(&input).unwrap_err();
        assert_eq!(err.field(), "windSpeed");
        assert_eq!(err.to_string(), "invalid input: windSpeed must be at least 0 (got -5)");
    }

    #[tokio::test]
    async fn test_assess_with_job_records_audit_entry() {
        let (service, mut rx) = channel_service(DriftAssessmentConfig::default());
        let request = DriftAssessmentRequest {
            input: valid_input(),
            job_id: Some(42),
        };

        let result = service.assess(&ctx(), request.clone()).await.unwrap();
        assert_eq!(result.risk_score, 24);
        assert_eq!(result.risk_level, RiskLevel::Low);

        let entry = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.organization_id, 7);
        assert_eq!(entry.user_id, 3);
        assert_eq!(entry.action, AuditAction::View);
        assert_eq!(entry.entity_type, AuditEntityType::Job);
        assert_eq!(entry.entity_id, 42);
        assert_eq!(entry.entity_name.as_deref(), Some("Drift Assessment"));
        assert_eq!(entry.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(entry.user_agent.as_deref(), Some("Mozilla/5.0"));

        let changes: DriftAuditChanges = entry.parsed_changes().unwrap();
        assert_eq!(changes.input, request);
        assert_eq!(changes.result, result);

        let raw: serde_json::Value = entry.parsed_changes().unwrap();
        assert_eq!(raw["input"]["jobId"], 42);
        assert_eq!(raw["result"]["riskLevel"], "Low");
    }

    #[tokio::test]
    async fn test_assess_without_job_skips_audit() {
        let (service, mut rx) = channel_service(DriftAssessmentConfig::default());

        service
            .assess(&ctx(), DriftAssessmentRequest::from(valid_input()))
            .await
            .unwrap();
        drop(service);

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_assess_respects_disabled_audit() {
        let config = DriftAssessmentConfig {
            audit_enabled: false,
            ..Default::default()
        };
        let (service, mut rx) = channel_service(config);

        service
            .assess(
                &ctx(),
                DriftAssessmentRequest {
                    input: valid_input(),
                    job_id: Some(9),
                },
            )
            .await
            .unwrap();
        drop(service);

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_assess_uses_configured_entity_name() {
        let config = DriftAssessmentConfig {
            audit_enabled: true,
            audit_entity_name: "Pre-flight drift check".to_string(),
        };
        let (service, mut rx) = channel_service(config);

        service
            .assess(
                &ctx(),
                DriftAssessmentRequest {
                    input: valid_input(),
                    job_id: Some(1),
                },
            )
            .await
            .unwrap();

        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.entity_name.as_deref(), Some("Pre-flight drift check"));
    }

    #[tokio::test]
    async fn test_assess_rejects_invalid_input_without_auditing() {
        let (service, mut rx) = channel_service(DriftAssessmentConfig::default());
        let mut input = valid_input();
        input.humidity = 120.0;

        let err = service
            .assess(
                &ctx(),
                DriftAssessmentRequest {
                    input,
                    job_id: Some(42),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.field(), "humidity");
        drop(service);

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_change_result() {
        let service = DriftAssessmentService::new(
            DriftAssessmentConfig::default(),
            Arc::new(FailingAuditSink),
        );
        let request = DriftAssessmentRequest {
            input: valid_input(),
            job_id: Some(42),
        };

        let with_job = service.assess(&ctx(), request.clone()).await.unwrap();
        let without_job = service
            .assess(&ctx(), DriftAssessmentRequest::from(request.input))
            .await
            .unwrap();
        assert_eq!(with_job, without_job);
    }

    #[tokio::test]
    async fn test_assess_with_job_zero_skips_audit() {
        let (service, mut rx) = channel_service(DriftAssessmentConfig::default());

        service
            .assess(
                &ctx(),
                DriftAssessmentRequest {
                    input: valid_input(),
                    job_id: Some(0),
                },
            )
            .await
            .unwrap();
        drop(service);

        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_audit_entry_serializes_request_and_result() {
        let (service, _rx) = channel_service(DriftAssessmentConfig::default());
        let request = DriftAssessmentRequest {
            input: valid_input(),
            job_id: Some(12),
        };
        let result = calculate_drift_risk(&request);

        let entry = service
            .audit_entry(&ctx(), 12, request.clone(), result.clone())
            .unwrap();
        assert_eq!(entry.entity_id, 12);
        assert_eq!(entry.action, AuditAction::View);

        let changes: DriftAuditChanges = entry.parsed_changes().unwrap();
        assert_eq!(changes.input, request);
        assert_eq!(changes.result, result);
    }
}
