//! Settings for the drift assessment pipeline, read from the environment.

use utils::env::{env_bool, env_string, load_dotenv};

pub const DEFAULT_AUDIT_ENTITY_NAME: &str = "Drift Assessment";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftAssessmentConfig {
    /// Record an audit entry for assessments tied to a job (`DRIFT_AUDIT_ENABLED`)
    pub audit_enabled: bool,
    /// Entity name stamped on audit entries (`DRIFT_AUDIT_ENTITY_NAME`)
    pub audit_entity_name: String,
}

impl Default for DriftAssessmentConfig {
    fn default() -> Self {
        Self {
            audit_enabled: true,
            audit_entity_name: DEFAULT_AUDIT_ENTITY_NAME.to_string(),
        }
    }
}

impl DriftAssessmentConfig {
    pub fn from_env() -> Self {
        load_dotenv();
        Self {
            audit_enabled: env_bool("DRIFT_AUDIT_ENABLED", true),
            audit_entity_name: env_string("DRIFT_AUDIT_ENTITY_NAME", DEFAULT_AUDIT_ENTITY_NAME),
        }
    }
}
