use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// ASABE droplet size classification of the nozzle setup
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS, EnumString, Display,
)]
pub enum DropletSize {
    Fine,
    Medium,
    Coarse,
    #[serde(rename = "Very Coarse")]
    #[strum(serialize = "Very Coarse")]
    VeryCoarse,
    #[serde(rename = "Extra Coarse")]
    #[strum(serialize = "Extra Coarse")]
    ExtraCoarse,
}

impl DropletSize {
    pub const ALL: [DropletSize; 5] = [
        DropletSize::Fine,
        DropletSize::Medium,
        DropletSize::Coarse,
        DropletSize::VeryCoarse,
        DropletSize::ExtraCoarse,
    ];
}

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    TS,
    EnumString,
    Display,
)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub const MODERATE_FROM: u8 = 30;
    pub const HIGH_FROM: u8 = 50;
    pub const CRITICAL_FROM: u8 = 80;

    /// Bucket a clamped 0-100 risk score. Lower bounds are inclusive.
    pub fn from_score(score: u8) -> Self {
        if score >= Self::CRITICAL_FROM {
            RiskLevel::Critical
        } else if score >= Self::HIGH_FROM {
            RiskLevel::High
        } else if score >= Self::MODERATE_FROM {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

/// Weather and equipment conditions for a single spray pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DriftInput {
    pub wind_speed: f64, // mph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<f64>, // degrees, informational only
    pub temperature: f64, // F
    pub humidity: f64,    // percent
    pub boom_height: f64, // ft, release height
    pub droplet_size: DropletSize,
    pub aircraft_speed: f64, // mph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_to_sensitive_area: Option<f64>, // ft, not scored
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DriftResult {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    #[ts(type = "number")]
    pub estimated_drift_distance: i64, // ft downwind
    #[ts(type = "number")]
    pub required_buffer_zone: i64, // ft, never below 100
    pub recommendations: Vec<String>,
}

/// Request payload for an assessment, optionally tied to a job for auditing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DriftAssessmentRequest {
    #[serde(flatten)]
    #[ts(flatten)]
    pub input: DriftInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<i32>,
}

impl std::ops::Deref for DriftAssessmentRequest {
    type Target = DriftInput;
    fn deref(&self) -> &Self::Target {
        &self.input
    }
}

impl From<DriftInput> for DriftAssessmentRequest {
    fn from(input: DriftInput) -> Self {
        Self {
            input,
            job_id: None,
        }
    }
}

/// Payload stored in the audit log `changes` column for an assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct DriftAuditChanges {
    pub input: DriftAssessmentRequest,
    pub result: DriftResult,
}
