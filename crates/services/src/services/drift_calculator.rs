//! Spray drift risk scoring.
//!
//! Heuristic model loosely following EPA Drift Reduction Technology guidance
//! and the ASABE S572.1 droplet classification. Factors are evaluated in a
//! fixed order (wind, evaporation, boom height, droplet size, aircraft speed)
//! and that order is also the order of the emitted recommendations.

use models::models::drift::{DriftInput, DriftResult, DropletSize, RiskLevel};
use tracing::debug;

const INVERSION_WIND_MPH: f64 = 3.0;
const HIGH_WIND_MPH: f64 = 10.0;
const INVERSION_PENALTY: f64 = 40.0;
const MAX_HIGH_WIND_PENALTY: f64 = 50.0;

const HOT_DRY_EVAPORATION_INDEX: f64 = 70.0;
const WARM_EVAPORATION_INDEX: f64 = 50.0;

const MAX_SAFE_BOOM_HEIGHT_FT: f64 = 15.0;
const HIGH_AIRCRAFT_SPEED_MPH: f64 = 140.0;

const MPH_TO_FT_PER_SEC: f64 = 1.467;
const MIN_BUFFER_ZONE_FT: f64 = 100.0;
const BUFFER_SAFETY_FACTOR: f64 = 1.5;

/// Relative drift potential of each droplet class (Fine = baseline)
fn droplet_factor(size: DropletSize) -> f64 {
    match size {
        DropletSize::Fine => 1.0,
        DropletSize::Medium => 0.6,
        DropletSize::Coarse => 0.3,
        DropletSize::VeryCoarse => 0.1,
        DropletSize::ExtraCoarse => 0.05,
    }
}

/// Approximate settling velocity in ft/s. Very Coarse and Extra Coarse share
/// the same value.
fn terminal_velocity(size: DropletSize) -> f64 {
    match size {
        DropletSize::Fine => 0.5,
        DropletSize::Medium => 2.0,
        DropletSize::Coarse => 5.0,
        DropletSize::VeryCoarse | DropletSize::ExtraCoarse => 8.0,
    }
}

/// Round half toward positive infinity.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Score the drift risk of a spray pass.
///
/// Total over its input: out-of-range values are not rejected here, they
/// simply flow through the arithmetic. Range checks live in
/// [`super::drift_assessment::validate_drift_input`].
pub fn calculate_drift_risk(input: &DriftInput) -> DriftResult {
    let mut score = 0.0_f64;
    let mut recommendations = Vec::new();

    // 1. Wind speed: calm air risks inversion drift, strong wind grows super-linearly
    let wind_speed = input.wind_speed;
    if wind_speed < INVERSION_WIND_MPH {
        score += INVERSION_PENALTY;
        recommendations.push(
            "Wind speed is too low (< 3 mph). Risk of temperature inversion drift.".to_string(),
        );
    } else if wind_speed > HIGH_WIND_MPH {
        let excess = wind_speed - HIGH_WIND_MPH;
        score += MAX_HIGH_WIND_PENALTY.min(excess.powf(1.5) * 5.0);
        recommendations.push(format!(
            "High wind speed ({} mph) significantly increases drift risk.",
            wind_speed
        ));
    } else {
        score += (wind_speed - INVERSION_WIND_MPH) * 2.0;
    }
    let wind_score = score;

    // 2. Evaporation: hot and dry air shrinks droplets in flight
    let evaporation_index = input.temperature - input.humidity / 4.0;
    if evaporation_index > HOT_DRY_EVAPORATION_INDEX {
        score += 20.0;
        recommendations.push(
            "High evaporation potential (Hot & Dry). Use larger droplets or anti-evaporation adjuvants."
                .to_string(),
        );
    } else if evaporation_index > WARM_EVAPORATION_INDEX {
        score += 10.0;
    }

    // 3. Release height
    if input.boom_height > MAX_SAFE_BOOM_HEIGHT_FT {
        score += (input.boom_height - MAX_SAFE_BOOM_HEIGHT_FT) * 2.0;
        recommendations.push(format!(
            "Boom height ({} ft) is high. Lowering release height reduces drift.",
            input.boom_height
        ));
    }
    let physical_score = score;

    // 4. Droplet size: Fine/Medium add a penalty, coarser classes rescale
    // everything accumulated so far
    match input.droplet_size {
        DropletSize::Fine => {
            score += 30.0;
            recommendations.push(
                "Fine droplets detected. Strongly recommend switching to Coarse or Medium nozzles."
                    .to_string(),
            );
        }
        DropletSize::Medium => {
            score += 10.0;
        }
        size @ (DropletSize::Coarse | DropletSize::VeryCoarse | DropletSize::ExtraCoarse) => {
            score *= 0.5 + droplet_factor(size) * 0.5;
            recommendations.push(format!("Using {} droplets helps mitigate drift risk.", size));
        }
    }

    // 5. Aircraft speed: wingtip vortex turbulence
    if input.aircraft_speed > HIGH_AIRCRAFT_SPEED_MPH {
        score += 10.0;
        recommendations
            .push("High aircraft speed may increase vortex turbulence and drift.".to_string());
    }

    // f64::max/min discard NaN, so the score always lands in [0, 100]
    let clamped = score.max(0.0).min(100.0);
    let risk_score = round_half_up(clamped) as u8;
    let risk_level = RiskLevel::from_score(risk_score);

    let wind_ft_per_sec = wind_speed * MPH_TO_FT_PER_SEC;
    let time_to_fall = input.boom_height / terminal_velocity(input.droplet_size);
    let drift_distance = wind_ft_per_sec * time_to_fall;
    let required_buffer_zone = (drift_distance * BUFFER_SAFETY_FACTOR)
        .max(MIN_BUFFER_ZONE_FT)
        .ceil() as i64;

    debug!(
        wind_score,
        evaporation_index,
        physical_score,
        raw_score = score,
        risk_score,
        risk_level = %risk_level,
        drift_distance,
        "Computed drift risk"
    );

    DriftResult {
        risk_score,
        risk_level,
        estimated_drift_distance: round_half_up(drift_distance) as i64,
        required_buffer_zone,
        recommendations,
    }
}
