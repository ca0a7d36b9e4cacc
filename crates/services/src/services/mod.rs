pub mod audit;
pub mod config;
pub mod drift_assessment;
pub mod drift_calculator;
