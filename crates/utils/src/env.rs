//! Environment variable helpers shared by service configuration.

use std::env;

/// Load a `.env` file from the working directory (or a parent) if one exists.
/// Variables already set in the process environment take precedence.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Failed to load .env file"),
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "False" | "no" | "NO" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag, falling back to `default` when unset or unparseable
pub fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

/// Read a non-empty string, falling back to `default`
pub fn env_string(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
