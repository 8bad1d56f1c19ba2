//! # Configuration Management
//!
//! This module handles loading configuration from environment variables,
//! following the "12-factor app" methodology where configuration comes from
//! the environment.
//!
//! ## Environment Variables
//! - `API_BASE_URL`: Base URL of the relying-party server (default: http://localhost:3000)
//! - `RP_NAME`: Human-readable name of the relying party
//! - `REQUEST_TIMEOUT_SECS`: Per-request timeout for boundary calls (default: 10)
//! - `STATUS_DISPLAY_SECS`: How long terminal UI states are shown before
//!   reverting to idle (default: 2, clamped to 2..=5)

use anyhow::Result;
use std::env;
use std::time::Duration;

/// Shortest and longest permitted terminal-state display interval, in seconds.
const DISPLAY_SECS_MIN: u64 = 2;
const DISPLAY_SECS_MAX: u64 = 5;

/// Client configuration
///
/// Holds everything needed to reach the relying-party boundary and to tune
/// the presentation layer.
///
/// ## WebAuthn Terminology
/// - **RP (Relying Party)**: the server that issues challenges and verifies
///   authenticator responses
/// - **RP Origin**: the full URL the relying party is served from - it doubles
///   as the secure-context input to the capability probe
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the relying-party server
    /// Example: "https://api.example.com" or "http://localhost:3000"
    pub api_base_url: String,

    /// Human-readable relying-party name, shown to users during ceremonies
    pub rp_name: String,

    /// Timeout applied to every boundary request
    pub request_timeout: Duration,

    /// How long the controller displays a terminal state before auto-reverting
    /// to idle. Always within 2–5 seconds.
    pub status_display: Duration,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Loads variables from a .env file if present (dotenvy does not error when
    /// the file is missing), then reads each value with a sensible default.
    /// Returns an error only when a present value fails to parse.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let timeout_secs: u64 = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;

        let display_secs: u64 = env::var("STATUS_DISPLAY_SECS")
            .unwrap_or_else(|_| DISPLAY_SECS_MIN.to_string())
            .parse()?;

        Ok(Config {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),

            rp_name: env::var("RP_NAME").unwrap_or_else(|_| "Biometric Auth".to_string()),

            request_timeout: Duration::from_secs(timeout_secs),

            // Out-of-range values are clamped rather than rejected
            status_display: Duration::from_secs(
                display_secs.clamp(DISPLAY_SECS_MIN, DISPLAY_SECS_MAX),
            ),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: "http://localhost:3000".to_string(),
            rp_name: "Biometric Auth".to_string(),
            request_timeout: Duration::from_secs(10),
            status_display: Duration::from_secs(DISPLAY_SECS_MIN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_display_interval() {
        let config = Config::default();
        assert!(config.status_display >= Duration::from_secs(DISPLAY_SECS_MIN));
        assert!(config.status_display <= Duration::from_secs(DISPLAY_SECS_MAX));
    }
}
