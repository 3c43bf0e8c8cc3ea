//! Runtime configuration.
//!
//! Loaded from environment variables in `main` and passed down explicitly;
//! nothing reads the environment after startup, which keeps services testable
//! with the in-code constructors.

use std::time::Duration;

use anyhow::{Context, Result};

/// Hours a freshly issued token stays valid when the environment does not say
/// otherwise (30 days).
const DEFAULT_TOKEN_TTL_HOURS: u64 = 720;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Shared HMAC secret for signing and verifying bearer tokens
    /// (from NOTEMARK_TOKEN_SECRET).
    pub token_secret: String,
    /// Token lifetime (from NOTEMARK_TOKEN_TTL_HOURS).
    pub token_ttl: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables. The token secret has no
    /// default: refusing to start beats silently signing with a known value.
    pub fn from_env() -> Result<Self> {
        let token_secret = std::env::var("NOTEMARK_TOKEN_SECRET")
            .context("NOTEMARK_TOKEN_SECRET must be set")?;

        let ttl_hours = std::env::var("NOTEMARK_TOKEN_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_HOURS);

        Ok(AppConfig {
            token_secret,
            token_ttl: Duration::from_secs(ttl_hours * 3600),
        })
    }

    /// Create a config with an explicit secret (for testing).
    pub fn with_secret(secret: impl Into<String>) -> Self {
        AppConfig {
            token_secret: secret.into(),
            token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_HOURS * 3600),
        }
    }
}
