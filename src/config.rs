//!
//! # Application Configuration
//!
//! Everything the server needs from the environment is read exactly once at
//! startup by [`Config::from_env`]. Token lifetimes arrive as duration
//! expressions like `15m` or `7d` and are parsed into a structured
//! [`TokenLifetime`] here, so a malformed value aborts the process instead of
//! surfacing as a per-request failure later.

use std::env;
use std::fmt;

/// Time unit accepted in a token-lifetime expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

/// A validated token lifetime: a positive integer amount plus a unit.
///
/// Parsed from the `<integer><d|h|m|s>` grammar used by the `JWT_EXPIRES_IN`
/// and `JWT_REFRESH_EXPIRES_IN` variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetime {
    amount: i64,
    unit: DurationUnit,
}

/// Error raised when a configuration value cannot be parsed.
///
/// Only ever produced during startup; request handlers never see this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLifetime(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::InvalidLifetime(raw) => write!(
                f,
                "invalid token lifetime {:?}, expected <integer><d|h|m|s>",
                raw
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl TokenLifetime {
    /// Parses a duration expression such as `"7d"`, `"12h"`, `"30m"` or `"45s"`.
    ///
    /// The amount must be a plain positive decimal integer; anything else
    /// (signs, spaces, unknown units, missing parts) is rejected.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        // The grammar is ASCII-only; bailing out here also keeps the
        // byte-index split below on a char boundary.
        if trimmed.len() < 2 || !trimmed.is_ascii() {
            return Err(ConfigError::InvalidLifetime(raw.to_string()));
        }

        let (amount_part, unit_part) = trimmed.split_at(trimmed.len() - 1);
        if !amount_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidLifetime(raw.to_string()));
        }

        let amount: i64 = amount_part
            .parse()
            .map_err(|_| ConfigError::InvalidLifetime(raw.to_string()))?;
        if amount == 0 {
            return Err(ConfigError::InvalidLifetime(raw.to_string()));
        }

        let unit = match unit_part {
            "d" => DurationUnit::Days,
            "h" => DurationUnit::Hours,
            "m" => DurationUnit::Minutes,
            "s" => DurationUnit::Seconds,
            _ => return Err(ConfigError::InvalidLifetime(raw.to_string())),
        };

        Ok(TokenLifetime { amount, unit })
    }

    /// Converts the lifetime into a concrete `chrono::Duration`.
    pub fn to_duration(&self) -> chrono::Duration {
        match self.unit {
            DurationUnit::Days => chrono::Duration::days(self.amount),
            DurationUnit::Hours => chrono::Duration::hours(self.amount),
            DurationUnit::Minutes => chrono::Duration::minutes(self.amount),
            DurationUnit::Seconds => chrono::Duration::seconds(self.amount),
        }
    }
}

/// Signing secrets and token lifetimes for the auth subsystem.
///
/// Immutable after load; cloned into the pieces that need it (token issuing,
/// the auth middleware).
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret used to sign and verify access tokens.
    pub access_secret: String,
    /// How long an access token stays valid.
    pub access_lifetime: TokenLifetime,
    /// Secret used to sign and verify refresh tokens.
    pub refresh_secret: String,
    /// How long a refresh token stays valid.
    pub refresh_lifetime: TokenLifetime,
}

pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub auth: AuthConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            auth: AuthConfig {
                access_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
                access_lifetime: TokenLifetime::parse(
                    &env::var("JWT_EXPIRES_IN").unwrap_or_else(|_| "15m".to_string()),
                )
                .expect("JWT_EXPIRES_IN must look like <integer><d|h|m|s>"),
                refresh_secret: env::var("JWT_REFRESH_SECRET")
                    .expect("JWT_REFRESH_SECRET must be set"),
                refresh_lifetime: TokenLifetime::parse(
                    &env::var("JWT_REFRESH_EXPIRES_IN").unwrap_or_else(|_| "7d".to_string()),
                )
                .expect("JWT_REFRESH_EXPIRES_IN must look like <integer><d|h|m|s>"),
            },
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
