//! Configuration types.

use std::time::Duration;

use chrono_tz::Tz;
use secrecy::SecretString;

use crate::broadcast::engine::MAX_TICK;
use crate::broadcast::parse_timezone;
use crate::error::ConfigError;

/// Default LINE Messaging API origin.
pub const DEFAULT_API_BASE: &str = "https://api.line.me";

/// Responder configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    /// Messaging API channel access token.
    pub channel_access_token: SecretString,
    /// Channel secret used to verify webhook signatures.
    pub channel_secret: SecretString,
    /// HTTP listen port.
    pub port: u16,
    /// Deployment environment name ("development", "production", ...).
    pub environment: String,
    /// Timezone for time replies and broadcast triggers.
    pub timezone: Tz,
    /// Whether scheduled broadcasts run.
    pub broadcast_enabled: bool,
    /// How often the scheduler checks the clock.
    pub scheduler_tick: Duration,
    /// Per-request timeout for gateway calls.
    pub delivery_timeout: Duration,
    /// Messaging API origin.
    pub api_base: String,
}

impl ResponderConfig {
    /// Build config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<SecretString, ConfigError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(SecretString::from)
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let channel_access_token = required("CHANNEL_ACCESS_TOKEN")?;
        let channel_secret = required("CHANNEL_SECRET")?;

        let port = parse_or(&lookup, "PORT", 3000u16)?;

        let environment = lookup("RESPONDER_ENV").unwrap_or_else(|| "development".to_string());

        let timezone = match lookup("RESPONDER_TIMEZONE") {
            Some(name) => parse_timezone(&name).map_err(|e| ConfigError::InvalidValue {
                key: "RESPONDER_TIMEZONE".into(),
                message: e.to_string(),
            })?,
            None => chrono_tz::Asia::Tokyo,
        };

        let broadcast_enabled = match lookup("BROADCAST_ENABLED") {
            Some(v) => parse_bool(&v).ok_or_else(|| ConfigError::InvalidValue {
                key: "BROADCAST_ENABLED".into(),
                message: format!("expected true/false, got '{v}'"),
            })?,
            None => true,
        };

        let tick_secs: u64 = parse_or(&lookup, "SCHEDULER_TICK_SECS", 30)?;
        if !(1..=MAX_TICK.as_secs()).contains(&tick_secs) {
            return Err(ConfigError::InvalidValue {
                key: "SCHEDULER_TICK_SECS".into(),
                message: format!("{tick_secs} outside 1-{}", MAX_TICK.as_secs()),
            });
        }

        let timeout_secs: u64 = parse_or(&lookup, "DELIVERY_TIMEOUT_SECS", 10)?;

        let api_base = lookup("LINE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Self {
            channel_access_token,
            channel_secret,
            port,
            environment,
            timezone,
            broadcast_enabled,
            scheduler_tick: Duration::from_secs(tick_secs),
            delivery_timeout: Duration::from_secs(timeout_secs),
            api_base,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
