//! Environment-driven configuration.

use std::time::Duration;

use thiserror::Error;

pub const APP_NAME: &str = "Propulsa";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

/// Worker configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    /// Shared secret for the trigger routes; unset means open (local dev).
    pub worker_auth_token: Option<String>,
    /// Wall-clock deadline for document-stage model calls.
    pub llm_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: parse_var("PORT", DEFAULT_PORT)?,
            supabase_url: require("SUPABASE_URL")?,
            supabase_service_key: require("SUPABASE_SERVICE_ROLE_KEY")?,
            gemini_api_key: require("GEMINI_API_KEY")?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| crate::pipeline::gemini::DEFAULT_MODEL.to_string()),
            worker_auth_token: std::env::var("WORKER_AUTH_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            llm_timeout: Duration::from_secs(parse_var(
                "LLM_TIMEOUT_SECS",
                DEFAULT_LLM_TIMEOUT_SECS,
            )?),
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            name,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_propulsa() {
        assert_eq!(APP_NAME, "Propulsa");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn parse_var_falls_back_to_default() {
        // Var name chosen to not exist in any environment.
        let port: u16 = parse_var("PROPULSA_TEST_UNSET_PORT", 3000).unwrap();
        assert_eq!(port, 3000);
    }
}
