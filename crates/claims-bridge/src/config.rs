use crate::claims::{ClaimsNamespace, DEFAULT_NAMESPACE};
use crate::crypto::MAX_CLOCK_SKEW;
use crate::services::DEFAULT_TOKEN_LIFETIME;
use base64::{engine::general_purpose, Engine as _};
use secrecy::SecretBox;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8090";
pub const DEFAULT_SIGNING_KEY_ID: &str = "bridge-01";
pub const DEFAULT_JWT_CLOCK_SKEW_SECONDS: u64 = 300;

#[derive(Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// Canonical base URL of this realm, embedded in every issued token.
    pub realm_base_url: String,
    pub token_lifetime: Duration,
    pub claims_namespace: ClaimsNamespace,
    pub jwt_clock_skew: Duration,
    /// Ed25519 private key, PKCS#8 DER.
    pub signing_key: SecretBox<Vec<u8>>,
    pub signing_key_id: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

fn invalid(name: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn parse_secs(vars: &HashMap<String, String>, name: &str, default: u64) -> Result<u64, ConfigError> {
    match vars.get(name) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|e| invalid(name, e.to_string())),
        None => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = required(vars, "DATABASE_URL")?;

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let realm_base_url = required(vars, "REALM_BASE_URL")?;
        if realm_base_url.trim().is_empty() {
            return Err(invalid("REALM_BASE_URL", "must not be empty"));
        }

        let lifetime_secs = parse_secs(
            vars,
            "TOKEN_LIFETIME_SECONDS",
            DEFAULT_TOKEN_LIFETIME.as_secs(),
        )?;
        if lifetime_secs == 0 {
            return Err(invalid("TOKEN_LIFETIME_SECONDS", "must be greater than 0"));
        }

        let namespace = vars
            .get("CLAIMS_NAMESPACE")
            .cloned()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        if namespace.is_empty() {
            return Err(invalid("CLAIMS_NAMESPACE", "must not be empty"));
        }
        if ClaimsNamespace::is_reserved(&namespace) {
            return Err(invalid(
                "CLAIMS_NAMESPACE",
                format!("'{}' collides with a standard claim", namespace),
            ));
        }

        let skew_secs = parse_secs(vars, "JWT_CLOCK_SKEW_SECONDS", DEFAULT_JWT_CLOCK_SKEW_SECONDS)?;
        if skew_secs == 0 || skew_secs > MAX_CLOCK_SKEW.as_secs() {
            return Err(invalid(
                "JWT_CLOCK_SKEW_SECONDS",
                format!(
                    "must be between 1 and {} seconds, got {}",
                    MAX_CLOCK_SKEW.as_secs(),
                    skew_secs
                ),
            ));
        }

        let signing_key_b64 = required(vars, "SIGNING_KEY")?;
        let signing_key = general_purpose::STANDARD
            .decode(signing_key_b64.trim())
            .map_err(ConfigError::Base64Error)?;
        if signing_key.is_empty() {
            return Err(invalid("SIGNING_KEY", "must not be empty"));
        }

        let signing_key_id = vars
            .get("SIGNING_KEY_ID")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SIGNING_KEY_ID.to_string());

        Ok(Config {
            database_url,
            bind_address,
            realm_base_url,
            token_lifetime: Duration::from_secs(lifetime_secs),
            claims_namespace: ClaimsNamespace::new(namespace),
            jwt_clock_skew: Duration::from_secs(skew_secs),
            signing_key: SecretBox::new(Box::new(signing_key)),
            signing_key_id,
        })
    }
}
