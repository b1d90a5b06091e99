use crate::{AuroraError, Result};
use std::env;

pub const DB_SECRET: &str = "DB_SECRET";
pub const DB_USER: &str = "DB_USER";
pub const DB_PASSWORD: &str = "DB_PASSWORD";
pub const DB_ENDPOINT_ADDRESS: &str = "DB_ENDPOINT_ADDRESS";
pub const DB_ENDPOINT_PORT: &str = "DB_ENDPOINT_PORT";
pub const DB_DATABASE: &str = "DB_DATABASE";

/// Where database credentials come from for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialMode {
    /// Fetch the `AWSCURRENT` version of `secret_id` on every invocation.
    SecretStore { secret_id: String },
    /// Use the endpoint settings captured from the environment at start-up.
    Environment(EnvironmentConfig),
}

/// Process-level settings, built once at start-up and handed to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub credentials: CredentialMode,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// `DB_SECRET` wins when it is set and non-empty; otherwise the five
    /// endpoint variables are required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = match lookup(DB_SECRET).filter(|v| !v.trim().is_empty()) {
            Some(secret_id) => CredentialMode::SecretStore { secret_id },
            None => CredentialMode::Environment(EnvironmentConfig::from_lookup(lookup)?),
        };
        Ok(Self { credentials })
    }
}

/// Endpoint settings read from `DB_*` environment variables.
#[derive(Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    pub user: String,
    pub password: String,
    pub address: String,
    pub port: u16,
    pub database: String,
}

impl std::fmt::Debug for EnvironmentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

impl EnvironmentConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            match lookup(key) {
                Some(v) if !v.trim().is_empty() => Ok(v),
                Some(_) => Err(AuroraError::Config(format!("{key} is empty"))),
                None => Err(AuroraError::Config(format!("{key} is not set"))),
            }
        };

        let user = required(DB_USER)?;
        // An empty password is legitimate; an unset one is not.
        let password = lookup(DB_PASSWORD)
            .ok_or_else(|| AuroraError::Config(format!("{DB_PASSWORD} is not set")))?;
        let address = required(DB_ENDPOINT_ADDRESS)?;
        let raw_port = required(DB_ENDPOINT_PORT)?;
        let port = raw_port.trim().parse::<u16>().map_err(|e| {
            AuroraError::Config(format!("{DB_ENDPOINT_PORT} '{raw_port}' is not a port: {e}"))
        })?;
        let database = required(DB_DATABASE)?;

        Ok(Self {
            user,
            password,
            address,
            port,
            database,
        })
    }
}
