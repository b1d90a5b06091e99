use crate::config::{CredentialMode, EnvironmentConfig};
use crate::{AuroraError, CredentialSource, Result, SecretStore};
use serde::{Deserialize, Deserializer};
use tracing::debug;

pub const DEFAULT_ENGINE: &str = "mysql";

/// Everything needed to open one database connection.
///
/// Field names follow the JSON layout of an RDS-managed secret, so a secret
/// payload deserializes straight into this type.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionDescriptor {
    pub host: String,
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub port: u16,
    pub username: String,
    pub password: String,
    pub dbname: String,
    #[serde(default = "default_engine")]
    pub engine: String,
}

fn default_engine() -> String {
    DEFAULT_ENGINE.to_string()
}

fn port_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(n) => Ok(n),
        Port::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl std::fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("dbname", &self.dbname)
            .field("engine", &self.engine)
            .finish()
    }
}

impl ConnectionDescriptor {
    /// Parse a secret payload. Any JSON or schema problem is a configuration error.
    pub fn from_secret_json(payload: &str) -> Result<Self> {
        serde_json::from_str(payload)
            .map_err(|e| AuroraError::Config(format!("invalid secret payload: {e}")))
    }

    /// Driver DSN: `user:password@host:port/dbname?parseTime=true`.
    pub fn connection_string(&self) -> String {
        format!(
            "{}:{}@{}:{}/{}?parseTime=true",
            self.username, self.password, self.host, self.port, self.dbname
        )
    }

    /// `mysql://` URL with percent-encoded credentials.
    pub fn connection_url(&self) -> Result<String> {
        let mut url = url::Url::parse(&format!("mysql://{}:{}", self.host, self.port))
            .map_err(|e| AuroraError::Config(format!("invalid endpoint {}: {e}", self.host)))?;
        url.set_username(&self.username)
            .map_err(|_| AuroraError::Config("username cannot be set on URL".to_string()))?;
        url.set_password(Some(&self.password))
            .map_err(|_| AuroraError::Config("password cannot be set on URL".to_string()))?;
        url.set_path(&format!("/{}", self.dbname));
        Ok(url.to_string())
    }

    /// Loggable form of the connection URL.
    pub fn redacted(&self) -> String {
        format!(
            "mysql://{}:***@{}:{}/{}",
            self.username, self.host, self.port, self.dbname
        )
    }
}

/// Credentials held in a secret store, fetched fresh on every resolve.
pub struct SecretCredentials<S> {
    store: S,
    secret_id: String,
}

impl<S: SecretStore> SecretCredentials<S> {
    pub fn new(store: S, secret_id: impl Into<String>) -> Self {
        Self {
            store,
            secret_id: secret_id.into(),
        }
    }
}

#[async_trait::async_trait]
impl<S: SecretStore> CredentialSource for SecretCredentials<S> {
    async fn resolve(&self) -> Result<ConnectionDescriptor> {
        debug!(secret_id = %self.secret_id, "resolving credentials from secret store");
        let payload = self
            .store
            .current_secret_string(&self.secret_id)
            .await?
            .ok_or_else(|| {
                AuroraError::Secret(format!("SecretString is nil. id: {}", self.secret_id))
            })?;
        ConnectionDescriptor::from_secret_json(&payload)
    }
}

/// Credentials captured from `DB_*` environment variables at start-up.
#[derive(Debug, Clone)]
pub struct EnvironmentCredentials {
    config: EnvironmentConfig,
}

impl EnvironmentCredentials {
    pub fn new(config: EnvironmentConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl CredentialSource for EnvironmentCredentials {
    async fn resolve(&self) -> Result<ConnectionDescriptor> {
        let cfg = &self.config;
        Ok(ConnectionDescriptor {
            host: cfg.address.clone(),
            port: cfg.port,
            username: cfg.user.clone(),
            password: cfg.password.clone(),
            dbname: cfg.database.clone(),
            engine: default_engine(),
        })
    }
}

/// Either credential variant, chosen by [`CredentialMode`].
pub enum Credentials<S> {
    Secret(SecretCredentials<S>),
    Environment(EnvironmentCredentials),
}

impl<S: SecretStore> Credentials<S> {
    /// Build the source for `mode`; `store` is only called in secret-store mode.
    pub async fn for_mode<F, Fut>(mode: CredentialMode, store: F) -> Self
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = S>,
    {
        match mode {
            CredentialMode::SecretStore { secret_id } => {
                Credentials::Secret(SecretCredentials::new(store().await, secret_id))
            }
            CredentialMode::Environment(config) => {
                Credentials::Environment(EnvironmentCredentials::new(config))
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: SecretStore> CredentialSource for Credentials<S> {
    async fn resolve(&self) -> Result<ConnectionDescriptor> {
        match self {
            Credentials::Secret(c) => c.resolve().await,
            Credentials::Environment(c) => c.resolve().await,
        }
    }
}
