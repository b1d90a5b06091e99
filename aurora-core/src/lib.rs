pub mod config;
pub mod credentials;
pub mod error;
pub mod testing;

pub use config::{CredentialMode, EnvironmentConfig, Settings};
pub use credentials::{
    ConnectionDescriptor, Credentials, EnvironmentCredentials, SecretCredentials,
};
pub use error::{AuroraError, Result};

/// Resolves the parameters needed to open a database connection.
#[async_trait::async_trait]
pub trait CredentialSource: Send + Sync {
    async fn resolve(&self) -> Result<ConnectionDescriptor>;
}

/// A versioned secret store queried by identifier.
///
/// Returns `Ok(None)` when the current version exists but carries no string payload.
#[async_trait::async_trait]
pub trait SecretStore: Send + Sync {
    async fn current_secret_string(&self, secret_id: &str) -> Result<Option<String>>;
}

/// The database side of an invocation: insert one `b` row, then read back the joined ids.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn record_and_list(&self, descriptor: &ConnectionDescriptor) -> Result<Vec<i64>>;
}
