use async_trait::async_trait;
use aurora_core::{AuroraError, Result, SecretStore};
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;
use tracing::{debug, warn};

/// Version stage that always points at the live secret.
pub const CURRENT_VERSION_STAGE: &str = "AWSCURRENT";

/// [`SecretStore`] backed by AWS Secrets Manager.
#[derive(Clone, Debug)]
pub struct SecretsManagerStore {
    client: Client,
}

impl SecretsManagerStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS configuration (region, credentials chain).
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn current_secret_string(&self, secret_id: &str) -> Result<Option<String>> {
        debug!(secret_id, stage = CURRENT_VERSION_STAGE, "fetching secret value");

        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .version_stage(CURRENT_VERSION_STAGE)
            .send()
            .await
            .map_err(|e| {
                AuroraError::Secret(format!(
                    "GetSecretValue failed for {secret_id}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let secret = output.secret_string().map(str::to_string);
        if secret.is_none() {
            warn!(secret_id, "secret has no string payload");
        }
        Ok(secret)
    }
}
