use crate::response::{encode_body, InvocationResponse};
use aurora_core::{Backend, CredentialSource, Result};
use tracing::{debug, error, info};

/// Per-invocation request handler: resolve credentials, write and read
/// through the backend, and serialize the ids.
pub struct Handler<C, B> {
    credentials: C,
    backend: B,
}

impl<C: CredentialSource, B: Backend> Handler<C, B> {
    pub fn new(credentials: C, backend: B) -> Self {
        Self {
            credentials,
            backend,
        }
    }

    pub async fn handle(&self) -> Result<InvocationResponse> {
        let descriptor = self.credentials.resolve().await?;
        debug!(endpoint = %descriptor.redacted(), "resolved connection descriptor");

        let ids = self.backend.record_and_list(&descriptor).await?;
        info!(count = ids.len(), "collected b ids");

        Ok(InvocationResponse::ok_json(encode_body(&ids)?))
    }

    /// Never fails: any error is logged and turned into a 500 response.
    pub async fn respond(&self) -> InvocationResponse {
        match self.handle().await {
            Ok(resp) => resp,
            Err(e) => {
                error!(error = %e, "invocation failed");
                InvocationResponse::internal_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurora_core::testing::{FakeBackend, InMemorySecretStore};
    use aurora_core::{AuroraError, EnvironmentConfig, EnvironmentCredentials, SecretCredentials};

    const SECRET: &str = r#"{"password":"pw","dbname":"app","engine":"mysql","port":3306,"host":"db.local","username":"admin"}"#;

    fn secret_handler(
        store: InMemorySecretStore,
        backend: FakeBackend,
    ) -> Handler<SecretCredentials<InMemorySecretStore>, FakeBackend> {
        Handler::new(SecretCredentials::new(store, "prod/db"), backend)
    }

    #[tokio::test]
    async fn success_returns_json_ids() {
        let store = InMemorySecretStore::new().with_secret("prod/db", SECRET);
        let handler = secret_handler(store, FakeBackend::new());

        let resp = handler.respond().await;

        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.body, r#"{"b_ids":[1]}"#);
        assert_eq!(resp.headers["Content-Type"], "application/json");
        assert!(!resp.is_base64_encoded);
    }

    #[tokio::test]
    async fn backend_receives_resolved_descriptor() {
        let store = InMemorySecretStore::new().with_secret("prod/db", SECRET);
        let handler = secret_handler(store, FakeBackend::new());

        handler.handle().await.unwrap();

        let calls = handler.backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].host, "db.local");
        assert_eq!(calls[0].dbname, "app");
    }

    #[tokio::test]
    async fn every_invocation_inserts_one_more_row() {
        let store = InMemorySecretStore::new().with_secret("prod/db", SECRET);
        let handler = secret_handler(store, FakeBackend::new());

        assert_eq!(handler.respond().await.body, r#"{"b_ids":[1]}"#);
        assert_eq!(handler.backend.row_count(), 1);
        assert_eq!(handler.respond().await.body, r#"{"b_ids":[1,2]}"#);
        assert_eq!(handler.backend.row_count(), 2);
    }

    #[tokio::test]
    async fn nil_secret_yields_500_without_touching_backend() {
        let store = InMemorySecretStore::new().with_nil_secret("prod/db");
        let handler = secret_handler(store, FakeBackend::new());

        let err = handler.handle().await.unwrap_err();
        assert!(err.to_string().contains("SecretString is nil"));

        let resp = handler.respond().await;
        assert_eq!(resp, InvocationResponse::internal_error());
        assert!(handler.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_secret_yields_500() {
        let store = InMemorySecretStore::new().with_secret("prod/db", "{not json");
        let handler = secret_handler(store, FakeBackend::new());
        assert_eq!(handler.respond().await.status_code, 500);
    }

    #[tokio::test]
    async fn every_backend_failure_yields_500() {
        let failures: [fn() -> AuroraError; 5] = [
            || AuroraError::Connect("refused".to_string()),
            || AuroraError::Transaction("insert failed".to_string()),
            || AuroraError::Query("bad join".to_string()),
            || AuroraError::Transaction("commit failed".to_string()),
            || AuroraError::Scan("not an integer".to_string()),
        ];
        for make in failures {
            let store = InMemorySecretStore::new().with_secret("prod/db", SECRET);
            let handler = secret_handler(store, FakeBackend::failing(make));

            let resp = handler.respond().await;
            assert_eq!(resp.status_code, 500);
            assert!(resp.body.is_empty());
            assert_eq!(handler.backend.row_count(), 0);
        }
    }

    #[tokio::test]
    async fn environment_credentials_drive_the_backend() {
        let creds = EnvironmentCredentials::new(EnvironmentConfig {
            user: "admin".to_string(),
            password: "pw".to_string(),
            address: "10.0.0.9".to_string(),
            port: 3307,
            database: "app".to_string(),
        });
        let handler = Handler::new(creds, FakeBackend::new());

        let resp = handler.respond().await;
        assert_eq!(resp.status_code, 200);
        let calls = handler.backend.calls();
        assert_eq!(calls[0].port, 3307);
        assert_eq!(calls[0].host, "10.0.0.9");
    }
}
