use crate::statements::{CREATE_A, CREATE_B, INSERT_B, SEED_A, SELECT_B_IDS};
use async_trait::async_trait;
use aurora_core::{AuroraError, Backend, ConnectionDescriptor, Result};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Connection, Row};
use std::str::FromStr;
use tracing::{debug, warn};

/// MySQL [`Backend`] that opens one connection per call. No pooling.
#[derive(Debug, Clone, Default)]
pub struct MysqlBackend;

impl MysqlBackend {
    pub fn new() -> Self {
        Self
    }

    /// Connect options parsed from the descriptor's percent-encoded URL.
    fn connect_options(descriptor: &ConnectionDescriptor) -> Result<MySqlConnectOptions> {
        MySqlConnectOptions::from_str(&descriptor.connection_url()?).map_err(|e| {
            AuroraError::Config(format!("invalid connection url {}: {e}", descriptor.redacted()))
        })
    }

    async fn open(descriptor: &ConnectionDescriptor) -> Result<MySqlConnection> {
        debug!(endpoint = %descriptor.redacted(), "opening connection");
        MySqlConnection::connect_with(&Self::connect_options(descriptor)?)
            .await
            .map_err(|e| AuroraError::Connect(e.to_string()))
    }

    async fn close(conn: MySqlConnection) {
        if let Err(e) = conn.close().await {
            warn!(error = %e, "closing connection failed");
        }
    }

    /// Create tables `a` and `b` if absent and make sure `a.id = 1` exists.
    pub async fn ensure_schema(&self, descriptor: &ConnectionDescriptor) -> Result<()> {
        let mut conn = Self::open(descriptor).await?;
        let outcome = Self::apply_schema(&mut conn).await;
        Self::close(conn).await;
        outcome
    }

    async fn apply_schema(conn: &mut MySqlConnection) -> Result<()> {
        for sql in [CREATE_A, CREATE_B, SEED_A] {
            sqlx::query(sql)
                .execute(&mut *conn)
                .await
                .map_err(|e| AuroraError::Query(e.to_string()))?;
        }
        Ok(())
    }

    /// Insert, read, commit. The read goes through the transaction so it sees
    /// the row inserted just before it.
    async fn exchange(conn: &mut MySqlConnection) -> Result<Vec<i64>> {
        let mut tx = conn
            .begin()
            .await
            .map_err(|e| AuroraError::Transaction(format!("begin failed: {e}")))?;

        if let Err(e) = sqlx::query(INSERT_B).execute(&mut *tx).await {
            if let Err(rb) = tx.rollback().await {
                warn!(error = %rb, "rollback after failed insert failed");
            }
            return Err(AuroraError::Transaction(format!("insert failed: {e}")));
        }

        let rows = sqlx::query(SELECT_B_IDS)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| AuroraError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AuroraError::Transaction(format!("commit failed: {e}")))?;

        rows.iter().map(scan_id).collect()
    }
}

/// Reads the first column as an id. Unsigned columns are accepted as long
/// as the value fits in `i64`.
fn scan_id(row: &MySqlRow) -> Result<i64> {
    match row.try_get::<i64, _>(0) {
        Ok(id) => Ok(id),
        Err(signed) => {
            let id = row
                .try_get::<u64, _>(0)
                .map_err(|_| AuroraError::Scan(signed.to_string()))?;
            i64::try_from(id)
                .map_err(|_| AuroraError::Scan(format!("id {id} does not fit in i64")))
        }
    }
}

#[async_trait]
impl Backend for MysqlBackend {
    async fn record_and_list(&self, descriptor: &ConnectionDescriptor) -> Result<Vec<i64>> {
        let mut conn = Self::open(descriptor).await?;
        let outcome = Self::exchange(&mut conn).await;
        Self::close(conn).await;

        if let Ok(ids) = &outcome {
            debug!(count = ids.len(), "read b ids");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_options_decode_encoded_credentials() {
        let descriptor = ConnectionDescriptor {
            host: "db.internal".to_string(),
            port: 3307,
            username: "ad@min".to_string(),
            password: "p@ss/word".to_string(),
            dbname: "app".to_string(),
            engine: "mysql".to_string(),
        };
        let options = MysqlBackend::connect_options(&descriptor).unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 3307);
        assert_eq!(options.get_username(), "ad@min");
        assert_eq!(options.get_database(), Some("app"));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_connect_error() {
        let descriptor = ConnectionDescriptor {
            host: "127.0.0.1".to_string(),
            port: 1,
            username: "root".to_string(),
            password: String::new(),
            dbname: "test".to_string(),
            engine: "mysql".to_string(),
        };
        let err = MysqlBackend::new()
            .record_and_list(&descriptor)
            .await
            .unwrap_err();
        assert!(matches!(err, AuroraError::Connect(_)));
    }
}
