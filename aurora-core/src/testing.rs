use crate::{AuroraError, Backend, ConnectionDescriptor, Result, SecretStore};
use std::collections::HashMap;
use std::sync::Mutex;

// ---- Fakes ----

/// Secret store backed by a map. Unknown ids fail like a missing secret would.
#[derive(Default)]
pub struct InMemorySecretStore {
    secrets: HashMap<String, Option<String>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, id: impl Into<String>, payload: impl Into<String>) -> Self {
        self.secrets.insert(id.into(), Some(payload.into()));
        self
    }

    /// A secret whose current version has no string payload.
    pub fn with_nil_secret(mut self, id: impl Into<String>) -> Self {
        self.secrets.insert(id.into(), None);
        self
    }
}

#[async_trait::async_trait]
impl SecretStore for InMemorySecretStore {
    async fn current_secret_string(&self, secret_id: &str) -> Result<Option<String>> {
        self.secrets
            .get(secret_id)
            .cloned()
            .ok_or_else(|| AuroraError::Secret(format!("secret not found: {secret_id}")))
    }
}

/// In-memory stand-in for table `b`: every call appends one id and returns all of them.
#[derive(Default)]
pub struct FakeBackend {
    rows: Mutex<Vec<i64>>,
    failure: Option<fn() -> AuroraError>,
    calls: Mutex<Vec<ConnectionDescriptor>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that fails every call with the error `make` builds, without inserting.
    pub fn failing(make: fn() -> AuroraError) -> Self {
        Self {
            failure: Some(make),
            ..Self::default()
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Descriptors passed to `record_and_list`, in call order.
    pub fn calls(&self) -> Vec<ConnectionDescriptor> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Backend for FakeBackend {
    async fn record_and_list(&self, descriptor: &ConnectionDescriptor) -> Result<Vec<i64>> {
        self.calls.lock().unwrap().push(descriptor.clone());
        if let Some(make) = self.failure {
            return Err(make());
        }
        let mut rows = self.rows.lock().unwrap();
        let next = rows.last().copied().unwrap_or(0) + 1;
        rows.push(next);
        Ok(rows.clone())
    }
}

// ---- Backend Certification Tests ----
//
// Each check assumes table `a` holds id 1 and that `count_rows` reports the
// current number of rows in `b`.

pub async fn test_record_and_list_returns_inserted_id<F, Fut>(
    backend: &dyn Backend,
    descriptor: &ConnectionDescriptor,
    count_rows: F,
) where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = i64>,
{
    let before = count_rows().await;
    let ids = backend.record_and_list(descriptor).await.unwrap();

    assert_eq!(ids.len() as i64, before + 1);
    let max = *ids.iter().max().unwrap();
    assert!(ids.iter().all(|id| *id > 0));
    assert_eq!(ids.iter().filter(|id| **id == max).count(), 1);
}

pub async fn test_each_call_inserts_exactly_one_row<F, Fut>(
    backend: &dyn Backend,
    descriptor: &ConnectionDescriptor,
    count_rows: F,
) where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = i64>,
{
    let start = count_rows().await;

    let first = backend.record_and_list(descriptor).await.unwrap();
    assert_eq!(count_rows().await, start + 1);

    let second = backend.record_and_list(descriptor).await.unwrap();
    assert_eq!(count_rows().await, start + 2);

    assert_eq!(second.len(), first.len() + 1);
    for id in &first {
        assert!(second.contains(id), "id {id} vanished between calls");
    }
}

pub async fn test_read_observes_own_insert(
    backend: &dyn Backend,
    descriptor: &ConnectionDescriptor,
) {
    let first = backend.record_and_list(descriptor).await.unwrap();
    let second = backend.record_and_list(descriptor).await.unwrap();

    let new_ids: Vec<i64> = second
        .iter()
        .copied()
        .filter(|id| !first.contains(id))
        .collect();
    assert_eq!(new_ids.len(), 1);
}
