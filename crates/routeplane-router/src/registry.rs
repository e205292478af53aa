//! Backend registry: the permanent name ledger.
//!
//! Live routing state belongs to drivers and disappears when a backend is
//! removed. The registry is a separate, append-only record of every name
//! that was ever created, so ownership and audit lookups keep working after
//! teardown.

use std::sync::Arc;

use routeplane_state::{BackendRecord, StateResult, StateStore};
use tracing::debug;

use crate::error::{RouterError, RouterResult};

/// Durable storage behind a [`BackendRegistry`].
pub trait NameLedger: Send + Sync {
    /// Record `name`; `false` when it was already present.
    fn record(&self, name: &str) -> StateResult<bool>;

    fn lookup(&self, name: &str) -> StateResult<Option<BackendRecord>>;

    fn entries(&self) -> StateResult<Vec<BackendRecord>>;
}

impl NameLedger for StateStore {
    fn record(&self, name: &str) -> StateResult<bool> {
        self.register_backend(name)
    }

    fn lookup(&self, name: &str) -> StateResult<Option<BackendRecord>> {
        self.get_backend(name)
    }

    fn entries(&self) -> StateResult<Vec<BackendRecord>> {
        self.list_backends()
    }
}

/// Append-only ledger of backend names, shared by every driver.
#[derive(Clone)]
pub struct BackendRegistry {
    ledger: Arc<dyn NameLedger>,
}

impl BackendRegistry {
    pub fn new(store: StateStore) -> Self {
        Self::with_ledger(Arc::new(store))
    }

    pub fn with_ledger(ledger: Arc<dyn NameLedger>) -> Self {
        Self { ledger }
    }

    /// Registry over an ephemeral in-memory store (for testing).
    pub fn in_memory() -> RouterResult<Self> {
        Ok(Self::new(StateStore::open_in_memory()?))
    }

    /// Record that `name` exists. Recording an already-known name is a no-op.
    pub fn register(&self, name: &str) -> RouterResult<()> {
        if self.ledger.record(name)? {
            debug!(backend = name, "backend name added to registry");
        }
        Ok(())
    }

    /// Return `name` if it was ever created, live or not.
    pub fn retrieve(&self, name: &str) -> RouterResult<String> {
        self.ledger
            .lookup(name)?
            .map(|record| record.name)
            .ok_or(RouterError::BackendNotFound)
    }

    /// Every name ever created, sorted.
    pub fn names(&self) -> RouterResult<Vec<String>> {
        let mut names: Vec<String> = self
            .ledger
            .entries()?
            .into_iter()
            .map(|record| record.name)
            .collect();
        names.sort();
        Ok(names)
    }
}
