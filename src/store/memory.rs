use super::{ParameterStore, StoreError, StoreFuture};
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

/// Parameter store backed by a shared in-process map.
///
/// Clones share the same map, so a value set through one handle is seen by
/// every other. Values are held in plain text; the decryption flag is
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`set`](InMemoryStore::set).
    pub fn with_parameter(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value.into());
    }

    pub fn remove(&self, name: &str) -> Option<String> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    fn get(&self, name: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

impl ParameterStore for InMemoryStore {
    fn get_parameter<'a>(&'a self, name: &'a str, _with_decryption: bool) -> StoreFuture<'a> {
        let value = self.get(name);
        Box::pin(async move { Ok::<_, StoreError>(value) })
    }
}
