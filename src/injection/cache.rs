use super::Resolver;
use crate::error::Error;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Request-scoped slot holding the injection decision.
///
/// A fresh cache is created for every request and stored in the request's
/// extensions, so handlers can reuse the decision taken by the
/// [`ErrorInjectionService`](super::ErrorInjectionService). Clones share the
/// same slot. The slot is cleared once the request completes.
#[derive(Debug, Clone, Default)]
pub struct DecisionCache {
    slot: Arc<Mutex<Option<bool>>>,
}

impl DecisionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached decision, if one was taken for this request.
    pub fn get(&self) -> Option<bool> {
        *self.lock()
    }

    /// Return the cached decision or compute and store a fresh one.
    ///
    /// Nothing is stored when the threshold cannot be resolved.
    pub async fn resolve(&self, resolver: &Resolver) -> Result<bool, Error> {
        if let Some(decision) = self.get() {
            return Ok(decision);
        }

        let decision = resolver.decide().await?;
        // First decision wins if two callers raced on the same request.
        let stored = *self.lock().get_or_insert(decision);
        Ok(stored)
    }

    pub fn clear(&self) {
        self.lock().take();
    }

    /// Guard that clears the slot when dropped.
    pub(crate) fn clear_on_drop(&self) -> ClearOnDrop {
        ClearOnDrop(self.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Option<bool>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) struct ClearOnDrop(DecisionCache);

impl Drop for ClearOnDrop {
    fn drop(&mut self) {
        self.0.clear();
    }
}
