//! # Parameter stores
//!
//! A [`ParameterStore`] is the external key/value service holding the error
//! threshold. Two stores are provided:
//!
//! * [`InMemoryStore`] - a shared map, for local runs and tests.
//! * [`SsmStore`] - an HTTP client for SSM-compatible `GetParameters`
//!   endpoints (requires the `ssm` feature).

use std::{error::Error as StdError, future::Future, pin::Pin, sync::Arc, time::Duration};

mod memory;
pub use memory::InMemoryStore;

#[cfg(feature = "ssm")]
#[cfg_attr(docsrs, doc(cfg(feature = "ssm")))]
mod ssm;
#[cfg(feature = "ssm")]
pub use ssm::SsmStore;

/// Errors returned by a [`ParameterStore`] when it cannot answer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("request to parameter store failed: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    #[error("parameter store answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("parameter store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("invalid parameter store payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Future returned by [`ParameterStore::get_parameter`].
pub type StoreFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<String>, StoreError>> + Send + 'a>>;

/// External key/value configuration service.
pub trait ParameterStore: Send + Sync {
    /// Look up a single parameter by name.
    ///
    /// Returns `Ok(None)` when the store has no value for `name`.
    fn get_parameter<'a>(&'a self, name: &'a str, with_decryption: bool) -> StoreFuture<'a>;
}

impl<T> ParameterStore for Arc<T>
where
    T: ParameterStore + ?Sized,
{
    fn get_parameter<'a>(&'a self, name: &'a str, with_decryption: bool) -> StoreFuture<'a> {
        (**self).get_parameter(name, with_decryption)
    }
}
