//! Posts service with per-request error injection
//!
//! This crate serves a small in-memory posts API and fails a configurable
//! percentage of its requests on purpose, so that callers and routers in
//! front of it can be tested against server errors.
//!
//! The failure rate is an integer percentage read from an external parameter
//! store on every request. The [`ErrorInjectionLayer`] takes one decision per
//! request, keeps it in a request-scoped [`DecisionCache`], and clears it when
//! the request completes.
//!
//! ## Modules
//!
//! * [`injection`] - the `tower` layer, its resolver and the decision cache.
//! * [`threshold`] - the error threshold and the provider fetching it.
//! * [`store`] - parameter stores (in-memory and SSM-compatible).
//! * [`decider`] - random draws and the injection comparison.
//! * [`posts`], [`health`], [`app`] - the HTTP surface.
//!
//! ## Example
//!
//! ```rust
//! use posts_chaos::{app, injection::Resolver, store::InMemoryStore, threshold::ThresholdProvider};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), posts_chaos::Error> {
//! let store = InMemoryStore::new().with_parameter("ERROR_RATE", "25");
//! let provider = ThresholdProvider::new(Arc::new(store), "ERROR_RATE")?;
//!
//! // Fail 25% of the requests to every route.
//! let state = app::AppState::new(Resolver::new(provider));
//! let router = app::router(state, Vec::<String>::new());
//! # Ok(())
//! # }
//! ```
//!
//! [`ErrorInjectionLayer`]: injection::ErrorInjectionLayer
//! [`DecisionCache`]: injection::DecisionCache

pub mod app;
pub mod config;
pub mod decider;
pub mod health;
pub mod injection;
pub mod posts;
pub mod store;
pub mod threshold;

mod error;
pub use error::{Error, INJECTED_FAILURE_MESSAGE};

#[cfg(test)]
mod test_utils;
