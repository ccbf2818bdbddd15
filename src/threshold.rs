//! # Error threshold
//!
//! The error threshold is the percentage of requests that should be failed.
//! It lives in an external [`ParameterStore`] under a named key and is
//! fetched through a [`ThresholdProvider`] every time a decision is needed.

use crate::{
    error::Error,
    store::{ParameterStore, StoreError},
};
use std::{fmt, sync::Arc, time::Duration};

/// Integer percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ErrorThreshold(u8);

impl ErrorThreshold {
    /// Never fail a request.
    pub const NEVER: Self = Self(0);
    /// Fail every request.
    pub const ALWAYS: Self = Self(100);

    /// Returns `None` when `percent` is above 100.
    pub fn new(percent: u8) -> Option<Self> {
        (percent <= 100).then_some(Self(percent))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// Parse the raw value stored under `key`.
    ///
    /// The value must be a base-10 integer between 0 and 100, without
    /// surrounding whitespace.
    pub fn parse(key: &str, raw: &str) -> Result<Self, Error> {
        let malformed = |reason: String| Error::ConfigurationMalformed {
            key: key.to_owned(),
            value: raw.to_owned(),
            reason,
        };

        let value: i64 = raw
            .parse()
            .map_err(|err: std::num::ParseIntError| malformed(err.to_string()))?;
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| malformed(format!("{value} is outside 0..=100")))
    }
}

impl fmt::Display for ErrorThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Fetches the current [`ErrorThreshold`] from a [`ParameterStore`].
///
/// Each call to [`fetch`](ThresholdProvider::fetch) is one round-trip to the
/// store. Nothing is cached here.
#[derive(Clone)]
pub struct ThresholdProvider {
    store: Arc<dyn ParameterStore>,
    key: String,
    timeout: Option<Duration>,
}

impl ThresholdProvider {
    /// Create a provider reading `key` from `store`.
    ///
    /// Fails with [`Error::ConfigurationMissing`] when the key is empty.
    pub fn new(store: Arc<dyn ParameterStore>, key: impl Into<String>) -> Result<Self, Error> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::ConfigurationMissing { key });
        }

        Ok(Self {
            store,
            key,
            timeout: None,
        })
    }

    /// Bound every fetch by `timeout`. An expired fetch is reported as
    /// [`Error::DependencyUnavailable`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Fetch and parse the current threshold, always asking the store to
    /// decrypt the value.
    pub async fn fetch(&self) -> Result<ErrorThreshold, Error> {
        let lookup = self.store.get_parameter(&self.key, true);
        let value = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, lookup).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout(limit)),
            },
            None => lookup.await,
        };

        let raw = value
            .map_err(|source| Error::DependencyUnavailable {
                key: self.key.clone(),
                source,
            })?
            .ok_or_else(|| Error::ConfigurationMissing {
                key: self.key.clone(),
            })?;

        ErrorThreshold::parse(&self.key, &raw)
    }
}

impl fmt::Debug for ThresholdProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThresholdProvider")
            .field("key", &self.key)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
