//! Command line and environment configuration.

use crate::store::{InMemoryStore, ParameterStore};
use clap::{Parser, ValueEnum};
use std::{net::SocketAddr, sync::Arc, time::Duration};

/// Posts service with per-request error injection.
#[derive(Debug, Clone, Parser)]
#[command(name = "posts-chaos", version, about, long_about = None)]
pub struct Config {
    /// Address the HTTP server binds to.
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:8080")]
    pub bind_address: SocketAddr,

    /// Name of the parameter holding the error rate, in percent.
    #[arg(long, env = "PARAMETER_STORE_NAME")]
    pub parameter_name: String,

    /// Where the error rate is read from.
    #[arg(
        long,
        env = "PARAMETER_STORE_BACKEND",
        value_enum,
        default_value_t = StoreBackend::Ssm
    )]
    pub store: StoreBackend,

    /// Endpoint of the SSM-compatible parameter store.
    #[arg(
        long,
        env = "SSM_SERVICE_ENDPOINT",
        default_value = "http://localhost:4566"
    )]
    pub ssm_endpoint: String,

    /// Upper bound for one parameter lookup, in milliseconds.
    #[arg(long, env = "PARAMETER_FETCH_TIMEOUT_MS", default_value_t = 2_000)]
    pub fetch_timeout_ms: u64,

    /// Error rate loaded into the in-memory store at startup.
    #[arg(
        long,
        env = "INITIAL_ERROR_RATE",
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub initial_error_rate: u8,

    /// Path prefixes that are never failed on purpose.
    #[arg(
        long = "exclude-path",
        env = "INJECTION_EXCLUDED_PATHS",
        value_delimiter = ','
    )]
    pub excluded_paths: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// SSM `GetParameters` over HTTP.
    Ssm,
    /// In-process map seeded with `--initial-error-rate`.
    Memory,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("built without the `ssm` feature; use `--store memory`")]
    SsmUnsupported,
}

impl Config {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Build the parameter store selected by [`store`](Config::store).
    pub fn build_store(&self) -> Result<Arc<dyn ParameterStore>, ConfigError> {
        match self.store {
            StoreBackend::Memory => Ok(Arc::new(InMemoryStore::new().with_parameter(
                self.parameter_name.clone(),
                self.initial_error_rate.to_string(),
            ))),
            #[cfg(feature = "ssm")]
            StoreBackend::Ssm => Ok(Arc::new(crate::store::SsmStore::new(
                self.ssm_endpoint.clone(),
            ))),
            #[cfg(not(feature = "ssm"))]
            StoreBackend::Ssm => Err(ConfigError::SsmUnsupported),
        }
    }
}
