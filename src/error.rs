use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Message returned to callers when a request is deliberately failed.
pub const INJECTED_FAILURE_MESSAGE: &str = "Forcing error to test router redirect.";

/// Errors that abort a request before it reaches a handler.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The parameter store could not be reached or did not answer in time.
    #[error("parameter store unavailable while fetching `{key}`: {source}")]
    DependencyUnavailable {
        key: String,
        #[source]
        source: StoreError,
    },

    /// The parameter store has no value for the key.
    #[error("parameter `{key}` is not set")]
    ConfigurationMissing { key: String },

    /// The stored value is not an integer percentage between 0 and 100.
    #[error("parameter `{key}` has malformed value {value:?}: {reason}")]
    ConfigurationMalformed {
        key: String,
        value: String,
        reason: String,
    },

    /// Synthetic failure chosen by the random decision.
    #[error("{}", INJECTED_FAILURE_MESSAGE)]
    InjectedFailure,
}

impl Error {
    /// Short label used in logs to tell the kinds apart.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::DependencyUnavailable { .. } => "dependency_unavailable",
            Error::ConfigurationMissing { .. } => "configuration_missing",
            Error::ConfigurationMalformed { .. } => "configuration_malformed",
            Error::InjectedFailure => "injected_failure",
        }
    }

    /// Every kind surfaces as a plain server error.
    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn public_message(&self) -> &'static str {
        match self {
            Error::InjectedFailure => INJECTED_FAILURE_MESSAGE,
            _ => "Internal Server Error",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        ErrorBody::new(status, self.public_message()).into_response_with(status)
    }
}

/// JSON body shared by every error response of the service.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody<'a> {
    status: u16,
    error: &'a str,
    message: &'a str,
}

impl<'a> ErrorBody<'a> {
    pub(crate) fn new(status: StatusCode, message: &'a str) -> Self {
        Self {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown"),
            message,
        }
    }

    pub(crate) fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}
