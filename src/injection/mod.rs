//! # Error injection for `tower`
//!
//! Layer that fails a configurable percentage of requests with a server
//! error before they reach the wrapped service.
//!
//! For every request, the [`ErrorInjectionService`]:
//!
//! 1. creates a [`DecisionCache`] and stores it in the request extensions;
//! 2. resolves the decision through a [`Resolver`], which fetches the current
//!    threshold and draws a random number;
//! 3. answers `500 Internal Server Error` when the decision is to inject, or
//!    when the threshold cannot be resolved, and calls the inner service
//!    otherwise;
//! 4. clears the cache once the request completes, whatever the outcome.
//!
//! ## Usage
//!
//! ```rust
//! use posts_chaos::injection::{ErrorInjectionLayer, Resolver};
//! use posts_chaos::store::{InMemoryStore, ParameterStore};
//! use posts_chaos::threshold::ThresholdProvider;
//! use axum::{routing::get, Router};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), posts_chaos::Error> {
//! let store: Arc<dyn ParameterStore> =
//!     Arc::new(InMemoryStore::new().with_parameter("ERROR_RATE", "10"));
//! let resolver = Resolver::new(ThresholdProvider::new(store, "ERROR_RATE")?);
//!
//! // Fail 10% of the requests, except on /health.
//! let app: Router = Router::new()
//!     .route("/", get(|| async { "Hello, world!" }))
//!     .layer(ErrorInjectionLayer::new(resolver).exclude_paths(["/health"]));
//! # Ok(())
//! # }
//! ```

use crate::error::Error;
use axum::{
    http::Request,
    response::{IntoResponse, Response},
};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};

mod cache;
pub use cache::DecisionCache;

mod resolver;
pub use resolver::Resolver;

/// A layer that randomly fails requests for the service.
///
/// The failure rate is read from a parameter store on every request.
#[derive(Clone, Debug)]
pub struct ErrorInjectionLayer {
    resolver: Resolver,
    excluded: Arc<[String]>,
}

impl ErrorInjectionLayer {
    /// Create a new `ErrorInjectionLayer` with the given resolver.
    pub fn new(resolver: Resolver) -> Self {
        ErrorInjectionLayer {
            resolver,
            excluded: Arc::from(Vec::new()),
        }
    }

    /// Skip injection for requests under any of `prefixes`.
    ///
    /// Prefixes match whole path segments: `/health` covers `/health` and
    /// `/health/db`, not `/healthz`.
    pub fn exclude_paths<I, P>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.excluded = prefixes
            .into_iter()
            .map(Into::into)
            .map(|prefix: String| prefix.trim_end_matches('/').to_owned())
            .filter(|prefix| !prefix.is_empty())
            .collect();
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.excluded.iter().any(|prefix| match path.strip_prefix(prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        })
    }
}

impl<S> Layer<S> for ErrorInjectionLayer {
    type Service = ErrorInjectionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorInjectionService {
            inner,
            layer: self.clone(),
        }
    }
}

/// Underlying service for the [`ErrorInjectionLayer`]
#[derive(Clone, Debug)]
pub struct ErrorInjectionService<S> {
    inner: S,
    layer: ErrorInjectionLayer,
}

impl<S, B> Service<Request<B>> for ErrorInjectionService<S>
where
    B: Send + 'static,
    S: Service<Request<B>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = InjectionFuture<S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if self.layer.is_excluded(request.uri().path()) {
            return Box::pin(self.inner.call(request));
        }

        // The ready service is the one in `self`; keep it for this request.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let resolver = self.layer.resolver.clone();

        let cache = DecisionCache::new();
        request.extensions_mut().insert(cache.clone());

        Box::pin(async move {
            let _cleanup = cache.clear_on_drop();

            match cache.resolve(&resolver).await {
                Ok(false) => inner.call(request).await,
                Ok(true) => Ok(reject(&request, Error::InjectedFailure)),
                Err(err) => Ok(reject(&request, err)),
            }
        })
    }
}

fn reject<B>(request: &Request<B>, err: Error) -> Response {
    let method = request.method();
    let path = request.uri().path();
    let kind = err.kind();

    match &err {
        Error::InjectedFailure => {
            tracing::info!(kind, %method, path, "failing request on purpose");
        }
        Error::DependencyUnavailable { .. } => {
            tracing::warn!(kind, %method, path, error = %err, "cannot resolve error threshold");
        }
        Error::ConfigurationMissing { .. } | Error::ConfigurationMalformed { .. } => {
            tracing::error!(kind, %method, path, error = %err, "error threshold is misconfigured");
        }
    }

    err.into_response()
}

type InjectionFuture<E> = Pin<Box<dyn Future<Output = Result<Response, E>> + Send>>;
