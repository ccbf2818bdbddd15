//! Utilities for testing this crate

use crate::{
    decider::Draw,
    injection::{DecisionCache, Resolver},
    store::{InMemoryStore, ParameterStore, StoreError, StoreFuture},
    threshold::ThresholdProvider,
};
use axum::{
    http::Request,
    response::{IntoResponse, Response},
};
use std::{
    convert::Infallible,
    future::{ready, Future},
    pin::Pin,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    task::{Context, Poll},
};
use tower::Service;

pub const KEY: &str = "ERROR_RATE";

/// Resolver reading [`KEY`] from `store` with the given draws.
pub fn resolver_with(store: impl ParameterStore + 'static, rng: Arc<dyn Draw>) -> Resolver {
    let provider = ThresholdProvider::new(Arc::new(store), KEY).unwrap();
    Resolver::with_draw(provider, rng)
}

/// Draw source cycling through `values`.
pub fn draws(values: &[u8]) -> Arc<dyn Draw> {
    let values = values.to_vec();
    let next = AtomicUsize::new(0);
    Arc::new(move || values[next.fetch_add(1, Ordering::SeqCst) % values.len()])
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[derive(Clone)]
pub struct DummyService;

impl<B> Service<Request<B>> for DummyService {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _request: Request<B>) -> Self::Future {
        Box::pin(async { Ok("ok".into_response()) })
    }
}

/// Service keeping the [`DecisionCache`] of every request it handles.
#[derive(Clone, Default)]
pub struct RecordingService {
    seen: Arc<Mutex<Vec<(Option<DecisionCache>, Option<bool>)>>>,
}

impl RecordingService {
    /// Caches attached to the handled requests, as they are now.
    pub fn caches(&self) -> Vec<DecisionCache> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(cache, _)| cache.clone())
            .collect()
    }

    /// Decisions as observed while each request was being handled.
    pub fn decisions(&self) -> Vec<Option<bool>> {
        self.seen.lock().unwrap().iter().map(|(_, d)| *d).collect()
    }
}

impl<B> Service<Request<B>> for RecordingService {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let cache = request.extensions().get::<DecisionCache>().cloned();
        let decision = cache.as_ref().and_then(DecisionCache::get);
        self.seen.lock().unwrap().push((cache, decision));

        Box::pin(async { Ok("ok".into_response()) })
    }
}

/// Store wrapper counting lookups.
#[derive(Clone)]
pub struct CountingStore {
    inner: InMemoryStore,
    fetches: Arc<AtomicUsize>,
    plain_lookup: Arc<AtomicBool>,
}

impl CountingStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            fetches: Arc::default(),
            plain_lookup: Arc::default(),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// `true` when every lookup asked for decryption.
    pub fn always_decrypted(&self) -> bool {
        !self.plain_lookup.load(Ordering::SeqCst)
    }
}

impl ParameterStore for CountingStore {
    fn get_parameter<'a>(&'a self, name: &'a str, with_decryption: bool) -> StoreFuture<'a> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !with_decryption {
            self.plain_lookup.store(true, Ordering::SeqCst);
        }
        self.inner.get_parameter(name, with_decryption)
    }
}

/// Store that is never reachable.
pub struct FailingStore;

impl ParameterStore for FailingStore {
    fn get_parameter<'a>(&'a self, _name: &'a str, _with_decryption: bool) -> StoreFuture<'a> {
        let err = StoreError::Transport("connection refused".into());
        Box::pin(ready(Err::<Option<String>, _>(err)))
    }
}

/// Store that never answers.
pub struct PendingStore;

impl ParameterStore for PendingStore {
    fn get_parameter<'a>(&'a self, _name: &'a str, _with_decryption: bool) -> StoreFuture<'a> {
        Box::pin(std::future::pending::<Result<Option<String>, StoreError>>())
    }
}
