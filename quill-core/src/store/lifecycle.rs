//! Request lifecycle events and the bookkeeping every store shares

use crate::api::{ApiError, ApiResult};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::RwLock;
use tracing::{trace, warn};

/// Progress of one request, as seen by a store
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle<T> {
    Pending,
    Fulfilled(T),
    Rejected(ApiError),
    /// The caller stopped waiting before the request settled
    Abandoned,
}

impl<T> Lifecycle<T> {
    pub fn phase(&self) -> &'static str {
        match self {
            Lifecycle::Pending => "pending",
            Lifecycle::Fulfilled(_) => "fulfilled",
            Lifecycle::Rejected(_) => "rejected",
            Lifecycle::Abandoned => "abandoned",
        }
    }
}

/// Loading and error state of a store
///
/// Loading is an in-flight count, so overlapping requests do not clear each
/// other's flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestStatus {
    in_flight: usize,
    error: Option<ApiError>,
}

impl RequestStatus {
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    /// Update loading/error for `event` and hand back a fulfilled payload
    pub(crate) fn track<T>(&mut self, event: Lifecycle<T>) -> Option<T> {
        match event {
            Lifecycle::Pending => {
                self.in_flight += 1;
                self.error = None;
                None
            }
            Lifecycle::Fulfilled(value) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(value)
            }
            Lifecycle::Rejected(err) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.error = Some(err);
                None
            }
            Lifecycle::Abandoned => {
                self.in_flight = self.in_flight.saturating_sub(1);
                None
            }
        }
    }
}

/// Pure state transition applied for every event a store receives
pub trait Reducer {
    type Event;

    fn apply(&mut self, event: Self::Event);
}

/// Issue `request`, bracketing it with lifecycle events
///
/// State is only touched before the request and once it has settled; a
/// failure leaves everything but the error untouched. Dropping the returned
/// future mid-request applies `Abandoned`, so the loading count still
/// balances.
pub(crate) async fn dispatch<S, T, W, F>(
    state: &Arc<RwLock<S>>,
    wrap: W,
    request: F,
) -> ApiResult<T>
where
    S: Reducer + Send + Sync + 'static,
    S::Event: Send + 'static,
    T: Clone,
    W: Fn(Lifecycle<T>) -> S::Event,
    F: Future<Output = ApiResult<T>>,
{
    state.write().await.apply(wrap(Lifecycle::Pending));
    let mut in_flight = InFlight {
        state: Arc::clone(state),
        abandoned: Some(wrap(Lifecycle::Abandoned)),
    };

    let result = request.await;
    let mut state = state.write().await;
    in_flight.disarm();

    match result {
        Ok(value) => {
            state.apply(wrap(Lifecycle::Fulfilled(value.clone())));
            Ok(value)
        }
        Err(err) => {
            state.apply(wrap(Lifecycle::Rejected(err.clone())));
            Err(err)
        }
    }
}

/// Applies `Abandoned` unless disarmed before it is dropped
struct InFlight<S>
where
    S: Reducer + Send + Sync + 'static,
    S::Event: Send + 'static,
{
    state: Arc<RwLock<S>>,
    abandoned: Option<S::Event>,
}

impl<S> InFlight<S>
where
    S: Reducer + Send + Sync + 'static,
    S::Event: Send + 'static,
{
    fn disarm(&mut self) {
        self.abandoned = None;
    }
}

impl<S> Drop for InFlight<S>
where
    S: Reducer + Send + Sync + 'static,
    S::Event: Send + 'static,
{
    fn drop(&mut self) {
        let Some(event) = self.abandoned.take() else {
            return;
        };
        trace!("request abandoned before it settled");

        if let Ok(mut state) = self.state.try_write() {
            state.apply(event);
            return;
        }
        match Handle::try_current() {
            Ok(handle) => {
                let state = Arc::clone(&self.state);
                handle.spawn(async move {
                    state.write().await.apply(event);
                });
            }
            Err(_) => warn!("request abandoned outside a runtime; loading state not settled"),
        }
    }
}
