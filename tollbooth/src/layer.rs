//! Axum middleware enforcing per-route micropayments.
//!
//! [`PaymentGate`] wraps a router and consults the [`PriceTable`] on every
//! request. Routes absent from the table pass through untouched; priced
//! routes must carry a payment proof the facilitator accepts, otherwise the
//! caller receives a `402 Payment Required` (or `502` when the facilitator
//! itself fails).
//!
//! The table and facilitator handle are read-only after construction and
//! shared across all in-flight requests without locking.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum_core::extract::Request;
use axum_core::response::Response;
use tower::util::BoxCloneSyncService;
use tower::{Layer, Service};

use crate::facilitator::Facilitator;
use crate::gate::Paygate;
use crate::pricing::PriceTable;

/// The payment-gate middleware.
///
/// Create one per application from the facilitator and the validated price
/// table, then layer it over the router.
pub struct PaymentGate<F> {
    facilitator: F,
    prices: Arc<PriceTable>,
}

impl<F: Clone> Clone for PaymentGate<F> {
    fn clone(&self) -> Self {
        Self {
            facilitator: self.facilitator.clone(),
            prices: Arc::clone(&self.prices),
        }
    }
}

impl<F: std::fmt::Debug> std::fmt::Debug for PaymentGate<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentGate")
            .field("facilitator", &self.facilitator)
            .field("prices", &self.prices)
            .finish()
    }
}

impl<F> PaymentGate<F> {
    /// Creates the middleware from a facilitator and a price table.
    pub fn new(facilitator: F, prices: PriceTable) -> Self {
        Self {
            facilitator,
            prices: Arc::new(prices),
        }
    }

    /// Returns the price table consulted per request.
    #[must_use]
    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Returns a reference to the underlying facilitator.
    pub const fn facilitator(&self) -> &F {
        &self.facilitator
    }
}

impl<S, F> Layer<S> for PaymentGate<F>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
    F: Facilitator + Clone,
{
    type Service = PaymentGateService<F>;

    fn layer(&self, inner: S) -> Self::Service {
        PaymentGateService {
            facilitator: self.facilitator.clone(),
            prices: Arc::clone(&self.prices),
            inner: BoxCloneSyncService::new(inner),
        }
    }
}

/// Service produced by [`PaymentGate`].
#[derive(Clone)]
#[allow(missing_debug_implementations)] // BoxCloneSyncService does not implement Debug
pub struct PaymentGateService<F> {
    facilitator: F,
    prices: Arc<PriceTable>,
    inner: BoxCloneSyncService<Request, Response, Infallible>,
}

impl<F> Service<Request> for PaymentGateService<F>
where
    F: Facilitator + Clone + Send + Sync + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let facilitator = self.facilitator.clone();
        let prices = Arc::clone(&self.prices);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            // Exact-match lookup; no entry means the route is free.
            let Some(entry) = prices.lookup(req.method(), req.uri().path()) else {
                return inner.call(req).await;
            };

            let gate = Paygate {
                facilitator,
                entry: entry.clone(),
            };
            gate.handle_request(inner, req).await
        })
    }
}
