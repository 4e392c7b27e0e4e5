//! Demo HTTP server with micropayment-gated content.
//!
//! Three routes: a free index, and two content endpoints priced at $0.001
//! and $0.01 behind an x402-style payment gate. The binary wires a real
//! [`HttpFacilitator`] into the gate; tests substitute a fake one through
//! [`app`].
//!
//! [`HttpFacilitator`]: tollbooth::client::HttpFacilitator

use axum::Router;
use axum::routing::get;
use tollbooth::facilitator::Facilitator;
use tollbooth::layer::PaymentGate;
use tollbooth::pricing::{GatedRoute, PriceTable, PriceTableError, PriceTag};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

pub mod config;
pub mod routes;

/// Builds the price table for this server's gated routes.
///
/// # Errors
///
/// Returns [`PriceTableError`] if the declarations are inconsistent; with
/// the fixed declarations below that indicates a programming error.
pub fn price_table(config: &ServerConfig) -> Result<PriceTable, PriceTableError> {
    let tag = |amount: &str| PriceTag {
        amount: amount.parse().expect("static price literal"),
        pay_to: config.recipient.clone(),
        network: config.network,
    };
    PriceTable::builder()
        .price(GatedRoute::Premium, tag("$0.001"))
        .price(GatedRoute::Expensive, tag("$0.01"))
        .build()
}

/// Assembles the full router: content handlers behind the payment gate,
/// request tracing outermost.
pub fn app<F>(facilitator: F, prices: PriceTable) -> Router
where
    F: Facilitator + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(routes::index))
        .route("/premium", get(routes::premium))
        .route("/expensive", get(routes::expensive))
        .layer(PaymentGate::new(facilitator, prices))
        .layer(TraceLayer::new_for_http())
}
