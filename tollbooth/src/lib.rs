//! Axum middleware for gating routes behind micropayments.
//!
//! A request to a priced route must carry an opaque payment proof in the
//! `X-Payment` header. The gate checks the route against a static
//! [`PriceTable`], forwards the proof to a remote [`Facilitator`] for
//! verification and settlement, and only then lets the request reach its
//! handler. Requests without a usable proof receive `402 Payment Required`
//! with machine-readable price metadata; facilitator outages surface as
//! `502`, never as a payment failure.
//!
//! # Overview
//!
//! ```ignore
//! use tollbooth::client::HttpFacilitator;
//! use tollbooth::layer::PaymentGate;
//! use tollbooth::pricing::{GatedRoute, PriceTable, PriceTag};
//!
//! let facilitator = HttpFacilitator::try_from("https://x402.org/facilitator")?;
//! let prices = PriceTable::builder()
//!     .price(GatedRoute::Premium, PriceTag { amount, pay_to, network })
//!     .price(GatedRoute::Expensive, PriceTag { amount, pay_to, network })
//!     .build()?;
//! let app = router.layer(PaymentGate::new(facilitator, prices));
//! ```
//!
//! # Modules
//!
//! - [`amount`] - Human-readable USD amount parsing
//! - [`client`] - HTTP client for a remote facilitator
//! - [`error`] - Denial taxonomy of the gate
//! - [`facilitator`] - The facilitator capability trait
//! - [`gate`] - Per-request payment lifecycle
//! - [`layer`] - The tower layer/service pair
//! - [`pricing`] - Closed route enumeration and the price table
//! - [`types`] - Networks, recipient identity, opaque payment proof

pub mod amount;
pub mod client;
pub mod error;
pub mod facilitator;
pub mod gate;
pub mod layer;
pub mod pricing;
pub mod types;

pub use amount::MoneyAmount;
pub use client::{DEFAULT_FACILITATOR_URL, HttpFacilitator};
pub use error::{GateError, VerificationError};
pub use facilitator::{Facilitator, FacilitatorError, Settlement};
pub use layer::PaymentGate;
pub use pricing::{GatedRoute, PriceTable, PriceTag};
pub use types::{Network, PaymentProof, RecipientAddress};

#[doc(inline)]
pub use gate::{PAYMENT_HEADER, PAYMENT_RESPONSE_HEADER};
