//! The facilitator capability.
//!
//! All payment verification and settlement is delegated to an external
//! facilitator service. The gate sees it through a single-operation trait so
//! the request lifecycle is testable with a substitutable fake and carries
//! no network dependency of its own.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::pricing::PriceTag;
use crate::types::{Network, PaymentProof};

/// Boxed future used by the object-safe [`Facilitator`] trait.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Receipt for a verified and settled payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    /// Transaction identifier on the settlement network.
    pub transaction: String,
    /// Network the payment settled on.
    pub network: Network,
    /// The payer's account, when the facilitator reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

/// How a facilitator call can fail.
///
/// The two variants are deliberately distinct: a [`Rejected`] proof is the
/// caller's problem (they pay again, correctly), an [`Unavailable`]
/// facilitator is ours (the caller must not be told to re-pay).
///
/// [`Rejected`]: FacilitatorError::Rejected
/// [`Unavailable`]: FacilitatorError::Unavailable
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FacilitatorError {
    /// The facilitator examined the proof and refused it (malformed,
    /// expired, insufficient, or already spent).
    #[error("payment proof rejected: {reason}")]
    Rejected {
        /// Facilitator-reported reason for the refusal.
        reason: String,
    },
    /// The facilitator could not be reached or answered nonsense.
    #[error("facilitator unavailable: {message}")]
    Unavailable {
        /// Description of the transport or protocol failure.
        message: String,
    },
}

impl FacilitatorError {
    /// True when the error indicates a bad proof rather than a broken
    /// dependency.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Verifies a payment proof against a price and settles the payment.
///
/// One call per request: there is no multi-step handshake, and no state is
/// retained between calls. Double-spend accounting belongs to the
/// facilitator and its network, not to implementors of this trait.
pub trait Facilitator: Send + Sync {
    /// Verifies `proof` against `price`, settling the payment on success.
    fn verify<'a>(
        &'a self,
        proof: &'a PaymentProof,
        price: &'a PriceTag,
    ) -> BoxFuture<'a, Result<Settlement, FacilitatorError>>;
}

impl<F: Facilitator + ?Sized> Facilitator for Arc<F> {
    fn verify<'a>(
        &'a self,
        proof: &'a PaymentProof,
        price: &'a PriceTag,
    ) -> BoxFuture<'a, Result<Settlement, FacilitatorError>> {
        (**self).verify(proof, price)
    }
}
