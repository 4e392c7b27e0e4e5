//! Error taxonomy of the payment gate.
//!
//! Three outcomes a denied request can have, kept distinct all the way to
//! the wire: the caller forgot to pay, the caller's payment was refused, or
//! the verification dependency itself failed.

use crate::facilitator::FacilitatorError;

/// Client-side payment failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// The request carried no payment proof at all.
    #[error("{0} header is required")]
    PaymentHeaderRequired(&'static str),
    /// The payment header exists but is not a usable value.
    #[error("invalid or malformed payment header")]
    InvalidPaymentHeader,
    /// The facilitator examined the proof and refused it.
    #[error("payment proof rejected: {0}")]
    ProofRejected(String),
}

/// Any reason the gate denies a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// The caller has not (correctly) paid.
    #[error(transparent)]
    Verification(#[from] VerificationError),
    /// The facilitator was unreachable or misbehaved. Never presented as a
    /// payment failure: the caller may well have paid.
    #[error("facilitator unavailable: {0}")]
    Facilitator(String),
}

impl From<FacilitatorError> for GateError {
    fn from(err: FacilitatorError) -> Self {
        match err {
            FacilitatorError::Rejected { reason } => {
                Self::Verification(VerificationError::ProofRejected(reason))
            }
            FacilitatorError::Unavailable { message } => Self::Facilitator(message),
        }
    }
}
