//! Core payment gate logic.
//!
//! The [`Paygate`] handles the lifecycle of a single priced request:
//! extracting the payment proof header, delegating verification to the
//! facilitator, and rendering the appropriate denial response when the
//! request may not pass.
//!
//! Each request is classified independently; nothing is recorded on allow,
//! and no handler code runs on deny.

use std::convert::Infallible;

use axum_core::body::Body;
use axum_core::response::{IntoResponse, Response};
use base64::prelude::*;
use http::{HeaderMap, HeaderValue, StatusCode};
use serde_json::json;
use tower::Service;

use crate::error::{GateError, VerificationError};
use crate::facilitator::{Facilitator, Settlement};
use crate::pricing::PricedRoute;
use crate::types::PaymentProof;

/// Header carrying the caller's opaque payment proof.
pub const PAYMENT_HEADER: &str = "X-Payment";

/// Header carrying the base64-encoded settlement receipt on success.
pub const PAYMENT_RESPONSE_HEADER: &str = "X-Payment-Response";

/// Payment gate for a single priced request.
///
/// Constructed by the middleware after the price table matched, then
/// consumed by [`Paygate::handle_request`].
#[derive(Debug)]
pub struct Paygate<TFacilitator> {
    /// The facilitator verifying and settling the payment.
    pub facilitator: TFacilitator,
    /// The matched route and its price.
    pub entry: PricedRoute,
}

impl<TFacilitator> Paygate<TFacilitator>
where
    TFacilitator: Facilitator,
{
    /// Runs the payment lifecycle for the request.
    ///
    /// On success the inner service runs and its response gains a
    /// [`PAYMENT_RESPONSE_HEADER`] receipt. On any failure the inner
    /// service never runs and the denial is rendered as an HTTP response.
    ///
    /// # Errors
    ///
    /// Infallible: every failure becomes a response.
    pub async fn handle_request<ReqBody, ResBody, S>(
        self,
        inner: S,
        req: http::Request<ReqBody>,
    ) -> Result<Response, Infallible>
    where
        S: Service<http::Request<ReqBody>, Response = http::Response<ResBody>>,
        S::Response: IntoResponse,
        S::Error: IntoResponse,
        S::Future: Send,
    {
        match self.handle_request_fallible(inner, req).await {
            Ok(response) => Ok(response),
            Err(err) => Ok(error_into_response(&err, &self.entry)),
        }
    }

    /// Fallible form of [`Paygate::handle_request`], returning the denial
    /// as a [`GateError`] instead of a rendered response.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] when the proof is missing, malformed, rejected
    /// by the facilitator, or the facilitator itself fails.
    pub async fn handle_request_fallible<ReqBody, ResBody, S>(
        &self,
        mut inner: S,
        req: http::Request<ReqBody>,
    ) -> Result<Response, GateError>
    where
        S: Service<http::Request<ReqBody>, Response = http::Response<ResBody>>,
        S::Response: IntoResponse,
        S::Error: IntoResponse,
        S::Future: Send,
    {
        let proof = extract_payment_proof(req.headers())?;

        let settlement = self
            .facilitator
            .verify(&proof, &self.entry.tag)
            .await
            .map_err(GateError::from)?;

        tracing::debug!(
            resource = self.entry.route.path(),
            transaction = %settlement.transaction,
            "payment verified"
        );

        let receipt = settlement_to_header(&settlement)?;

        let response = match inner.call(req).await {
            Ok(response) => response,
            Err(err) => return Ok(err.into_response()),
        };

        let mut response = response.into_response();
        response.headers_mut().insert(PAYMENT_RESPONSE_HEADER, receipt);
        Ok(response)
    }
}

/// Pulls the opaque payment proof out of the request headers.
fn extract_payment_proof(headers: &HeaderMap) -> Result<PaymentProof, VerificationError> {
    let value = headers
        .get(PAYMENT_HEADER)
        .ok_or(VerificationError::PaymentHeaderRequired(PAYMENT_HEADER))?;
    let value = value
        .to_str()
        .map_err(|_| VerificationError::InvalidPaymentHeader)?;
    if value.trim().is_empty() {
        return Err(VerificationError::InvalidPaymentHeader);
    }
    Ok(PaymentProof::new(value))
}

/// Encodes a settlement receipt for the [`PAYMENT_RESPONSE_HEADER`].
fn settlement_to_header(settlement: &Settlement) -> Result<HeaderValue, GateError> {
    let bytes = serde_json::to_vec(settlement)
        .map_err(|err| GateError::Facilitator(err.to_string()))?;
    let encoded = BASE64_STANDARD.encode(&bytes);
    HeaderValue::from_str(&encoded).map_err(|err| GateError::Facilitator(err.to_string()))
}

/// Renders a denial as the wire response.
///
/// Three distinguishable outcomes: `payment-required` (no usable proof,
/// 402), `payment-invalid` (proof refused, 402), and `facilitator-error`
/// (dependency failure, 502). The 402 bodies carry the full payment
/// metadata so a compliant client can pay and retry.
pub(crate) fn error_into_response(err: &GateError, entry: &PricedRoute) -> Response {
    let (status, body) = match err {
        GateError::Verification(
            verification @ (VerificationError::PaymentHeaderRequired(_)
            | VerificationError::InvalidPaymentHeader),
        ) => (
            StatusCode::PAYMENT_REQUIRED,
            json!({
                "error": "payment-required",
                "message": verification.to_string(),
                "accepts": [entry.requirements()],
            }),
        ),
        GateError::Verification(VerificationError::ProofRejected(reason)) => {
            tracing::debug!(resource = entry.route.path(), %reason, "payment proof rejected");
            (
                StatusCode::PAYMENT_REQUIRED,
                json!({
                    "error": "payment-invalid",
                    "reason": reason,
                    "accepts": [entry.requirements()],
                }),
            )
        }
        GateError::Facilitator(message) => {
            tracing::error!(resource = entry.route.path(), %message, "facilitator failure");
            (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "facilitator-error",
                    "message": message,
                }),
            )
        }
    };

    Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("static response construction cannot fail")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{GatedRoute, PriceTag};
    use crate::types::Network;

    fn entry() -> PricedRoute {
        PricedRoute {
            route: GatedRoute::Premium,
            tag: PriceTag {
                amount: "$0.001".parse().unwrap(),
                pay_to: "seFkxFkXEY9JGEpCyPfCWTuPZG9WK6ucf95zvKCfsRX".parse().unwrap(),
                network: Network::SolanaDevnet,
            },
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn missing_header_is_payment_required() {
        let err = extract_payment_proof(&HeaderMap::new()).unwrap_err();
        assert_eq!(
            err,
            VerificationError::PaymentHeaderRequired(PAYMENT_HEADER)
        );
    }

    #[test]
    fn blank_header_is_invalid() {
        let mut headers = HeaderMap::new();
        headers.insert(PAYMENT_HEADER, HeaderValue::from_static("   "));
        assert_eq!(
            extract_payment_proof(&headers).unwrap_err(),
            VerificationError::InvalidPaymentHeader
        );
    }

    #[tokio::test]
    async fn missing_payment_renders_402_with_metadata() {
        let err = GateError::Verification(VerificationError::PaymentHeaderRequired(
            PAYMENT_HEADER,
        ));
        let response = error_into_response(&err, &entry());
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "payment-required");
        assert_eq!(body["accepts"][0]["amount"], "$0.001");
        assert_eq!(body["accepts"][0]["network"], "solana-devnet");
    }

    #[tokio::test]
    async fn rejected_payment_renders_402_invalid() {
        let err =
            GateError::Verification(VerificationError::ProofRejected("already spent".into()));
        let response = error_into_response(&err, &entry());
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "payment-invalid");
        assert_eq!(body["reason"], "already spent");
    }

    #[tokio::test]
    async fn facilitator_failure_renders_502() {
        let err = GateError::Facilitator("connection refused".into());
        let response = error_into_response(&err, &entry());
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"], "facilitator-error");
    }

    #[test]
    fn settlement_header_is_base64_json() {
        let settlement = Settlement {
            transaction: "5sig".into(),
            network: Network::SolanaDevnet,
            payer: None,
        };
        let header = settlement_to_header(&settlement).unwrap();
        let decoded = BASE64_STANDARD.decode(header.to_str().unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(value["transaction"], "5sig");
        assert_eq!(value["network"], "solana-devnet");
    }
}
