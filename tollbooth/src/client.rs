//! A [`Facilitator`] implementation backed by a _remote_ hosted facilitator
//! over HTTP.
//!
//! [`HttpFacilitator`] talks JSON to the facilitator's `/verify` and
//! `/settle` endpoints. A single [`Facilitator::verify`] capability call
//! performs the pre-flight verification and, when the proof is good, the
//! settlement round trip.
//!
//! ## Error handling
//!
//! Transport-level failures (connect errors, unexpected statuses, garbage
//! JSON) surface as [`FacilitatorError::Unavailable`] and never masquerade
//! as payment failures. Only an explicit refusal from the facilitator
//! becomes [`FacilitatorError::Rejected`].

use std::time::Duration;

use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::facilitator::{BoxFuture, Facilitator, FacilitatorError, Settlement};
use crate::pricing::PriceTag;
use crate::types::{Network, PaymentProof, RecipientAddress};

/// Default hosted facilitator endpoint.
pub const DEFAULT_FACILITATOR_URL: &str = "https://x402.org/facilitator";

/// A client for a remote payment facilitator.
///
/// Handles the `/verify` and `/settle` endpoints via JSON HTTP.
#[derive(Clone, Debug)]
pub struct HttpFacilitator {
    /// Base URL of the facilitator (e.g. `https://facilitator.example/`)
    base_url: Url,
    /// Full URL for `POST /verify` requests
    verify_url: Url,
    /// Full URL for `POST /settle` requests
    settle_url: Url,
    /// Shared reqwest HTTP client
    client: reqwest::Client,
    /// Optional custom headers sent with each request
    headers: HeaderMap,
    /// Optional request timeout
    timeout: Option<Duration>,
}

/// Errors that can occur while talking to the remote facilitator.
#[derive(Debug, thiserror::Error)]
pub enum HttpFacilitatorError {
    /// URL parse error.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// HTTP transport error.
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// JSON deserialization error.
    #[error("failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// Unexpected HTTP status code.
    #[error("unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        /// Human-readable context.
        context: &'static str,
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },
    /// Failed to read response body.
    #[error("failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

impl From<HttpFacilitatorError> for FacilitatorError {
    fn from(err: HttpFacilitatorError) -> Self {
        Self::Unavailable {
            message: err.to_string(),
        }
    }
}

/// Body of `POST /verify` and `POST /settle` requests: the caller's opaque
/// proof plus the price it is checked against.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChargeRequest<'a> {
    payment_proof: &'a PaymentProof,
    pay_to: &'a RecipientAddress,
    amount: crate::amount::MoneyAmount,
    network: Network,
}

/// Facilitator answer to `POST /verify`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    is_valid: bool,
    #[serde(default)]
    invalid_reason: Option<String>,
}

/// Facilitator answer to `POST /settle`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettleResponse {
    success: bool,
    #[serde(default)]
    error_reason: Option<String>,
    #[serde(default)]
    transaction: String,
    network: Network,
    #[serde(default)]
    payer: Option<String>,
}

impl HttpFacilitator {
    /// Returns the base URL used by this client.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the computed `./verify` URL.
    pub const fn verify_url(&self) -> &Url {
        &self.verify_url
    }

    /// Returns the computed `./settle` URL.
    pub const fn settle_url(&self) -> &Url {
        &self.settle_url
    }

    /// Constructs a new [`HttpFacilitator`] from a base URL.
    ///
    /// This sets up the `./verify` and `./settle` endpoint URLs relative to
    /// the base. The base path is normalized to end in `/` first, so a base
    /// like `https://host/facilitator` keeps its last path segment when the
    /// endpoints are joined.
    ///
    /// # Errors
    ///
    /// Returns [`HttpFacilitatorError`] if URL construction fails.
    pub fn try_new(mut base_url: Url) -> Result<Self, HttpFacilitatorError> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let verify_url =
            base_url
                .join("./verify")
                .map_err(|e| HttpFacilitatorError::UrlParse {
                    context: "failed to construct ./verify URL",
                    source: e,
                })?;
        let settle_url =
            base_url
                .join("./settle")
                .map_err(|e| HttpFacilitatorError::UrlParse {
                    context: "failed to construct ./settle URL",
                    source: e,
                })?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            verify_url,
            settle_url,
            headers: HeaderMap::new(),
            timeout: None,
        })
    }

    /// Attaches custom headers to all future requests.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Verifies the proof and settles the payment.
    ///
    /// # Errors
    ///
    /// Returns [`FacilitatorError::Rejected`] when the facilitator refuses
    /// the proof at either stage, [`FacilitatorError::Unavailable`] for any
    /// transport or protocol failure.
    pub async fn verify_and_settle(
        &self,
        proof: &PaymentProof,
        price: &PriceTag,
    ) -> Result<Settlement, FacilitatorError> {
        let request = ChargeRequest {
            payment_proof: proof,
            pay_to: &price.pay_to,
            amount: price.amount,
            network: price.network,
        };

        let verdict: VerifyResponse = self
            .post_json(&self.verify_url, "POST /verify", &request)
            .await?;
        if !verdict.is_valid {
            return Err(FacilitatorError::Rejected {
                reason: verdict
                    .invalid_reason
                    .unwrap_or_else(|| "payment proof is not valid".to_owned()),
            });
        }

        let settled: SettleResponse = self
            .post_json(&self.settle_url, "POST /settle", &request)
            .await?;
        if !settled.success {
            return Err(FacilitatorError::Rejected {
                reason: settled
                    .error_reason
                    .unwrap_or_else(|| "settlement failed".to_owned()),
            });
        }

        Ok(Settlement {
            transaction: settled.transaction,
            network: settled.network,
            payer: settled.payer,
        })
    }

    /// Generic POST helper handling JSON serialization, timeout
    /// application, and error mapping.
    ///
    /// `context` is a human-readable identifier used in error messages
    /// (e.g. `"POST /verify"`).
    async fn post_json<T, R>(
        &self,
        url: &Url,
        context: &'static str,
        payload: &T,
    ) -> Result<R, HttpFacilitatorError>
    where
        T: Serialize + Sync + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let mut req = self.client.post(url.clone()).json(payload);
        for (key, value) in &self.headers {
            req = req.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| HttpFacilitatorError::Http { context, source: e })?;

        if http_response.status() == StatusCode::OK {
            http_response
                .json::<R>()
                .await
                .map_err(|e| HttpFacilitatorError::JsonDeserialization { context, source: e })
        } else {
            let status = http_response.status();
            let body = http_response
                .text()
                .await
                .map_err(|e| HttpFacilitatorError::ResponseBodyRead { context, source: e })?;
            Err(HttpFacilitatorError::HttpStatus {
                context,
                status,
                body,
            })
        }
    }
}

impl Facilitator for HttpFacilitator {
    fn verify<'a>(
        &'a self,
        proof: &'a PaymentProof,
        price: &'a PriceTag,
    ) -> BoxFuture<'a, Result<Settlement, FacilitatorError>> {
        Box::pin(self.verify_and_settle(proof, price))
    }
}

/// Converts a string URL into an [`HttpFacilitator`], normalizing trailing
/// slashes so endpoint joins behave.
impl TryFrom<&str> for HttpFacilitator {
    type Error = HttpFacilitatorError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut normalized = value.trim_end_matches('/').to_owned();
        normalized.push('/');
        let url = Url::parse(&normalized).map_err(|e| HttpFacilitatorError::UrlParse {
            context: "failed to parse base url",
            source: e,
        })?;
        Self::try_new(url)
    }
}

impl TryFrom<String> for HttpFacilitator {
    type Error = HttpFacilitatorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}
