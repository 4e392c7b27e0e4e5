//! Demo content handlers.
//!
//! Handlers here know nothing about payments. The payment gate sits in front
//! of them as a layer, so by the time a gated handler runs the payment has
//! already been verified and settled.

use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Body of the public index response.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    message: &'static str,
    endpoints: Endpoints,
}

#[derive(Debug, Serialize)]
struct Endpoints {
    #[serde(rename = "/")]
    index: &'static str,
    #[serde(rename = "/premium")]
    premium: &'static str,
    #[serde(rename = "/expensive")]
    expensive: &'static str,
}

/// Body of a successfully paid-for content response.
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    message: &'static str,
    data: Content,
}

#[derive(Debug, Serialize)]
struct Content {
    secret: &'static str,
    /// ISO 8601 timestamp of when the content was served.
    timestamp: String,
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `GET /` — public endpoint listing what the server offers.
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "x402 Solana Server",
        endpoints: Endpoints {
            index: "Public - no payment required",
            premium: "Protected - $0.001 USDC payment required",
            expensive: "Protected - $0.01 USDC payment required",
        },
    })
}

/// `GET /premium` — reached only after a verified payment.
pub async fn premium() -> Json<ContentResponse> {
    Json(ContentResponse {
        message: "🎉 Premium content accessed!",
        data: Content {
            secret: "This is premium content",
            timestamp: now_iso8601(),
        },
    })
}

/// `GET /expensive` — reached only after a verified payment.
pub async fn expensive() -> Json<ContentResponse> {
    Json(ContentResponse {
        message: "💎 Expensive content accessed!",
        data: Content {
            secret: "This is very expensive premium content",
            timestamp: now_iso8601(),
        },
    })
}
