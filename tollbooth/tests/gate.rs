//! End-to-end gate behavior over a real axum router.
//!
//! The facilitator is a counting fake, so every test can assert exactly how
//! many verification calls a request cost and whether the inner handler ran.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::routing::get;
use base64::Engine as _;
use base64::prelude::BASE64_STANDARD;
use http::{Method, Request, StatusCode, header};
use tollbooth::facilitator::{BoxFuture, Facilitator, FacilitatorError, Settlement};
use tollbooth::gate::{PAYMENT_HEADER, PAYMENT_RESPONSE_HEADER};
use tollbooth::layer::PaymentGate;
use tollbooth::pricing::{GatedRoute, PriceTable, PriceTag};
use tollbooth::types::{Network, PaymentProof};
use tower::ServiceExt as _;

/// Scripted facilitator that counts its calls.
#[derive(Debug)]
struct FakeFacilitator {
    outcome: Result<Settlement, FacilitatorError>,
    calls: AtomicUsize,
}

impl FakeFacilitator {
    fn settling() -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(Settlement {
                transaction: "5Sx".repeat(10),
                network: Network::SolanaDevnet,
                payer: Some("payer11111111111111111111111111111111111111".into()),
            }),
            calls: AtomicUsize::new(0),
        })
    }

    fn rejecting(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(FacilitatorError::Rejected {
                reason: reason.into(),
            }),
            calls: AtomicUsize::new(0),
        })
    }

    fn unavailable(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(FacilitatorError::Unavailable {
                message: message.into(),
            }),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Facilitator for FakeFacilitator {
    fn verify<'a>(
        &'a self,
        _proof: &'a PaymentProof,
        _price: &'a PriceTag,
    ) -> BoxFuture<'a, Result<Settlement, FacilitatorError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}

fn prices() -> PriceTable {
    let pay_to = "seFkxFkXEY9JGEpCyPfCWTuPZG9WK6ucf95zvKCfsRX"
        .parse()
        .unwrap();
    PriceTable::builder()
        .price(
            GatedRoute::Premium,
            PriceTag {
                amount: "$0.001".parse().unwrap(),
                pay_to,
                network: Network::SolanaDevnet,
            },
        )
        .price(
            GatedRoute::Expensive,
            PriceTag {
                amount: "$0.01".parse().unwrap(),
                pay_to: "seFkxFkXEY9JGEpCyPfCWTuPZG9WK6ucf95zvKCfsRX"
                    .parse()
                    .unwrap(),
                network: Network::SolanaDevnet,
            },
        )
        .build()
        .unwrap()
}

/// Router with a hit counter on each handler, gated by `facilitator`.
fn app(facilitator: Arc<FakeFacilitator>, handler_hits: Arc<AtomicUsize>) -> Router {
    let free_hits = Arc::clone(&handler_hits);
    let premium_hits = Arc::clone(&handler_hits);
    let expensive_hits = handler_hits;
    Router::new()
        .route(
            "/",
            get(move || {
                free_hits.fetch_add(1, Ordering::SeqCst);
                async { "index" }
            }),
        )
        .route(
            "/premium",
            get(move || {
                premium_hits.fetch_add(1, Ordering::SeqCst);
                async { "premium content" }
            }),
        )
        .route(
            "/expensive",
            get(move || {
                expensive_hits.fetch_add(1, Ordering::SeqCst);
                async { "expensive content" }
            }),
        )
        .layer(PaymentGate::new(facilitator, prices()))
}

fn get_request(path: &str, proof: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(path);
    if let Some(proof) = proof {
        builder = builder.header(PAYMENT_HEADER, proof);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn free_route_never_touches_the_facilitator() {
    let facilitator = FakeFacilitator::settling();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = app(Arc::clone(&facilitator), Arc::clone(&hits));

    let response = app
        .clone()
        .oneshot(get_request("/", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A stray payment header on a free route is ignored, not verified.
    let response = app
        .oneshot(get_request("/", Some("unsolicited-proof")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(facilitator.calls(), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unpaid_request_gets_402_with_price_metadata() {
    let facilitator = FakeFacilitator::settling();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = app(Arc::clone(&facilitator), Arc::clone(&hits));

    let response = app.oneshot(get_request("/premium", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let body = body_json(response).await;
    assert_eq!(body["error"], "payment-required");
    let accepts = &body["accepts"][0];
    assert_eq!(accepts["amount"], "$0.001");
    assert_eq!(
        accepts["payTo"],
        "seFkxFkXEY9JGEpCyPfCWTuPZG9WK6ucf95zvKCfsRX"
    );
    assert_eq!(accepts["network"], "solana-devnet");
    assert_eq!(accepts["resource"], "/premium");

    assert_eq!(facilitator.calls(), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn expensive_route_quotes_its_own_price() {
    let facilitator = FakeFacilitator::settling();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = app(facilitator, hits);

    let response = app.oneshot(get_request("/expensive", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

    let body = body_json(response).await;
    assert_eq!(body["accepts"][0]["amount"], "$0.01");
    assert_eq!(body["accepts"][0]["resource"], "/expensive");
}

#[tokio::test]
async fn valid_proof_runs_handler_once_and_attaches_receipt() {
    let facilitator = FakeFacilitator::settling();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = app(Arc::clone(&facilitator), Arc::clone(&hits));

    let response = app
        .oneshot(get_request("/premium", Some("proof-abc")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(facilitator.calls(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let receipt = response
        .headers()
        .get(PAYMENT_RESPONSE_HEADER)
        .expect("settled response carries a receipt header");
    let decoded = BASE64_STANDARD.decode(receipt.as_bytes()).unwrap();
    let receipt: serde_json::Value = serde_json::from_slice(&decoded).unwrap();
    assert_eq!(receipt["network"], "solana-devnet");
    assert!(receipt["transaction"].is_string());
}

#[tokio::test]
async fn rejected_proof_gets_402_and_handler_never_runs() {
    let facilitator = FakeFacilitator::rejecting("proof already spent");
    let hits = Arc::new(AtomicUsize::new(0));
    let app = app(Arc::clone(&facilitator), Arc::clone(&hits));

    let response = app
        .oneshot(get_request("/premium", Some("stale-proof")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(facilitator.calls(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let body = body_json(response).await;
    assert_eq!(body["error"], "payment-invalid");
    assert_eq!(body["reason"], "proof already spent");
    assert_eq!(body["accepts"][0]["amount"], "$0.001");
}

#[tokio::test]
async fn blank_payment_header_is_invalid_not_missing() {
    let facilitator = FakeFacilitator::settling();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = app(Arc::clone(&facilitator), Arc::clone(&hits));

    let response = app
        .oneshot(get_request("/premium", Some("   ")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(facilitator.calls(), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn facilitator_outage_is_502_never_402() {
    let facilitator = FakeFacilitator::unavailable("connection refused");
    let hits = Arc::new(AtomicUsize::new(0));
    let app = app(Arc::clone(&facilitator), Arc::clone(&hits));

    let response = app
        .oneshot(get_request("/premium", Some("proof-abc")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(facilitator.calls(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let body = body_json(response).await;
    assert_eq!(body["error"], "facilitator-error");
}

#[tokio::test]
async fn repeated_payments_cost_one_verification_each() {
    let facilitator = FakeFacilitator::settling();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = app(Arc::clone(&facilitator), Arc::clone(&hits));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(get_request("/premium", Some("proof-abc")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(facilitator.calls(), 2);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
