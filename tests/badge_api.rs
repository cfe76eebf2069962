use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use tower::ServiceExt;
use wcg_badges::{
    app::{build_router, AppState},
    error::BadgeError,
    models::PaymentRecord,
    services::{ManualClock, MemoryStore, RecordStore, SystemClock, Verifier},
};

const XRP_CALLBACK: &str = r#"{"data":{"currency":"XRP","destination":"rABC","amount":"500"}}"#;
const IE_USER_AGENT: &str = "Mozilla/4.0 (compatible; MSIE 8.0; Windows NT 6.1)";

struct ScriptedVerifier {
    valid: AtomicBool,
    seen: Mutex<Vec<Vec<u8>>>,
}

impl ScriptedVerifier {
    fn new(valid: bool) -> Self {
        Self {
            valid: AtomicBool::new(valid),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Verifier for ScriptedVerifier {
    async fn confirm(&self, raw_body: &[u8]) -> bool {
        self.seen.lock().unwrap().push(raw_body.to_vec());
        self.valid.load(Ordering::SeqCst)
    }
}

struct UnreachableStore;

#[async_trait]
impl RecordStore for UnreachableStore {
    async fn put(&self, _record: &PaymentRecord) -> Result<(), BadgeError> {
        Err(BadgeError::StoreUnavailable("connection refused".to_string()))
    }

    async fn get(&self, _recipient: &str) -> Result<Option<PaymentRecord>, BadgeError> {
        Err(BadgeError::StoreUnavailable("connection refused".to_string()))
    }

    async fn ping(&self) -> bool {
        false
    }
}

struct Harness {
    app: Router,
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
    verifier: Arc<ScriptedVerifier>,
}

fn harness(valid: bool) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    ));
    let verifier = Arc::new(ScriptedVerifier::new(valid));
    let state = AppState::new(verifier.clone(), store.clone(), clock.clone());

    Harness {
        app: build_router(state),
        store,
        clock,
        verifier,
    }
}

async fn post_callback(app: &Router, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/callback")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str, user_agent: Option<&str>) -> (StatusCode, String) {
    let mut builder = Request::builder().uri(uri);
    if let Some(ua) = user_agent {
        builder = builder.header(header::USER_AGENT, ua);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn is_grayscale(svg: &str) -> bool {
    svg.contains(r#"filter="url(#grayscale)""#)
}

#[tokio::test]
async fn unknown_recipient_gets_zero_gray_badge() {
    let h = harness(true);

    let (status, svg) = get(&h.app, "/rNobody", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(svg.contains(">\u{3000}\u{3000}0 XRP</text>"));
    assert!(is_grayscale(&svg));
}

#[tokio::test]
async fn badge_has_svg_content_type() {
    let h = harness(true);
    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/rNobody").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/svg+xml"
    );
}

#[tokio::test]
async fn valid_payment_powers_badge_for_a_day() {
    let h = harness(true);

    let (status, body) = post_callback(&h.app, XRP_CALLBACK).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let record = h.store.get("rABC").await.unwrap().unwrap();
    assert_eq!(record.amount, 500.0);
    assert_eq!(record.observed_at, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());

    h.clock.advance(Duration::hours(23));
    let (_, svg) = get(&h.app, "/rABC", None).await;
    assert!(svg.contains(">500 XRP</text>"));
    assert!(!is_grayscale(&svg));

    h.clock.advance(Duration::hours(1));
    let (_, svg) = get(&h.app, "/rABC", None).await;
    assert!(svg.contains(">500 XRP</text>"));
    assert!(is_grayscale(&svg));
}

#[tokio::test]
async fn verifier_receives_raw_body() {
    let h = harness(true);
    let raw = "{ \"data\" : {\"amount\":\"1\", \"destination\":\"rX\", \"currency\":\"XRP\"} }";

    post_callback(&h.app, raw).await;

    let seen = h.verifier.seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[raw.as_bytes().to_vec()]);
}

#[tokio::test]
async fn other_currency_is_acknowledged_but_ignored() {
    let h = harness(true);
    let body = r#"{"data":{"currency":"USD","destination":"rABC","amount":{"value":"5","issuer":"rGate"}}}"#;

    let (status, text) = post_callback(&h.app, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "OK");
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn failed_validation_is_rejected_without_mutation() {
    let h = harness(false);

    let (status, text) = post_callback(&h.app, XRP_CALLBACK).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text, "not at all ok");
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn failed_validation_keeps_existing_record() {
    let h = harness(true);
    post_callback(&h.app, XRP_CALLBACK).await;

    h.verifier.valid.store(false, Ordering::SeqCst);
    let forged = r#"{"data":{"currency":"XRP","destination":"rABC","amount":"999999"}}"#;
    let (status, _) = post_callback(&h.app, forged).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.store.get("rABC").await.unwrap().unwrap().amount, 500.0);
}

#[tokio::test]
async fn malformed_confirmed_payload_is_a_server_error() {
    let h = harness(true);

    let (status, body) = post_callback(&h.app, r#"{"data":{"currency":"XRP"}}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error_code"], "MALFORMED_PAYLOAD");
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn sample_badge_is_powered() {
    let h = harness(true);

    let (status, svg) = get(&h.app, "/sample", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(svg.contains(">12345 XRP</text>"));
    assert!(!is_grayscale(&svg));
    assert!(svg.contains(r#"text-anchor="end""#));
}

#[tokio::test]
async fn internet_explorer_gets_start_anchor_only() {
    let h = harness(true);

    let (_, standard) = get(&h.app, "/sample", None).await;
    let (_, compat) = get(&h.app, "/sample", Some(IE_USER_AGENT)).await;

    assert!(compat.contains(r#"textLength="135" x="85" text-anchor="start""#));
    assert_eq!(
        standard.replace(r#"x="218" text-anchor="end""#, ""),
        compat.replace(r#"x="85" text-anchor="start""#, "")
    );
}

#[tokio::test]
async fn index_page_is_html() {
    let h = harness(true);

    let (status, body) = get(&h.app, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<img src=\"/sample\""));
}

#[tokio::test]
async fn health_reports_store() {
    let h = harness(true);

    let (status, body) = get(&h.app, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["store"], true);
}

#[tokio::test]
async fn callback_rejects_get() {
    let h = harness(true);

    let (status, _) = get(&h.app, "/callback", None).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

fn unreachable_store_app() -> Router {
    let state = AppState::new(
        Arc::new(ScriptedVerifier::new(true)),
        Arc::new(UnreachableStore),
        Arc::new(SystemClock),
    );
    build_router(state)
}

fn error_code(body: &str) -> String {
    let error: serde_json::Value = serde_json::from_str(body).unwrap();
    error["error_code"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn callback_fails_with_503_when_store_is_down() {
    let app = unreachable_store_app();

    let (status, body) = post_callback(&app, XRP_CALLBACK).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&body), "STORE_UNAVAILABLE");
}

#[tokio::test]
async fn badge_fails_with_503_when_store_is_down() {
    let app = unreachable_store_app();

    let (status, body) = get(&app, "/rA", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&body), "STORE_UNAVAILABLE");
    assert!(!body.contains("<svg"));
}

#[tokio::test]
async fn health_is_degraded_when_store_is_down() {
    let app = unreachable_store_app();

    let (status, body) = get(&app, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["store"], false);
}
