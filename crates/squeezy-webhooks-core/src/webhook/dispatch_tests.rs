//! Tests for [`WebhookDispatcher`].

use super::*;
use crate::events::EventName;
use crate::webhook::handler::{handler_fn, HandlerError};
use crate::webhook::reporter::reporter_fn;
use crate::webhook::signature::compute_signature;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;

const SECRET: &str = "test_webhook_secret";

// ============================================================================
// Mock Handler
// ============================================================================

#[derive(Clone, Copy)]
enum Behaviour {
    Succeed,
    Fail,
    Panic,
}

#[derive(Clone)]
struct MockHandler {
    calls: Arc<Mutex<Vec<EventName>>>,
    behaviour: Behaviour,
}

impl MockHandler {
    fn new(behaviour: Behaviour) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            behaviour,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn calls(&self) -> Vec<EventName> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebhookHandler for MockHandler {
    async fn handle(&self, payload: DiscriminatedPayload) -> Result<(), HandlerError> {
        self.calls.lock().unwrap().push(payload.event_name.clone());
        match self.behaviour {
            Behaviour::Succeed => Ok(()),
            Behaviour::Fail => Err(format!("Subscription not found for payment {}", 7).into()),
            Behaviour::Panic => panic!("handler exploded"),
        }
    }
}

// ============================================================================
// Mock Reporter
// ============================================================================

#[derive(Clone, Default)]
struct RecordingReporter {
    reports: Arc<Mutex<Vec<(u16, String)>>>,
}

impl RecordingReporter {
    fn reports(&self) -> Vec<(u16, String)> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl ErrorReporter for RecordingReporter {
    async fn report(&self, error: &WebhookError) {
        self.reports
            .lock()
            .unwrap()
            .push((error.status_code(), error.to_string()));
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

fn dispatcher_with(handler: MockHandler) -> (WebhookDispatcher, RecordingReporter) {
    let reporter = RecordingReporter::default();
    let dispatcher = WebhookDispatcher::new(WebhookSecret::new(SECRET).unwrap(), Arc::new(handler))
        .unwrap()
        .with_reporter(Arc::new(reporter.clone()));
    (dispatcher, reporter)
}

fn sign(body: &[u8]) -> String {
    compute_signature(&WebhookSecret::new(SECRET).unwrap(), body).unwrap()
}

fn signed_request(method: &str, body: &str) -> RawRequest {
    let signature = sign(body.as_bytes());
    RawRequest::new(
        method,
        "http://localhost/api/webhooks",
        vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("X-Signature".to_string(), signature),
        ],
        Bytes::from(body.to_string()),
    )
}

fn order_created_body() -> String {
    serde_json::json!({
        "meta": { "event_name": "order_created", "custom_data": { "orgId": "org_1" } },
        "data": { "type": "orders", "id": "1", "attributes": {} }
    })
    .to_string()
}

// ============================================================================
// Method check
// ============================================================================

#[tokio::test]
async fn test_non_post_returns_405_and_reports() {
    for method in ["GET", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"] {
        let handler = MockHandler::new(Behaviour::Succeed);
        let (dispatcher, reporter) = dispatcher_with(handler.clone());

        let response = dispatcher
            .dispatch(signed_request(method, &order_created_body()))
            .await;

        assert_eq!(response.status(), 405, "{method}");
        assert_eq!(response.body(), r#"{"message":"Method not allowed"}"#);
        assert_eq!(handler.call_count(), 0);

        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].1.contains(method));
    }
}

#[tokio::test]
async fn test_non_post_with_invalid_signature_still_returns_405() {
    let (dispatcher, _) = dispatcher_with(MockHandler::new(Behaviour::Succeed));
    let request = RawRequest::new(
        "GET",
        "/",
        vec![("x-signature", "deadbeef")],
        Bytes::from_static(b"garbage"),
    );

    assert_eq!(dispatcher.dispatch(request).await.status(), 405);
}

// ============================================================================
// Signature check
// ============================================================================

#[tokio::test]
async fn test_invalid_signature_returns_401() {
    let handler = MockHandler::new(Behaviour::Succeed);
    let (dispatcher, reporter) = dispatcher_with(handler.clone());

    let request = RawRequest::new(
        "POST",
        "/",
        vec![("x-signature", "0".repeat(64))],
        Bytes::from(order_created_body()),
    );
    let response = dispatcher.dispatch(request).await;

    assert_eq!(response.status(), 401);
    assert_eq!(response.body(), r#"{"message":"Invalid signature."}"#);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(handler.call_count(), 0);
    assert_eq!(reporter.reports(), vec![(401, "Invalid webhook signature".to_string())]);
}

#[tokio::test]
async fn test_missing_signature_returns_401() {
    let (dispatcher, reporter) = dispatcher_with(MockHandler::new(Behaviour::Succeed));
    let request = RawRequest::new(
        "POST",
        "/",
        Vec::<(String, String)>::new(),
        Bytes::from(order_created_body()),
    );

    assert_eq!(dispatcher.dispatch(request).await.status(), 401);
    assert_eq!(reporter.reports().len(), 1);
}

#[tokio::test]
async fn test_signature_checked_over_raw_bytes() {
    // Same JSON, different whitespace: the signature no longer matches.
    let (dispatcher, _) = dispatcher_with(MockHandler::new(Behaviour::Succeed));
    let body = order_created_body();
    let signature = sign(body.as_bytes());
    let reformatted = serde_json::to_string_pretty(
        &serde_json::from_str::<serde_json::Value>(&body).unwrap(),
    )
    .unwrap();

    let request = RawRequest::new(
        "POST",
        "/",
        vec![("x-signature", signature)],
        Bytes::from(reformatted),
    );

    assert_eq!(dispatcher.dispatch(request).await.status(), 401);
}

// ============================================================================
// Decoding
// ============================================================================

#[tokio::test]
async fn test_unparsable_body_returns_400() {
    let handler = MockHandler::new(Behaviour::Succeed);
    let (dispatcher, reporter) = dispatcher_with(handler.clone());

    let response = dispatcher.dispatch(signed_request("POST", "{not json")).await;

    assert_eq!(response.status(), 400);
    assert!(response.body().contains("Webhook error"));
    assert_eq!(handler.call_count(), 0);
    assert_eq!(reporter.reports().len(), 1);
    assert_eq!(reporter.reports()[0].0, 400);
}

#[tokio::test]
async fn test_body_without_meta_returns_400() {
    let (dispatcher, _) = dispatcher_with(MockHandler::new(Behaviour::Succeed));

    let response = dispatcher
        .dispatch(signed_request("POST", r#"{"data":{}}"#))
        .await;

    assert_eq!(response.status(), 400);
    assert!(response.body().starts_with(r#"{"message":"Webhook error: "#));
}

// ============================================================================
// Handler invocation
// ============================================================================

#[tokio::test]
async fn test_successful_handler_returns_200() {
    let handler = MockHandler::new(Behaviour::Succeed);
    let (dispatcher, reporter) = dispatcher_with(handler.clone());

    let response = dispatcher
        .dispatch(signed_request("POST", &order_created_body()))
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), r#"{"message":"Webhook received"}"#);
    assert_eq!(handler.calls(), vec![EventName::OrderCreated]);
    assert!(reporter.reports().is_empty());
}

#[tokio::test]
async fn test_failing_handler_returns_400_and_reports_once() {
    let handler = MockHandler::new(Behaviour::Fail);
    let (dispatcher, reporter) = dispatcher_with(handler.clone());

    let response = dispatcher
        .dispatch(signed_request("POST", &order_created_body()))
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(
        response.body(),
        r#"{"message":"Webhook error: Subscription not found for payment 7"}"#
    );
    assert_eq!(handler.call_count(), 1);
    assert_eq!(
        reporter.reports(),
        vec![(
            400,
            "Webhook handler failed: Subscription not found for payment 7".to_string()
        )]
    );
}

#[tokio::test]
async fn test_panicking_handler_returns_400() {
    let handler = MockHandler::new(Behaviour::Panic);
    let (dispatcher, reporter) = dispatcher_with(handler.clone());

    let response = dispatcher
        .dispatch(signed_request("POST", &order_created_body()))
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(
        response.body(),
        r#"{"message":"Webhook error: handler exploded"}"#
    );
    assert_eq!(reporter.reports().len(), 1);
}

#[tokio::test]
async fn test_reporter_receives_original_handler_error() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let reporter = reporter_fn(move |error: &WebhookError| {
        let source = std::error::Error::source(error).map(|s| s.to_string());
        sink.lock().unwrap().push(source);
        async {}
    });

    let dispatcher = WebhookDispatcher::new(
        WebhookSecret::new(SECRET).unwrap(),
        Arc::new(MockHandler::new(Behaviour::Fail)),
    )
    .unwrap()
    .with_reporter(Arc::new(reporter));

    dispatcher
        .dispatch(signed_request("POST", &order_created_body()))
        .await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some("Subscription not found for payment 7".to_string())]
    );
}

#[tokio::test]
async fn test_unknown_event_reaches_handler() {
    let handler = MockHandler::new(Behaviour::Succeed);
    let (dispatcher, _) = dispatcher_with(handler.clone());
    let body = r#"{"meta":{"event_name":"affiliate_activated","custom_data":null},"data":{}}"#;

    let response = dispatcher.dispatch(signed_request("POST", body)).await;

    assert_eq!(response.status(), 200);
    assert_eq!(
        handler.calls(),
        vec![EventName::Unknown("affiliate_activated".to_string())]
    );
}

#[tokio::test]
async fn test_same_request_twice_is_not_deduplicated() {
    let handler = MockHandler::new(Behaviour::Succeed);
    let (dispatcher, _) = dispatcher_with(handler.clone());
    let request = signed_request("POST", &order_created_body());

    let first = dispatcher.dispatch(request.clone()).await;
    let second = dispatcher.dispatch(request).await;

    assert_eq!(first, CanonicalResponse::received());
    assert_eq!(second, CanonicalResponse::received());
    assert_eq!(handler.call_count(), 2);
}

#[tokio::test]
async fn test_closure_handler_sees_discriminated_payload() {
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let handler = handler_fn(move |payload: DiscriminatedPayload| {
        let sink = sink.clone();
        async move {
            *sink.lock().unwrap() = Some((
                payload.event_name.clone(),
                payload.custom_data()["orgId"].clone(),
            ));
            Ok(())
        }
    });

    let dispatcher =
        WebhookDispatcher::new(WebhookSecret::new(SECRET).unwrap(), Arc::new(handler)).unwrap();
    let response = dispatcher
        .dispatch(signed_request("POST", &order_created_body()))
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(
        *seen.lock().unwrap(),
        Some((EventName::OrderCreated, serde_json::json!("org_1")))
    );
}

#[tokio::test]
async fn test_concurrent_dispatches_are_independent() {
    let handler = MockHandler::new(Behaviour::Succeed);
    let (dispatcher, _) = dispatcher_with(handler.clone());
    let dispatcher = Arc::new(dispatcher);

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let dispatcher = dispatcher.clone();
        tasks.push(tokio::spawn(async move {
            dispatcher
                .dispatch(signed_request("POST", &order_created_body()))
                .await
        }));
    }

    for task in tasks {
        assert_eq!(task.await.unwrap().status(), 200);
    }
    assert_eq!(handler.call_count(), 8);
}

#[test]
fn test_non_post_never_reaches_handler_property() {
    // Any method other than POST is rejected, whatever the body or signature.
    use proptest::prelude::*;

    proptest!(|(method in "[A-Z]{3,7}", body in ".{0,64}", signature in "[0-9a-f]{0,64}")| {
        prop_assume!(method != "POST");
        let handler = MockHandler::new(Behaviour::Succeed);
        let (dispatcher, _) = dispatcher_with(handler.clone());
        let request = RawRequest::new(
            method.as_str(),
            "/",
            vec![("x-signature", signature)],
            Bytes::from(body),
        );

        let response = tokio_test::block_on(dispatcher.dispatch(request));

        prop_assert_eq!(response.status(), 405);
        prop_assert_eq!(handler.call_count(), 0);
    });
}

// ============================================================================
// Unreadable bodies
// ============================================================================

#[tokio::test]
async fn test_unreadable_post_body_returns_400_and_reports() {
    let handler = MockHandler::new(Behaviour::Succeed);
    let (dispatcher, reporter) = dispatcher_with(handler.clone());

    let response = dispatcher
        .reject_unreadable("POST", NormalizeError::BodyTooLarge { limit: 16 })
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(
        response.body(),
        r#"{"message":"Webhook error: Request body exceeds 16 bytes"}"#
    );
    assert_eq!(handler.call_count(), 0);
    assert_eq!(
        reporter.reports(),
        vec![(
            400,
            "Failed to read webhook body: Request body exceeds 16 bytes".to_string()
        )]
    );
}

#[tokio::test]
async fn test_unreadable_non_post_body_still_returns_405() {
    for method in ["PUT", "PATCH", "DELETE"] {
        let handler = MockHandler::new(Behaviour::Succeed);
        let (dispatcher, reporter) = dispatcher_with(handler.clone());

        let response = dispatcher
            .reject_unreadable(
                method,
                NormalizeError::BodyRead {
                    message: "connection reset".to_string(),
                },
            )
            .await;

        assert_eq!(response.status(), 405, "{method}");
        assert_eq!(response.body(), r#"{"message":"Method not allowed"}"#);
        assert_eq!(reporter.reports()[0].0, 405);
    }
}
