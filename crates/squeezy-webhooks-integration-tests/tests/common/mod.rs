//! Common test utilities for squeezy-webhooks-api integration tests
//!
//! This module provides:
//! - Mock implementations of the handler and reporter traits
//! - Helpers for signing payloads and building app state
//! - Shared test payloads

use async_trait::async_trait;
use squeezy_webhooks_api::{AppState, ServiceConfig};
use squeezy_webhooks_core::webhook::{
    compute_signature, DiscriminatedPayload, ErrorReporter, HandlerError, WebhookDispatcher,
    WebhookError, WebhookHandler,
};
use squeezy_webhooks_core::WebhookSecret;
use std::sync::{Arc, Mutex};

pub const TEST_SECRET: &str = "integration-test-secret";

// ============================================================================
// Mock Handler
// ============================================================================

/// Handler that records every payload and optionally fails.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct MockHandler {
    calls: Arc<Mutex<Vec<DiscriminatedPayload>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockHandler {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn set_failure(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    #[allow(dead_code)]
    pub fn get_calls(&self) -> Vec<DiscriminatedPayload> {
        self.calls.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl WebhookHandler for MockHandler {
    async fn handle(&self, payload: DiscriminatedPayload) -> Result<(), HandlerError> {
        self.calls.lock().unwrap().push(payload);
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(message.into()),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Mock Reporter
// ============================================================================

/// Reporter that records the status and message of each reported error.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct MockReporter {
    reports: Arc<Mutex<Vec<(u16, String)>>>,
}

impl MockReporter {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn get_reports(&self) -> Vec<(u16, String)> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl ErrorReporter for MockReporter {
    async fn report(&self, error: &WebhookError) {
        self.reports
            .lock()
            .unwrap()
            .push((error.status_code(), error.to_string()));
    }
}

// ============================================================================
// Helpers
// ============================================================================

#[allow(dead_code)]
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.webhook.secret = Some(TEST_SECRET.to_string());
    config
}

#[allow(dead_code)]
pub fn create_dispatcher(handler: MockHandler, reporter: MockReporter) -> Arc<WebhookDispatcher> {
    let dispatcher = WebhookDispatcher::new(
        WebhookSecret::new(TEST_SECRET).unwrap(),
        Arc::new(handler),
    )
    .unwrap()
    .with_reporter(Arc::new(reporter));
    Arc::new(dispatcher)
}

#[allow(dead_code)]
pub fn create_test_app_state() -> AppState {
    AppState::new(
        test_config(),
        create_dispatcher(MockHandler::new(), MockReporter::new()),
    )
}

#[allow(dead_code)]
pub fn create_app_state_with(handler: MockHandler, reporter: MockReporter) -> AppState {
    AppState::new(test_config(), create_dispatcher(handler, reporter))
}

#[allow(dead_code)]
pub fn sign(body: &[u8]) -> String {
    compute_signature(&WebhookSecret::new(TEST_SECRET).unwrap(), body).unwrap()
}

/// `subscription_created` delivery as Lemon Squeezy sends it.
#[allow(dead_code)]
pub fn subscription_created_payload() -> String {
    serde_json::json!({
        "meta": {
            "event_name": "subscription_created",
            "custom_data": { "orgId": "org_123" }
        },
        "data": {
            "type": "subscriptions",
            "id": "1",
            "attributes": {
                "store_id": 1,
                "customer_id": 2,
                "order_id": 3,
                "order_item_id": 4,
                "product_id": 5,
                "variant_id": 6,
                "product_name": "Pro",
                "variant_name": "Monthly",
                "user_name": "Test User",
                "user_email": "user@example.com",
                "status": "active",
                "status_formatted": "Active",
                "renews_at": "2024-02-01T00:00:00.000000Z",
                "ends_at": null,
                "trial_ends_at": null,
                "created_at": "2024-01-01T00:00:00.000000Z",
                "updated_at": "2024-01-01T00:00:00.000000Z",
                "test_mode": true
            }
        }
    })
    .to_string()
}
