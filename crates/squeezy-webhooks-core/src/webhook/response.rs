//! Runtime-independent webhook response.

use crate::webhook::WebhookError;

/// Content type of every body this crate generates.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Status, headers and body produced by one dispatch.
///
/// Built once and then consumed by a [`ResponseEmitter`]; there are no
/// mutators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl CanonicalResponse {
    /// JSON response of the form `{"message": "<message>"}`.
    pub fn json_message(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "message": message }).to_string();
        Self {
            status,
            headers: vec![("content-type".to_string(), CONTENT_TYPE_JSON.to_string())],
            body,
        }
    }

    /// `200 {"message":"Webhook received"}`.
    pub fn received() -> Self {
        Self::json_message(200, "Webhook received")
    }

    /// Response for a recovered failure.
    pub fn from_error(error: &WebhookError) -> Self {
        Self::json_message(error.status_code(), &error.client_message())
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Look up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Split into status, headers and body.
    pub fn into_parts(self) -> (u16, Vec<(String, String)>, String) {
        (self.status, self.headers, self.body)
    }
}

/// Writes a [`CanonicalResponse`] through a runtime's response mechanism.
///
/// `emit` consumes both the emitter and the response, so a response can be
/// written only once. Implementations must not replace headers that were
/// already set on the underlying response before emitting.
pub trait ResponseEmitter {
    type Output;

    fn emit(self, response: CanonicalResponse) -> Self::Output;
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
