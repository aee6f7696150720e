//! axum adapter.

use crate::adapters::{
    absolute_url,
    generic::{emit_or_internal_error, read_body},
    header_pairs,
};
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use squeezy_webhooks_core::webhook::{CanonicalResponse, RawRequest, WebhookDispatcher};

/// Build a [`RawRequest`] from the parts axum extracts.
///
/// `body` is the already-buffered `Bytes` extractor; it is discarded for
/// `GET` and `HEAD`.
pub fn from_parts(method: &Method, uri: &Uri, headers: &HeaderMap, body: Bytes) -> RawRequest {
    RawRequest::new(
        method.as_str(),
        absolute_url(uri, headers),
        header_pairs(headers),
        body,
    )
}

/// Read an axum request body under `max_body_size` and dispatch it.
///
/// `GET` and `HEAD` bodies are never polled. A read failure goes through
/// [`WebhookDispatcher::reject_unreadable`].
pub async fn dispatch_axum_request(
    dispatcher: &WebhookDispatcher,
    request: Request,
    max_body_size: usize,
) -> WebhookReply {
    let (parts, body) = request.into_parts();

    let body = if RawRequest::method_carries_body(parts.method.as_str()) {
        match read_body(body, Some(max_body_size)).await {
            Ok(body) => body,
            Err(e) => {
                return WebhookReply(
                    dispatcher
                        .reject_unreadable(parts.method.as_str(), e)
                        .await,
                )
            }
        }
    } else {
        Bytes::new()
    };

    let raw = from_parts(&parts.method, &parts.uri, &parts.headers, body);
    WebhookReply(dispatcher.dispatch(raw).await)
}

/// A [`CanonicalResponse`] returned from an axum handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookReply(pub CanonicalResponse);

impl From<CanonicalResponse> for WebhookReply {
    fn from(response: CanonicalResponse) -> Self {
        Self(response)
    }
}

impl IntoResponse for WebhookReply {
    fn into_response(self) -> Response {
        emit_or_internal_error(self.0).map(Body::new)
    }
}

#[cfg(test)]
#[path = "axum_adapter_tests.rs"]
mod tests;
