//! Runtime adapters.
//!
//! Each adapter turns a runtime request into a [`RawRequest`] and writes a
//! [`CanonicalResponse`] back through the runtime's response type. All of
//! them share the dispatcher in `squeezy_webhooks_core`; none of them
//! verify or decode anything themselves.
//!
//! - [`generic`] - any `http::Request<B>` where `B: http_body::Body`
//! - [`axum_adapter`] - extractor parts and `IntoResponse` for axum
//!
//! [`RawRequest`]: squeezy_webhooks_core::webhook::RawRequest
//! [`CanonicalResponse`]: squeezy_webhooks_core::webhook::CanonicalResponse

pub mod axum_adapter;
pub mod generic;

pub use axum_adapter::{dispatch_axum_request, from_parts, WebhookReply};
pub use generic::{handle_http_request, normalize_http_request, HttpResponseEmitter};

use http::{header::HOST, HeaderMap, Uri};

/// Header pairs with UTF-8 values. Values that are not valid UTF-8 are dropped.
pub(crate) fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Absolute URL of the request.
///
/// Server-side request URIs are usually origin-form (`/path?query`); those
/// are rebuilt as `http://<host><path>` from the `Host` header. Without a
/// usable `Host` the URI is returned as is.
pub(crate) fn absolute_url(uri: &Uri, headers: &HeaderMap) -> String {
    if uri.scheme().is_some() {
        return uri.to_string();
    }

    let host = headers.get(HOST).and_then(|value| value.to_str().ok());
    match host {
        Some(host) if !host.is_empty() => {
            let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
            format!("http://{}{}", host, path)
        }
        _ => uri.to_string(),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
