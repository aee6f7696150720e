//! Adapter for the `http` crate types shared by hyper, tower and most Rust
//! HTTP servers.

use crate::adapters::{absolute_url, header_pairs};
use bytes::Bytes;
use http::{response, Request, Response};
use http_body::Body;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use squeezy_webhooks_core::webhook::{
    CanonicalResponse, NormalizeError, RawRequest, ResponseEmitter, WebhookDispatcher,
};
use std::error::Error;
use tracing::{debug, error};

type BoxError = Box<dyn Error + Send + Sync>;

/// Normalize an `http::Request` into a [`RawRequest`].
///
/// The body is read to completion unless the method is `GET` or `HEAD`, in
/// which case it is never polled. With `max_body_size` set, a body larger
/// than the limit fails with [`NormalizeError::BodyTooLarge`].
pub async fn normalize_http_request<B>(
    request: Request<B>,
    max_body_size: Option<usize>,
) -> Result<RawRequest, NormalizeError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let (parts, body) = request.into_parts();
    let method = parts.method.as_str().to_string();
    let url = absolute_url(&parts.uri, &parts.headers);
    let headers = header_pairs(&parts.headers);

    let body = if RawRequest::method_carries_body(&method) {
        read_body(body, max_body_size).await?
    } else {
        Bytes::new()
    };

    debug!(method = %method, body_size = body.len(), "Normalized HTTP request");
    Ok(RawRequest::new(method, url, headers, body))
}

/// Run one `http::Request` through the dispatcher and build its response.
///
/// A body that cannot be read, or that exceeds `max_body_size`, is handed to
/// [`WebhookDispatcher::reject_unreadable`], so the caller always gets one of
/// the dispatcher's responses and the failure is reported.
pub async fn handle_http_request<B>(
    dispatcher: &WebhookDispatcher,
    request: Request<B>,
    max_body_size: Option<usize>,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let method = request.method().clone();
    let canonical = match normalize_http_request(request, max_body_size).await {
        Ok(raw) => dispatcher.dispatch(raw).await,
        Err(e) => dispatcher.reject_unreadable(method.as_str(), e).await,
    };
    emit_or_internal_error(canonical)
}

pub(crate) fn emit_or_internal_error(canonical: CanonicalResponse) -> Response<Full<Bytes>> {
    HttpResponseEmitter::new().emit(canonical).unwrap_or_else(|e| {
        error!(error = %e, "Failed to build webhook response");
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

pub(crate) async fn read_body<B>(body: B, limit: Option<usize>) -> Result<Bytes, NormalizeError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    match limit {
        Some(limit) => match Limited::new(body, limit).collect().await {
            Ok(collected) => Ok(collected.to_bytes()),
            Err(e) if e.is::<LengthLimitError>() => Err(NormalizeError::BodyTooLarge { limit }),
            Err(e) => Err(NormalizeError::BodyRead {
                message: e.to_string(),
            }),
        },
        None => match body.collect().await {
            Ok(collected) => Ok(collected.to_bytes()),
            Err(e) => {
                let e: BoxError = e.into();
                Err(NormalizeError::BodyRead {
                    message: e.to_string(),
                })
            }
        },
    }
}

/// Writes a [`CanonicalResponse`] into an `http::Response<Full<Bytes>>`.
///
/// Headers already present on the wrapped builder are left untouched; the
/// canonical headers only fill the gaps.
#[derive(Debug, Default)]
pub struct HttpResponseEmitter {
    builder: response::Builder,
}

impl HttpResponseEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit on top of a builder the caller has already started.
    pub fn with_builder(builder: response::Builder) -> Self {
        Self { builder }
    }
}

impl ResponseEmitter for HttpResponseEmitter {
    type Output = Result<Response<Full<Bytes>>, http::Error>;

    fn emit(self, response: CanonicalResponse) -> Self::Output {
        let (status, headers, body) = response.into_parts();
        let mut builder = self.builder.status(status);

        for (name, value) in headers {
            let already_set = builder
                .headers_ref()
                .is_some_and(|existing| existing.contains_key(name.as_str()));
            if !already_set {
                builder = builder.header(name, value);
            }
        }

        builder.body(Full::new(Bytes::from(body)))
    }
}

#[cfg(test)]
#[path = "generic_tests.rs"]
mod tests;
