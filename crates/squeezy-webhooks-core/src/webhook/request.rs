//! Runtime-independent request representation.

use bytes::Bytes;
use std::collections::HashMap;

/// Header carrying the hex HMAC-SHA256 signature of the body.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Normalized webhook request.
///
/// Built by a runtime adapter once the full body has been read. Header names
/// are stored lower-cased so lookups are case-insensitive. The value is
/// immutable and owned by a single dispatch.
#[derive(Debug, Clone)]
pub struct RawRequest {
    method: String,
    url: String,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl RawRequest {
    /// Create a new normalized request.
    ///
    /// When a header name repeats, the first value wins. Methods that carry
    /// no payload (see [`RawRequest::method_carries_body`]) get an empty body.
    pub fn new<I, K, V>(
        method: impl Into<String>,
        url: impl Into<String>,
        headers: I,
        body: Bytes,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let method = method.into();
        let mut header_map = HashMap::new();
        for (name, value) in headers {
            header_map
                .entry(name.as_ref().to_ascii_lowercase())
                .or_insert_with(|| value.into());
        }

        let body = if Self::method_carries_body(&method) {
            body
        } else {
            Bytes::new()
        };

        Self {
            method,
            url: url.into(),
            headers: header_map,
            body,
        }
    }

    /// Whether the body of a request with this method should be read at all.
    pub fn method_carries_body(method: &str) -> bool {
        !method.eq_ignore_ascii_case("GET") && !method.eq_ignore_ascii_case("HEAD")
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Look up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    /// All headers, keyed by lower-cased name.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Value of the `x-signature` header, if present.
    pub fn signature(&self) -> Option<&str> {
        self.header(SIGNATURE_HEADER)
    }

    /// The raw body exactly as received.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The raw body as UTF-8 text.
    pub fn body_text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }

    pub fn is_post(&self) -> bool {
        self.method == "POST"
    }
}

/// Failures while turning a runtime request into a [`RawRequest`].
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("Failed to read request body: {message}")]
    BodyRead { message: String },

    #[error("Request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
