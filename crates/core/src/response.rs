//! Deferred HTTP response model and its builders.
//!
//! A [`Response`] describes what should be written, not how: nothing touches
//! the wire until the handler adapter renders it. Every builder sets a status
//! and a body stream; the content type and header map are optional.

use std::collections::HashMap;
use std::fmt;
use std::io::{Cursor, Read};

use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;

/// Response header map (name → value). Setting a name twice keeps the last value.
pub type Headers = HashMap<String, String>;

/// Body source, read lazily while the response is rendered.
pub type Body = Box<dyn Read + Send>;

pub(crate) const APPLICATION_JSON: &str = "application/json";

/// JSON error payload: exactly one `error` key.
#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// A fully-formed HTTP response awaiting rendering.
///
/// Immutable once built and single-use: rendering consumes the body stream.
pub struct Response {
    status: StatusCode,
    content_type: Option<String>,
    content: Body,
    headers: Option<Headers>,
}

/// Owned pieces of a [`Response`], handed to the renderer.
pub struct Parts {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub content: Body,
    pub headers: Option<Headers>,
}

impl Response {
    /// Plain-text error: the body is the error's display text, no content type.
    pub fn error(status: StatusCode, err: impl fmt::Display, headers: Option<Headers>) -> Self {
        Self::from_bytes(status, None, err.to_string(), headers)
    }

    /// JSON error: the body is `{"error": "<message>"}`.
    ///
    /// If the payload cannot be encoded this degrades to a plain-text `500`
    /// carrying the encoder's message; `headers` are still forwarded.
    pub fn error_json(status: StatusCode, err: impl fmt::Display, headers: Option<Headers>) -> Self {
        let message = err.to_string();
        let encoded = serde_json::to_vec(&ErrorBody { error: &message });
        Self::encoded_error(status, encoded, headers)
    }

    fn encoded_error(
        status: StatusCode,
        encoded: serde_json::Result<Vec<u8>>,
        headers: Option<Headers>,
    ) -> Self {
        match encoded {
            Ok(body) => Self::from_bytes(status, Some(APPLICATION_JSON), body, headers),
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode JSON error body");
                Self::error(StatusCode::INTERNAL_SERVER_ERROR, e, headers)
            }
        }
    }

    /// Raw bytes, no content type.
    pub fn data(status: StatusCode, content: impl Into<Bytes>, headers: Option<Headers>) -> Self {
        Self::from_bytes(status, None, content, headers)
    }

    /// JSON-encoded value with `Content-Type: application/json`.
    ///
    /// On encode failure the response becomes a `500` JSON error carrying the
    /// encoder's message; the requested status is dropped, `headers` are kept.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T, headers: Option<Headers>) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::from_bytes(status, Some(APPLICATION_JSON), body, headers),
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode JSON response body");
                Self::error_json(StatusCode::INTERNAL_SERVER_ERROR, e, headers)
            }
        }
    }

    /// Caller-supplied stream used as the body as-is.
    pub fn with_reader(
        status: StatusCode,
        reader: impl Read + Send + 'static,
        headers: Option<Headers>,
    ) -> Self {
        Self {
            status,
            content_type: None,
            content: Box::new(reader),
            headers,
        }
    }

    fn from_bytes(
        status: StatusCode,
        content_type: Option<&str>,
        content: impl Into<Bytes>,
        headers: Option<Headers>,
    ) -> Self {
        Self {
            status,
            content_type: content_type.map(str::to_owned),
            content: Box::new(Cursor::new(content.into())),
            headers,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    pub fn into_parts(self) -> Parts {
        Parts {
            status: self.status,
            content_type: self.content_type,
            content: self.content,
            headers: self.headers,
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
