//! Output sink abstraction and an in-memory implementation.

use std::io::{self, Write};

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

/// The writable side of one HTTP exchange.
///
/// Supports "set header", "write status once" and body bytes through
/// [`Write`]. A sink is consumed by exactly one request.
pub trait ResponseWriter: Write {
    /// Header map for the response. Mutations after the status line is
    /// committed have no effect on the wire.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Commit the status line. Only the first call takes effect; later calls
    /// are ignored.
    fn write_status(&mut self, status: StatusCode);

    /// Whether a status line has been committed (explicitly or by writing body bytes).
    fn status_written(&self) -> bool;
}

/// In-memory [`ResponseWriter`] that records everything a handler does.
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    headers: HeaderMap,
    status: Option<StatusCode>,
    body: Vec<u8>,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed status, or `200 OK` if the handler never wrote one.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Convert the recording into a plain `http` response.
    pub fn into_http(self) -> http::Response<Bytes> {
        let status = self.status();
        let mut response = http::Response::new(Bytes::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for ResponseRecorder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    fn status_written(&self) -> bool {
        self.status.is_some()
    }
}

impl Write for ResponseRecorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_status(StatusCode::OK);
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
