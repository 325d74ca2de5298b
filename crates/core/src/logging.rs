//! Request-logging middleware.
//!
//! The log sink is injected as a [`RequestLog`], so the middleware never
//! reaches for process-wide state. [`TracingLog`] forwards to `tracing`.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::{HeaderMap, Method, StatusCode};

use crate::chain::{MiddlewareFn, middleware};
use crate::handler::{Handler, handler_fn};
use crate::writer::ResponseWriter;

/// One completed request, as observed from outside the downstream handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    /// Body bytes written to the sink.
    pub bytes: u64,
    pub elapsed: Duration,
}

/// Destination for request records.
pub trait RequestLog: Send + Sync {
    fn record(&self, entry: &RequestRecord);
}

/// Emits one structured `info` event per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl RequestLog for TracingLog {
    fn record(&self, entry: &RequestRecord) {
        tracing::info!(
            method = %entry.method,
            path = %entry.path,
            status = entry.status.as_u16(),
            bytes = entry.bytes,
            elapsed_ms = entry.elapsed.as_millis() as u64,
            "request completed"
        );
    }
}

/// Middleware timing the downstream handler and recording one entry per
/// request once it returns.
pub fn logging(log: Arc<dyn RequestLog>) -> MiddlewareFn {
    middleware(move |next| {
        let log = log.clone();
        handler_fn(move |w, req| {
            let started = Instant::now();
            let mut capture = StatusCapture::new(w);

            next.serve(&mut capture, req);

            log.record(&RequestRecord {
                method: req.method().clone(),
                path: req.uri().path().to_owned(),
                status: capture.status(),
                bytes: capture.bytes,
                elapsed: started.elapsed(),
            });
        })
    })
}

/// Forwarding sink that remembers the committed status and body size.
struct StatusCapture<'a> {
    inner: &'a mut dyn ResponseWriter,
    status: Option<StatusCode>,
    bytes: u64,
}

impl<'a> StatusCapture<'a> {
    fn new(inner: &'a mut dyn ResponseWriter) -> Self {
        Self {
            inner,
            status: None,
            bytes: 0,
        }
    }

    fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }
}

impl ResponseWriter for StatusCapture<'_> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
        self.inner.write_status(status);
    }

    fn status_written(&self) -> bool {
        self.inner.status_written()
    }
}

impl Write for StatusCapture<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.bytes += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
