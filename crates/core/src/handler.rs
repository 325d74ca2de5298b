//! Handler capability and the function-to-handler adapters.

use std::io;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::StatusCode;

use crate::response::{Parts, Response};
use crate::writer::ResponseWriter;

/// Incoming request as seen by handlers (body already buffered).
pub type Request = http::Request<Bytes>;

/// Something that consumes a request and writes a response to the sink.
pub trait Handler: Send + Sync {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request);
}

/// Handler shared between a chain's wrappers and concurrent requests.
pub type SharedHandler = Arc<dyn Handler>;

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
        (**self).serve(w, req)
    }
}

/// Adapter turning a closure over the raw sink into a [`Handler`].
pub struct HandlerFn<F>(F);

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut dyn ResponseWriter, &Request) + Send + Sync,
{
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
        (self.0)(w, req)
    }
}

/// Build a [`SharedHandler`] from a closure. Mostly useful inside middleware.
pub fn handler_fn<F>(f: F) -> SharedHandler
where
    F: Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
{
    Arc::new(HandlerFn(f))
}

/// Adapter for application logic of the form `request -> Option<Response>`.
///
/// `None` means "empty 200 OK". A returned [`Response`] is rendered exactly
/// once onto the sink.
pub struct Action<F>(F);

impl<F> Action<F>
where
    F: Fn(&Request) -> Option<Response> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Handler for Action<F>
where
    F: Fn(&Request) -> Option<Response> + Send + Sync,
{
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
        match (self.0)(req) {
            Some(response) => render(response, w),
            None => w.write_status(StatusCode::OK),
        }
    }
}

/// Write a response onto the sink: content type, then headers, then status,
/// then the body stream.
///
/// A body copy failure is signalled as `500`. If bytes were already sent the
/// status is committed and the signal is lost; that is accepted.
pub fn render(response: Response, w: &mut dyn ResponseWriter) {
    let Parts {
        status,
        content_type,
        mut content,
        headers,
    } = response.into_parts();

    if let Some(content_type) = content_type.filter(|ct| !ct.is_empty()) {
        match HeaderValue::try_from(content_type) {
            Ok(value) => {
                w.headers_mut().insert(CONTENT_TYPE, value);
            }
            Err(e) => tracing::warn!(error = %e, "skipping invalid content type"),
        }
    }

    // Applied after the content type so an explicit entry wins.
    for (name, value) in headers.into_iter().flatten() {
        let header = HeaderName::try_from(name.as_str())
            .map_err(|e| e.to_string())
            .and_then(|n| HeaderValue::try_from(value).map(|v| (n, v)).map_err(|e| e.to_string()));
        match header {
            Ok((name, value)) => {
                w.headers_mut().insert(name, value);
            }
            Err(e) => tracing::warn!(header = %name, error = %e, "skipping invalid response header"),
        }
    }

    w.write_status(status);

    if let Err(e) = io::copy(&mut content, &mut *w) {
        tracing::warn!(error = %e, status = status.as_u16(), "response body copy failed");
        w.write_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}
