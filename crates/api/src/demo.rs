//! Demo application served by the `webchain-api` binary.

use axum::http::StatusCode;
use serde::Serialize;

use webchain_core::{Request, Response};

#[derive(Serialize)]
struct Echo<'a> {
    method: &'a str,
    path: &'a str,
    body_bytes: usize,
}

/// `/health` answers `ok`, `/empty` answers an empty 200, anything else
/// echoes the request line as JSON.
pub fn handle(req: &Request) -> Option<Response> {
    match req.uri().path() {
        "/health" => Some(Response::data(StatusCode::OK, "ok", None)),
        "/empty" => None,
        path => Some(Response::json(
            StatusCode::OK,
            &Echo {
                method: req.method().as_str(),
                path,
                body_bytes: req.body().len(),
            },
            None,
        )),
    }
}
