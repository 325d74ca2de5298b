//! Runs a composed handler behind axum.
//!
//! axum owns the transport; every request lands in the router's fallback,
//! gets its body buffered, and is served by the handler on tokio's blocking
//! pool (handlers do synchronous I/O). The handler writes into a
//! [`ResponseRecorder`] which is then converted into the axum response.

use std::net::SocketAddr;

use axum::{
    Router,
    body::Body,
    extract::{Request as AxumRequest, State},
    http::StatusCode,
    response::Response as AxumResponse,
};
use http_body_util::LengthLimitError;
use thiserror::Error;
use tokio::net::TcpListener;

use webchain_core::{Handler, Request, ResponseRecorder, SharedHandler};

use crate::config::ServerConfig;
use crate::errors::json_error;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone)]
struct BridgeState {
    handler: SharedHandler,
    max_body_bytes: usize,
}

/// Router sending every request to `handler`.
pub fn router(handler: SharedHandler, config: &ServerConfig) -> Router {
    Router::new().fallback(dispatch).with_state(BridgeState {
        handler,
        max_body_bytes: config.max_body_bytes,
    })
}

/// Bind `config.addr` and serve until the server stops.
pub async fn serve(handler: SharedHandler, config: ServerConfig) -> Result<(), ServeError> {
    let listener = TcpListener::bind(config.addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: config.addr,
            source,
        })?;

    serve_listener(listener, handler, config).await
}

/// Serve on an already-bound listener.
pub async fn serve_listener(
    listener: TcpListener,
    handler: SharedHandler,
    config: ServerConfig,
) -> Result<(), ServeError> {
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(handler, &config)).await?;
    Ok(())
}

async fn dispatch(State(state): State<BridgeState>, req: AxumRequest) -> AxumResponse {
    let (parts, body) = req.into_parts();

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(body) => body,
        Err(e) if is_length_limit(&e) => {
            tracing::warn!(limit = state.max_body_bytes, "request body too large");
            return json_error(StatusCode::PAYLOAD_TOO_LARGE, "request body too large");
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to read request body");
            return json_error(StatusCode::BAD_REQUEST, "failed to read request body");
        }
    };

    let request = Request::from_parts(parts, body);
    let handler = state.handler.clone();

    let served = tokio::task::spawn_blocking(move || {
        let mut recorder = ResponseRecorder::new();
        handler.serve(&mut recorder, &request);
        recorder
    })
    .await;

    match served {
        Ok(recorder) => recorder.into_http().map(Body::from),
        Err(e) => {
            tracing::error!(error = %e, "handler did not complete");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source = Some(err as &(dyn std::error::Error + 'static));
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
