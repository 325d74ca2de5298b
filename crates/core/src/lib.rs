//! `webchain-core` — response building and middleware composition for HTTP handlers.
//!
//! This crate is server-agnostic: it only talks to an HTTP server through the
//! [`Handler`] capability (request in) and the [`ResponseWriter`] sink
//! (response out). Binding to a concrete server lives in `webchain-api`.

pub mod chain;
pub mod error;
pub mod handler;
pub mod logging;
pub mod response;
pub mod writer;

pub use chain::{MiddlewareChain, MiddlewareFn, middleware};
pub use error::ChainError;
pub use handler::{Action, Handler, HandlerFn, Request, SharedHandler, handler_fn, render};
pub use logging::{RequestLog, RequestRecord, TracingLog, logging};
pub use response::{Body, Headers, Parts, Response};
pub use writer::{ResponseRecorder, ResponseWriter};
