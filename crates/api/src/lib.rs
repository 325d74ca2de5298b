//! HTTP server binding: runs a composed `webchain-core` handler behind axum.

pub mod config;
pub mod demo;
pub mod errors;
pub mod server;

pub use config::{ConfigError, ServerConfig};
pub use server::{ServeError, router, serve, serve_listener};
