//! Construction-time error model.

use thiserror::Error;

/// Misuse detected while wiring a middleware chain.
///
/// These are programming errors: they are meant to surface during application
/// start-up or in tests, never while serving requests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// A chain must always terminate in a real handler.
    #[error("cannot wrap absent handler")]
    AbsentTerminal,
}
