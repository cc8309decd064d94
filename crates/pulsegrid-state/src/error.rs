//! Error types for the heartbeat registry.

use thiserror::Error;

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur during registry operations.
///
/// Aggregate queries (`any_error`, `any_dead`, `list_all`) never fail;
/// only point lookups by client id can.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("client with id [{0}] not found")]
    NotFound(String),
}
