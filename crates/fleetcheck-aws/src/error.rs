//! Error types for the provider boundary.

use thiserror::Error;

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors surfaced by the provider boundary.
///
/// These cover upstream fetch failures and broken response contracts
/// only. Fleet-health findings are never errors; they live in the audit
/// core's result values.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("auto-scaling group not found: {0}")]
    AsgNotFound(String),

    #[error("api request failed: {0}")]
    Api(String),

    #[error("missing field `{field}` on {entity}")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("invalid timestamp on {0}")]
    InvalidTimestamp(String),
}
