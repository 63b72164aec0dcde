//! Error taxonomy for the candela workspace.

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the engine and its store collaborators.
///
/// Every rejected operation is observable by the caller; nothing is
/// swallowed. Validation failures are raised before any persistence side
/// effect takes place.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Input rejected before persistence: inconsistent OHLC values,
    /// unknown tool type, non-positive stroke width, empty symbol.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Update targeted an id with no record behind it. Deletes of a
    /// missing id return `Ok(false)` instead of this variant.
    #[error("no record with id {id}")]
    NotFound { id: u64 },

    /// The persistence collaborator was unreachable or failed mid-flight.
    /// The engine never retries; reconciliation is the caller's call.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with a formatted message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}
