use thiserror::Error;

/// Failures surfaced by the ledger and catalog collaborators.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// Transient persistence failure. Safe to retry the whole operation;
    /// the ledger guarantees no partial chain was committed.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// An update tried to touch a field outside the mutable allow-list.
    #[error("invalid field in update: {0}")]
    InvalidField(String),
}
