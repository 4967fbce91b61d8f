use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Referenced item is absent from the embedding store.
    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),

    /// Embedding failed the sanity check (missing, wrong dimensionality or
    /// non-finite values). The offending event is rejected; the stream is
    /// not halted.
    #[error("Invalid embedding: {0}")]
    InvalidEmbedding(String),

    /// The candidate pool for this session is empty. This is an expected
    /// terminal state (the caller renders a completion screen), signaled
    /// as its own variant so it is never confused with a fault.
    #[error("Candidate pool exhausted")]
    PoolExhausted,

    /// The single-writer-per-user fold invariant was violated: a caller
    /// bypassed the engine entry points and applied events out of log
    /// order. Fatal to the operation, not to the process.
    #[error("Profile fold conflict: {0}")]
    ProfileConflict(String),

    /// Rejected configuration value.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Failure surfaced by an external store implementation, propagated
    /// unchanged. The core performs no I/O and adds no retry logic.
    #[error("Store error: {0}")]
    Store(String),
}

impl EngineError {
    /// `true` for the expected end-of-pool state, `false` for real faults.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, EngineError::PoolExhausted)
    }
}
