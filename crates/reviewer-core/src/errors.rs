//! Engine errors.

use thiserror::Error;

/// Storage failure opaque to the engine.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Domain error. Every variant except [`DomainError::Store`] is recoverable
/// by the caller and is surfaced verbatim at the boundary.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("team_name already exists")]
    TeamExists,

    #[error("PR id already exists")]
    PrExists,

    #[error("cannot reassign on merged PR")]
    PrMerged,

    #[error("reviewer is not assigned to this PR")]
    NotAssigned,

    #[error("no active replacement candidate in team")]
    NoCandidate,

    /// Carries the kind of resource that was missing, e.g. `"author"`.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Optimistic concurrency retries were exhausted.
    #[error("pull request was modified concurrently, try again")]
    ConcurrentUpdate,

    #[error("Store error: {source}")]
    Store {
        #[from]
        source: StoreError,
    },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::TeamExists => "TEAM_EXISTS",
            Self::PrExists => "PR_EXISTS",
            Self::PrMerged => "PR_MERGED",
            Self::NotAssigned => "NOT_ASSIGNED",
            Self::NoCandidate => "NO_CANDIDATE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ConcurrentUpdate => "CONCURRENT_UPDATE",
            Self::Store { .. } => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;

/// Rejects empty identifiers with a validation error.
pub(crate) fn require_id(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(DomainError::validation(format!("{} cannot be empty", what)));
    }
    Ok(())
}
