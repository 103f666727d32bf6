use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Denied mutation on a guarded record. Kept separate from `Forbidden`
    /// so callers can surface the specific refusal.
    #[error("authorization denied: {0}")]
    Authorization(String),
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl DomainError {
    /// True for errors that mean "the caller may not do this", as opposed to
    /// validation problems or store failures.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            DomainError::Unauthenticated | DomainError::Forbidden(_) | DomainError::Authorization(_)
        )
    }
}
