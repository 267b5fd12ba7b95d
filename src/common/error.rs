use thiserror::Error;

/// Errors surfaced at the port boundaries. None of these ends a job: the
/// orchestration layer answers every variant with a logged retry or a silent
/// discard, so the only way a job finishes is normal phase completion.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("service unavailable: {service}")]
    ServiceUnavailable { service: String },

    #[error("transform lookup failed: {reason}")]
    TransformLookup { reason: String },
}

pub type DomainResult<T> = Result<T, DomainError>;
