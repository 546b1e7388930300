use thiserror::Error;

/// Errors originating from the core math crate.
///
/// All of these are construction-time precondition violations — the
/// kernel itself has no recoverable error states once its inputs are
/// validated.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid max iterations: {0} (must be >= 1)")]
    InvalidMaxIterations(u32),

    #[error("invalid escape radius: {0} (must be positive and finite)")]
    InvalidEscapeRadius(f64),

    #[error("invalid viewport: {reason}")]
    InvalidViewport { reason: String },
}
