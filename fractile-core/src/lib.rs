pub mod complex;
pub mod error;
pub mod kernel;
pub mod params;
pub mod viewport;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use error::CoreError;
pub use kernel::escape_time;
pub use params::KernelParams;
pub use viewport::Viewport;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
