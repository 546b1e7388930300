pub mod config;
pub mod count_buffer;
pub mod error;
pub mod palette;
pub mod pixel_buffer;
pub mod scheduler;
pub mod sink;
pub mod unit;
pub mod worker;

pub use config::SchedulerConfig;
pub use count_buffer::CountBuffer;
pub use error::SchedError;
pub use palette::Palette;
pub use pixel_buffer::PixelBuffer;
pub use scheduler::TileScheduler;
pub use sink::ResultSink;
pub use unit::{TileCursor, WorkUnit};
pub use worker::{Completion, WorkResult};

/// Convenience result type for the scheduling crate.
pub type Result<T> = std::result::Result<T, SchedError>;
