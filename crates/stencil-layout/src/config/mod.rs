/// Allocation logging config module.
pub mod allocation;
/// Resolution logging config module.
pub mod resolution;

mod base;
mod logger;

pub use base::*;
pub use logger::{LogChannel, LogCrateLevel, LogLevel, Logger, LoggerConfig};
