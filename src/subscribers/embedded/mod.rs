//! # Built-in subscribers
//!
//! - [`LogWriter`]: writes every event as one `tracing` line.

mod log;

pub use log::LogWriter;
