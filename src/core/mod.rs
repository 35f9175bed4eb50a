//! Runtime core: configuration, time and the scheduler.
//!
//! The public entry point is [`Scheduler`], built through [`SchedulerBuilder`].
//!
//! Internal modules:
//! - [`clock`]: `Timestamp`, the `Clock` seam and deadline arithmetic;
//! - [`config`]: [`LotConfig`] and its validation;
//! - [`scheduler`]: the cooperative tick loop;
//! - [`builder`]: device and subscriber wiring;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod clock;
mod config;
mod scheduler;
mod shutdown;

pub use builder::SchedulerBuilder;
pub use clock::{Clock, ManualClock, SystemClock, Timestamp, clock_time, deadline, elapsed_secs};
pub use config::LotConfig;
pub use scheduler::Scheduler;
