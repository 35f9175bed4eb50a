//! Timer-driven controllers advanced once per tick.
//!
//! - [`GateController`] range-triggered gate with hold and "FULL" notice timers
//! - [`DepartureDebouncer`] per-slot settle deadlines before a departure is confirmed
//!
//! Both are pure state machines: they take `now` and readings, return what
//! happened, and leave device I/O to the scheduler.

mod debounce;
mod gate;

pub use debounce::{DebounceOutcome, DepartureDebouncer};
pub use gate::{GateController, GateEvent, GateState};
