//! Hardware seams and helpers.
//!
//! ## Contents
//! - [`PresenceSensor`], [`RangeSensor`], [`GateActuator`], [`DisplaySink`] device traits
//! - [`DisplayFrame`] display content and fixed-width rendering
//! - [`echo_to_cm`], [`servo_duty`] ranger/servo conversions for board drivers
//! - [`SimPresence`], [`SimRange`], [`SimActuator`], [`SimDisplay`] simulated devices

mod device;
mod display;
mod signal;
mod sim;

pub use device::{DisplaySink, GateActuator, PresenceSensor, RangeSensor};
pub use display::DisplayFrame;
pub use signal::{ECHO_TIMEOUT, echo_to_cm, servo_duty};
pub use sim::{SimActuator, SimDisplay, SimPresence, SimRange};
