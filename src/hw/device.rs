//! # Device seams.
//!
//! The scheduler talks to hardware only through these traits. Drivers for a real
//! board implement them; [`sim`](crate::hw::sim) provides shared-state stand-ins
//! for tests and demos.
//!
//! Reads are fallible: a [`SensorError`] skips that device for the current tick.
//! Commands are fire-and-forget.

use crate::error::SensorError;

/// Per-slot presence sensor (e.g. an infrared beam).
pub trait PresenceSensor: Send + 'static {
    /// True if an object is in the slot.
    fn is_present(&mut self) -> Result<bool, SensorError>;
}

/// Gate range sensor.
pub trait RangeSensor: Send + 'static {
    /// Distance in centimetres, or `None` when no echo came back in time.
    fn distance_cm(&mut self) -> Result<Option<f64>, SensorError>;
}

/// Gate actuator (servo).
pub trait GateActuator: Send + 'static {
    /// Moves the gate arm to `angle` degrees.
    fn set_angle(&mut self, angle: u16);
}

/// Two-line character display at the entrance.
///
/// The scheduler renders a [`DisplayFrame`](crate::hw::DisplayFrame) at the
/// configured `display_width` and hands over the finished lines.
pub trait DisplaySink: Send + 'static {
    /// Replaces the displayed content with `lines`.
    fn show(&mut self, lines: &[String; 2]);
}

impl<T: PresenceSensor + ?Sized> PresenceSensor for Box<T> {
    fn is_present(&mut self) -> Result<bool, SensorError> {
        (**self).is_present()
    }
}

impl<T: RangeSensor + ?Sized> RangeSensor for Box<T> {
    fn distance_cm(&mut self) -> Result<Option<f64>, SensorError> {
        (**self).distance_cm()
    }
}

impl<T: GateActuator + ?Sized> GateActuator for Box<T> {
    fn set_angle(&mut self, angle: u16) {
        (**self).set_angle(angle)
    }
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn show(&mut self, lines: &[String; 2]) {
        (**self).show(lines)
    }
}
