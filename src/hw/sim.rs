//! # Simulated devices.
//!
//! Each simulated device is a cheap cloneable handle over shared state: hand one
//! clone to the scheduler builder and keep another to drive or inspect it.
//!
//! ```rust
//! use lotkeeper::hw::{PresenceSensor, SimPresence};
//!
//! let sim = SimPresence::new();
//! let mut sensor = sim.clone();
//! sim.set(true);
//! assert!(sensor.is_present().unwrap());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::SensorError;
use crate::hw::device::{DisplaySink, GateActuator, PresenceSensor, RangeSensor};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Simulated presence sensor.
#[derive(Clone, Debug, Default)]
pub struct SimPresence {
    present: Arc<AtomicBool>,
    failing: Arc<AtomicBool>,
}

impl SimPresence {
    /// Creates a sensor reporting "nothing present".
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reported presence.
    pub fn set(&self, present: bool) {
        self.present.store(present, Ordering::SeqCst);
    }

    /// Makes subsequent reads fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl PresenceSensor for SimPresence {
    fn is_present(&mut self) -> Result<bool, SensorError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SensorError::Unavailable {
                device: "sim-presence".into(),
                reason: "simulated failure".into(),
            });
        }
        Ok(self.present.load(Ordering::SeqCst))
    }
}

/// Simulated range sensor.
#[derive(Clone, Debug, Default)]
pub struct SimRange {
    reading: Arc<Mutex<Option<f64>>>,
}

impl SimRange {
    /// Creates a sensor reporting "no echo".
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reported distance (`None` = no echo).
    pub fn set(&self, cm: Option<f64>) {
        *lock(&self.reading) = cm;
    }
}

impl RangeSensor for SimRange {
    fn distance_cm(&mut self) -> Result<Option<f64>, SensorError> {
        Ok(*lock(&self.reading))
    }
}

/// Simulated actuator recording every command.
#[derive(Clone, Debug, Default)]
pub struct SimActuator {
    commands: Arc<Mutex<Vec<u16>>>,
}

impl SimActuator {
    /// Creates an actuator with an empty command log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every angle commanded so far.
    pub fn commands(&self) -> Vec<u16> {
        lock(&self.commands).clone()
    }

    /// Last commanded angle.
    pub fn angle(&self) -> Option<u16> {
        lock(&self.commands).last().copied()
    }
}

impl GateActuator for SimActuator {
    fn set_angle(&mut self, angle: u16) {
        lock(&self.commands).push(angle);
    }
}

/// Simulated display recording every pair of rendered lines.
#[derive(Clone, Debug, Default)]
pub struct SimDisplay {
    shown: Arc<Mutex<Vec<[String; 2]>>>,
}

impl SimDisplay {
    /// Creates a blank display.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pair of lines shown so far.
    pub fn shown(&self) -> Vec<[String; 2]> {
        lock(&self.shown).clone()
    }

    /// Lines currently on the display.
    pub fn current(&self) -> Option<[String; 2]> {
        lock(&self.shown).last().cloned()
    }
}

impl DisplaySink for SimDisplay {
    fn show(&mut self, lines: &[String; 2]) {
        lock(&self.shown).push(lines.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::display::DisplayFrame;

    #[test]
    fn presence_failure_is_reported() {
        let sim = SimPresence::new();
        let mut sensor = sim.clone();
        sim.set_failing(true);
        assert_eq!(sensor.is_present().unwrap_err().as_label(), "sensor_unavailable");
        sim.set_failing(false);
        assert!(!sensor.is_present().unwrap());
    }

    #[test]
    fn actuator_and_display_record() {
        let act = SimActuator::new();
        let mut handle = act.clone();
        handle.set_angle(90);
        handle.set_angle(0);
        assert_eq!(act.commands(), vec![90, 0]);
        assert_eq!(act.angle(), Some(0));

        let disp = SimDisplay::new();
        let mut handle = disp.clone();
        handle.show(&DisplayFrame::summary(vec![2]).lines(16));
        assert_eq!(
            disp.current(),
            Some(["Free:".to_string(), "S2".to_string()])
        );
    }

    #[test]
    fn range_reports_latest_value() {
        let sim = SimRange::new();
        let mut sensor = sim.clone();
        assert_eq!(sensor.distance_cm().unwrap(), None);
        sim.set(Some(12.5));
        assert_eq!(sensor.distance_cm().unwrap(), Some(12.5));
    }
}
