use std::sync::Arc;

use crate::core::{Clock, LotConfig, SystemClock};
use crate::error::LotError;
use crate::events::Bus;
use crate::hw::{DisplaySink, GateActuator, PresenceSensor, RangeSensor};
use crate::lot::SlotRegistry;
use crate::server::StatusServer;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::scheduler::{Devices, Scheduler};

/// Builder for constructing a [`Scheduler`] from a config and its devices.
pub struct SchedulerBuilder {
    cfg: LotConfig,
    presence: Vec<Box<dyn PresenceSensor>>,
    range: Option<Box<dyn RangeSensor>>,
    actuator: Option<Box<dyn GateActuator>>,
    display: Option<Box<dyn DisplaySink>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    server: Option<StatusServer>,
    clock: Option<Arc<dyn Clock>>,
}

impl SchedulerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: LotConfig) -> Self {
        Self {
            cfg,
            presence: Vec::new(),
            range: None,
            actuator: None,
            display: None,
            subscribers: Vec::new(),
            server: None,
            clock: None,
        }
    }

    /// Sets the slot presence sensors; the first one watches slot 1.
    pub fn with_slot_sensors(mut self, sensors: Vec<Box<dyn PresenceSensor>>) -> Self {
        self.presence = sensors;
        self
    }

    /// Appends the presence sensor for the next slot number.
    pub fn with_slot_sensor(mut self, sensor: impl PresenceSensor) -> Self {
        self.presence.push(Box::new(sensor));
        self
    }

    /// Sets the gate range sensor.
    pub fn with_range(mut self, sensor: impl RangeSensor) -> Self {
        self.range = Some(Box::new(sensor));
        self
    }

    /// Sets the gate actuator.
    pub fn with_actuator(mut self, actuator: impl GateActuator) -> Self {
        self.actuator = Some(Box::new(actuator));
        self
    }

    /// Sets the entrance display.
    pub fn with_display(mut self, display: impl DisplaySink) -> Self {
        self.display = Some(Box::new(display));
        self
    }

    /// Sets event subscribers (log writer, notifier, custom).
    ///
    /// Each one gets a dedicated worker with a bounded queue.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Serves status requests from `server` on every tick.
    pub fn with_server(mut self, server: StatusServer) -> Self {
        self.server = Some(server);
        self
    }

    /// Replaces the wall clock (tests use [`ManualClock`](crate::ManualClock)).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validates the configuration and wiring and returns the scheduler.
    ///
    /// Must be called from within a tokio runtime (subscriber workers are spawned here).
    pub fn build(self) -> Result<Scheduler, LotError> {
        let lot = SlotRegistry::new(&self.cfg)?;
        if self.presence.len() != self.cfg.capacity {
            return Err(LotError::SensorCount {
                expected: self.cfg.capacity,
                got: self.presence.len(),
            });
        }
        let devices = Devices {
            presence: self.presence,
            range: self.range.ok_or(LotError::MissingDevice {
                device: "range sensor",
            })?,
            actuator: self.actuator.ok_or(LotError::MissingDevice {
                device: "gate actuator",
            })?,
            display: self.display.ok_or(LotError::MissingDevice { device: "display" })?,
        };

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(Scheduler::new_internal(
            self.cfg,
            lot,
            devices,
            self.server,
            clock,
            bus,
            subs,
        ))
    }
}
