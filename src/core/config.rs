//! # Lot configuration.
//!
//! Provides [`LotConfig`] centralized settings for the lot and its scheduler.
//!
//! Config is used in three places:
//! 1. **Lot state**: capacity, fee rate and ledger retention ([`SlotRegistry::new`](crate::SlotRegistry::new))
//! 2. **Controllers**: gate threshold/timers and the departure settle interval
//! 3. **Scheduler**: tick interval, status-request bounds and event bus capacity
//!
//! ## Sentinel values
//! - `request_timeout = 0s` → no timeout on status connections (treated as `None`)
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::error::ConfigError;

/// Global configuration for one lot.
///
/// ## Field semantics
/// - `capacity`: number of slots and of ticket identifiers (`1..=capacity`)
/// - `rate_per_minute`: fee charged per elapsed minute
/// - `settle`: how long an absence must persist before a departure is confirmed
/// - `gate_trigger_cm`: range reading below which the gate is triggered
/// - `gate_hold` / `full_notice`: gate dwell time and "FULL" notice time
/// - `tick_interval`: idle sleep between two scheduler ticks
/// - `request_timeout` / `request_limit`: bounds on a single status connection
/// - `recent_closed` / `ledger_capacity`: reporting window and internal retention
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct LotConfig {
    /// Number of physical slots.
    pub capacity: usize,

    /// Fee rate in currency units per minute.
    pub rate_per_minute: f64,

    /// Departure debounce interval.
    pub settle: Duration,

    /// Range threshold (cm) below which the gate is triggered.
    pub gate_trigger_cm: f64,

    /// Dwell time at the open angle.
    pub gate_hold: Duration,

    /// How long "FULL" stays on the display after a refused trigger.
    pub full_notice: Duration,

    /// Actuator command for the open gate.
    pub open_angle: u16,

    /// Actuator command for the closed gate.
    pub closed_angle: u16,

    /// Idle sleep between ticks.
    pub tick_interval: Duration,

    /// Upper bound on servicing one status connection.
    ///
    /// - `Duration::ZERO` = unbounded (a slow client can stall the tick)
    /// - `> 0` = the connection is dropped once the bound is exceeded
    pub request_timeout: Duration,

    /// Read buffer bound for one request head, in bytes (raised to 8192 if lower).
    pub request_limit: usize,

    /// Number of closed tickets in the reporting view.
    pub recent_closed: usize,

    /// Closed tickets retained internally (oldest dropped first).
    pub ledger_capacity: usize,

    /// Character width of each display line.
    pub display_width: usize,

    /// Recipient handed to the notification sink.
    pub notify_recipient: String,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl LotConfig {
    /// Largest capacity a `u16` slot number can address.
    pub const MAX_CAPACITY: usize = u16::MAX as usize;

    /// Returns the status request timeout as an `Option`.
    ///
    /// - `None` → servicing is unbounded
    /// - `Some(d)` → servicing is cut off after `d`
    #[inline]
    pub fn request_deadline(&self) -> Option<Duration> {
        if self.request_timeout == Duration::ZERO {
            None
        } else {
            Some(self.request_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Checks that the configuration describes a usable lot.
    ///
    /// # Example
    /// ```
    /// use lotkeeper::LotConfig;
    ///
    /// let mut cfg = LotConfig::default();
    /// assert!(cfg.validate().is_ok());
    ///
    /// cfg.capacity = 0;
    /// assert!(cfg.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                capacity: self.capacity,
            });
        }
        if self.capacity > Self::MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                capacity: self.capacity,
                max: Self::MAX_CAPACITY,
            });
        }
        if !self.rate_per_minute.is_finite() || self.rate_per_minute < 0.0 {
            return Err(ConfigError::InvalidRate {
                rate: self.rate_per_minute,
            });
        }
        if self.ledger_capacity < self.recent_closed {
            return Err(ConfigError::LedgerTooSmall {
                ledger: self.ledger_capacity,
                recent: self.recent_closed,
            });
        }
        Ok(())
    }
}

impl Default for LotConfig {
    /// Default configuration (a three-slot lot):
    ///
    /// - `capacity = 3`, `rate_per_minute = 0.5`
    /// - `settle = 1s`, `gate_trigger_cm = 15`, `gate_hold = 5s`, `full_notice = 2s`
    /// - `open_angle = 90`, `closed_angle = 0`
    /// - `tick_interval = 100ms`, `request_timeout = 2s`, `request_limit = 8192`
    /// - `recent_closed = 10`, `ledger_capacity = 256`, `display_width = 16`
    fn default() -> Self {
        Self {
            capacity: 3,
            rate_per_minute: 0.5,
            settle: Duration::from_secs(1),
            gate_trigger_cm: 15.0,
            gate_hold: Duration::from_secs(5),
            full_notice: Duration::from_secs(2),
            open_angle: 90,
            closed_angle: 0,
            tick_interval: Duration::from_millis(100),
            request_timeout: Duration::from_secs(2),
            request_limit: 8192,
            recent_closed: 10,
            ledger_capacity: 256,
            display_width: 16,
            notify_recipient: String::new(),
            bus_capacity: 1024,
        }
    }
}
