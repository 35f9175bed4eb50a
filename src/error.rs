//! Error types used by the lot controller, its devices and its outer surfaces.
//!
//! This module defines the error enums raised across the crate:
//!
//! - [`ConfigError`]: a [`LotConfig`](crate::LotConfig) that cannot describe a lot.
//! - [`LotError`]: errors raised while building or addressing the lot itself.
//! - [`SensorError`]: a device read that failed (the tick carries on).
//! - [`ServeError`]: a status request that could not be serviced.
//! - [`NotifyError`]: a notification the external channel did not accept.
//!
//! Every type provides `as_label` (stable snake_case, for logs/metrics) and
//! `as_message` (human-readable details). None of them is fatal to the scheduler.

use std::time::Duration;
use thiserror::Error;

/// # Invalid lot configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A lot needs at least one slot.
    #[error("capacity must be at least 1 (got {capacity})")]
    ZeroCapacity {
        /// The configured capacity.
        capacity: usize,
    },

    /// Capacity exceeds what a ticket identifier can number.
    #[error("capacity {capacity} exceeds the identifier range (max {max})")]
    CapacityTooLarge {
        /// The configured capacity.
        capacity: usize,
        /// Largest supported capacity.
        max: usize,
    },

    /// Rate is negative, NaN or infinite.
    #[error("rate per minute must be finite and non-negative (got {rate})")]
    InvalidRate {
        /// The configured rate.
        rate: f64,
    },

    /// Internal ledger retention is smaller than the reporting window.
    #[error("ledger capacity {ledger} is smaller than the reporting window {recent}")]
    LedgerTooSmall {
        /// Configured ledger retention.
        ledger: usize,
        /// Configured reporting window.
        recent: usize,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use lotkeeper::ConfigError;
    ///
    /// let err = ConfigError::ZeroCapacity { capacity: 0 };
    /// assert_eq!(err.as_label(), "config_zero_capacity");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroCapacity { .. } => "config_zero_capacity",
            ConfigError::CapacityTooLarge { .. } => "config_capacity_too_large",
            ConfigError::InvalidRate { .. } => "config_invalid_rate",
            ConfigError::LedgerTooSmall { .. } => "config_ledger_too_small",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// # Errors produced while building or addressing the lot.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LotError {
    /// Configuration rejected by [`LotConfig::validate`](crate::LotConfig::validate).
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Slot number outside `1..=capacity`.
    #[error("unknown slot {slot} (capacity {capacity})")]
    UnknownSlot {
        /// The requested slot number.
        slot: u16,
        /// The lot capacity.
        capacity: usize,
    },

    /// The number of presence sensors does not match the configured capacity.
    #[error("expected {expected} slot sensors, got {got}")]
    SensorCount {
        /// Configured capacity.
        expected: usize,
        /// Sensors handed to the builder.
        got: usize,
    },

    /// A required device was not handed to the builder.
    #[error("no {device} configured")]
    MissingDevice {
        /// Which device is missing.
        device: &'static str,
    },

    /// The status listener could not be bound.
    #[error("failed to bind status listener on {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl LotError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LotError::Config(_) => "lot_config",
            LotError::UnknownSlot { .. } => "lot_unknown_slot",
            LotError::SensorCount { .. } => "lot_sensor_count",
            LotError::MissingDevice { .. } => "lot_missing_device",
            LotError::Bind { .. } => "lot_bind",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LotError::Config(e) => format!("config: {}", e.as_message()),
            LotError::UnknownSlot { slot, capacity } => {
                format!("slot={slot} capacity={capacity}")
            }
            LotError::SensorCount { expected, got } => {
                format!("sensors expected={expected} got={got}")
            }
            LotError::MissingDevice { device } => format!("missing device: {device}"),
            LotError::Bind { addr, source } => format!("bind {addr}: {source}"),
        }
    }
}

/// # A device read that failed.
///
/// A failed read skips that device for the current tick; it is never retried
/// within the tick and never stops the scheduler.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// The device did not answer.
    #[error("device '{device}' unavailable: {reason}")]
    Unavailable {
        /// Device name.
        device: String,
        /// Driver-provided reason.
        reason: String,
    },

    /// The device answered with a value outside its range.
    #[error("device '{device}' returned an invalid reading: {reason}")]
    InvalidReading {
        /// Device name.
        device: String,
        /// Driver-provided reason.
        reason: String,
    },
}

impl SensorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SensorError::Unavailable { .. } => "sensor_unavailable",
            SensorError::InvalidReading { .. } => "sensor_invalid_reading",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SensorError::Unavailable { device, reason } => format!("{device}: {reason}"),
            SensorError::InvalidReading { device, reason } => {
                format!("{device}: invalid reading ({reason})")
            }
        }
    }
}

/// # Errors produced while servicing one status connection.
///
/// The connection is closed and the scheduler continues with the next tick.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ServeError {
    /// Reading the request or writing the response failed.
    #[error("connection i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP exchange failed (unparsable head, oversized request, early hang-up).
    #[error("http exchange failed: {0}")]
    Http(#[from] hyper::Error),

    /// The request could not be understood.
    #[error("malformed request: {reason}")]
    Malformed {
        /// What was wrong with it.
        reason: String,
    },

    /// Servicing exceeded the configured request timeout.
    #[error("request timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// The snapshot could not be encoded.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ServeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use lotkeeper::ServeError;
    /// use std::time::Duration;
    ///
    /// let err = ServeError::Timeout { timeout: Duration::from_secs(2) };
    /// assert_eq!(err.as_label(), "serve_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServeError::Io(_) => "serve_io",
            ServeError::Http(_) => "serve_http",
            ServeError::Malformed { .. } => "serve_malformed",
            ServeError::Timeout { .. } => "serve_timeout",
            ServeError::Encode(_) => "serve_encode",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ServeError::Io(e) => format!("io: {e}"),
            ServeError::Http(e) => format!("http: {e}"),
            ServeError::Malformed { reason } => format!("malformed: {reason}"),
            ServeError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            ServeError::Encode(e) => format!("encode: {e}"),
        }
    }
}

/// # A notification the external channel did not accept.
///
/// Logged by the notifier and dropped; there is no retry.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The request never reached the remote service.
    #[error("notification transport failed: {error}")]
    Transport {
        /// The underlying error message.
        error: String,
    },

    /// The remote service answered with a failure.
    #[error("notification rejected with status {status}: {body}")]
    Rejected {
        /// HTTP-like status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },
}

impl NotifyError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            NotifyError::Transport { .. } => "notify_transport",
            NotifyError::Rejected { .. } => "notify_rejected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            NotifyError::Transport { error } => format!("transport: {error}"),
            NotifyError::Rejected { status, body } => format!("status={status} body={body}"),
        }
    }
}
