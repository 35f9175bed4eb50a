//! # Gate controller.
//!
//! [`GateController`] turns range readings into actuator commands. It only looks
//! at the lot's aggregate full/not-full flag and never at a particular slot, so
//! the gate may open for a vehicle that then fails to get a ticket (for example
//! when the identifier pool is exhausted). That looseness is intentional.
//!
//! ## States
//! ```text
//!            trigger & !full                next tick             deadline
//!   Idle ─────────────────────► Opening ─────────────► HoldOpen ───────────► Closing
//!    ▲                         (actuate open)                               (actuate closed)
//!    └──────────────────────────────────── next tick ───────────────────────────┘
//!
//!   Idle + trigger & full ──► "FULL" notice for `full_notice`, no actuator movement;
//!                             triggers are ignored until the notice is over.
//! ```
//!
//! Every call to [`GateController::step`] performs at most one transition and
//! reports it as a [`GateEvent`]; the caller applies it to the devices. Hold and
//! notice deadlines are monotonic instants, so a wall-clock step cannot keep the
//! gate open.

use std::time::Duration;

use tokio::time::Instant;

use crate::core::{LotConfig, deadline};

/// Externally visible gate state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    /// Closed, waiting for a trigger.
    Idle,
    /// Open command issued.
    Opening,
    /// Held at the open angle until the dwell deadline.
    HoldOpen,
    /// Close command issued.
    Closing,
}

/// What a single step did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateEvent {
    /// No transition.
    Quiet,
    /// Trigger accepted: move the actuator to `angle`.
    Opening {
        /// Open angle.
        angle: u16,
    },
    /// Dwell started; the gate closes at `until`.
    Holding {
        /// Dwell deadline.
        until: Instant,
    },
    /// Dwell over: move the actuator to `angle`.
    Closing {
        /// Closed angle.
        angle: u16,
    },
    /// Back to idle.
    Closed,
    /// Trigger refused because the lot is full: show "FULL" until `until`.
    Refused {
        /// End of the notice.
        until: Instant,
    },
    /// The "FULL" notice expired: restore the normal display.
    NoticeOver,
}

/// Range-triggered gate state machine.
#[derive(Clone, Debug)]
pub struct GateController {
    state: GateState,
    hold_until: Option<Instant>,
    notice_until: Option<Instant>,
    trigger_cm: f64,
    hold: Duration,
    full_notice: Duration,
    open_angle: u16,
    closed_angle: u16,
}

impl GateController {
    /// Creates an idle gate from the lot configuration.
    pub fn new(cfg: &LotConfig) -> Self {
        Self {
            state: GateState::Idle,
            hold_until: None,
            notice_until: None,
            trigger_cm: cfg.gate_trigger_cm,
            hold: cfg.gate_hold,
            full_notice: cfg.full_notice,
            open_angle: cfg.open_angle,
            closed_angle: cfg.closed_angle,
        }
    }

    /// Current state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// True while the "FULL" notice is showing.
    pub fn notice_active(&self) -> bool {
        self.notice_until.is_some()
    }

    /// True if `reading` (cm, `None` = no echo) is close enough to trigger.
    pub fn is_trigger(&self, reading: Option<f64>) -> bool {
        reading.is_some_and(|cm| cm < self.trigger_cm)
    }

    /// Advances the gate by one tick.
    ///
    /// `reading` is the range sensor value for this tick (`None` = no echo or
    /// read failure), `lot_full` the aggregate occupancy flag.
    pub fn step(&mut self, reading: Option<f64>, lot_full: bool, now: Instant) -> GateEvent {
        match self.state {
            GateState::Idle => self.step_idle(reading, lot_full, now),
            GateState::Opening => {
                self.state = GateState::HoldOpen;
                let until = self.hold_until.unwrap_or(now);
                GateEvent::Holding { until }
            }
            GateState::HoldOpen => match self.hold_until {
                Some(until) if now < until => GateEvent::Quiet,
                _ => {
                    self.hold_until = None;
                    self.state = GateState::Closing;
                    GateEvent::Closing {
                        angle: self.closed_angle,
                    }
                }
            },
            GateState::Closing => {
                self.state = GateState::Idle;
                GateEvent::Closed
            }
        }
    }

    fn step_idle(&mut self, reading: Option<f64>, lot_full: bool, now: Instant) -> GateEvent {
        if let Some(until) = self.notice_until {
            if now < until {
                return GateEvent::Quiet;
            }
            self.notice_until = None;
            return GateEvent::NoticeOver;
        }
        if !self.is_trigger(reading) {
            return GateEvent::Quiet;
        }
        if lot_full {
            let until = deadline(now, self.full_notice);
            self.notice_until = Some(until);
            return GateEvent::Refused { until };
        }
        // Dwell is measured from the open command.
        self.hold_until = Some(deadline(now, self.hold));
        self.state = GateState::Opening;
        GateEvent::Opening {
            angle: self.open_angle,
        }
    }
}
