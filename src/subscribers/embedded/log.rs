//! # LogWriter: event logger
//!
//! A minimal subscriber that writes incoming [`Event`]s through `tracing`.
//! Install any `tracing` subscriber (e.g. `tracing-subscriber`'s fmt layer) to
//! see the output.
//!
//! ## Example output
//! ```text
//! INFO lotkeeper::events: ticket opened slot=1 ticket=1
//! INFO lotkeeper::events: departure suspected slot=1 ticket=1
//! INFO lotkeeper::events: ticket closed slot=1 ticket=1 minutes=12.6 fee=6.30
//! WARN lotkeeper::events: arrival rejected, no ticket identifier free slot=3
//! INFO lotkeeper::events: gate refused, lot full
//! WARN lotkeeper::events: request failed peer=10.0.0.7:51522 reason="serve_timeout: timeout: 2s"
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let slot = e.slot;
        let ticket = e.ticket.map(|t| t.get());
        let source = e.source.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::TicketOpened => {
                info!(target: "lotkeeper::events", ?slot, ?ticket, "ticket opened");
            }
            EventKind::TicketClosed => {
                let fee = format!("{:.2}", e.fee.unwrap_or_default());
                info!(target: "lotkeeper::events", ?slot, ?ticket, minutes = ?e.minutes, %fee, "ticket closed");
            }
            EventKind::ArrivalRejected => {
                warn!(target: "lotkeeper::events", ?slot, "arrival rejected, no ticket identifier free");
            }
            EventKind::DepartureSuspected => {
                info!(target: "lotkeeper::events", ?slot, ?ticket, "departure suspected");
            }
            EventKind::DepartureCancelled => {
                info!(target: "lotkeeper::events", ?slot, ?ticket, "departure cancelled");
            }
            EventKind::GateOpening => info!(target: "lotkeeper::events", "gate opening"),
            EventKind::GateHolding => debug!(target: "lotkeeper::events", "gate holding"),
            EventKind::GateClosing => info!(target: "lotkeeper::events", "gate closing"),
            EventKind::GateIdle => debug!(target: "lotkeeper::events", "gate idle"),
            EventKind::GateRefused => info!(target: "lotkeeper::events", "gate refused, lot full"),
            EventKind::RequestServed => {
                debug!(target: "lotkeeper::events", peer = source, route = reason, "request served");
            }
            EventKind::RequestFailed => {
                warn!(target: "lotkeeper::events", peer = source, reason, "request failed");
            }
            EventKind::SensorFailed => {
                warn!(target: "lotkeeper::events", ?slot, reason, "sensor read failed");
            }
            EventKind::SubscriberOverflow => {
                warn!(target: "lotkeeper::events", subscriber = source, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                warn!(target: "lotkeeper::events", subscriber = source, reason, "subscriber panicked");
            }
            EventKind::ShutdownRequested => info!(target: "lotkeeper::events", "shutdown requested"),
            EventKind::SchedulerStopped => {
                info!(target: "lotkeeper::events", totals = reason, "scheduler stopped");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
