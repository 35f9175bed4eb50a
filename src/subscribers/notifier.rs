//! # Notifier: closed-ticket push messages.
//!
//! Turns every `TicketClosed` event into one message and hands it to a
//! [`NotificationSink`]. Other events are ignored.
//!
//! ```text
//! Ticket CLOSED
//! ID: 2 Slot: S3
//! Duration: 12.6 minutes
//! Fee: $6.30
//! ```
//!
//! Delivery is attempted once. A failure is logged at `warn` and the message is
//! dropped.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::notify::NotificationSink;
use crate::subscribers::Subscribe;

/// Subscriber that pushes closed tickets to a notification sink.
pub struct Notifier<S> {
    sink: S,
    recipient: String,
}

impl<S: NotificationSink> Notifier<S> {
    /// Creates a notifier delivering to `recipient` through `sink`.
    pub fn new(sink: S, recipient: impl Into<String>) -> Self {
        Self {
            sink,
            recipient: recipient.into(),
        }
    }

    /// Message body for a `TicketClosed` event, `None` for anything else.
    pub fn render(event: &Event) -> Option<String> {
        if event.kind != EventKind::TicketClosed {
            return None;
        }
        let id = event.ticket?;
        let slot = event.slot?;
        Some(format!(
            "Ticket CLOSED\nID: {id} Slot: S{slot}\nDuration: {:.1} minutes\nFee: ${:.2}",
            event.minutes.unwrap_or_default(),
            event.fee.unwrap_or_default(),
        ))
    }
}

#[async_trait]
impl<S: NotificationSink> Subscribe for Notifier<S> {
    async fn on_event(&self, event: &Event) {
        let Some(message) = Self::render(event) else {
            return;
        };
        if let Err(e) = self.sink.send(&self.recipient, &message).await {
            tracing::warn!(
                ticket = ?event.ticket.map(|t| t.get()),
                error = e.as_label(),
                detail = %e.as_message(),
                "notification not delivered"
            );
        }
    }

    fn name(&self) -> &'static str {
        "Notifier"
    }

    fn queue_capacity(&self) -> usize {
        256
    }
}
