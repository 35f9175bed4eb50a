//! Outbound notifications for closed tickets.
//!
//! - [`NotificationSink`] delivery seam used by the [`Notifier`](crate::Notifier) subscriber
//! - [`TelegramSink`] Telegram Bot API sink (feature `telegram`)

mod sink;
#[cfg(feature = "telegram")]
mod telegram;

pub use sink::NotificationSink;
#[cfg(feature = "telegram")]
pub use telegram::TelegramSink;
