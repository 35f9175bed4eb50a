//! # Notification delivery seam.
//!
//! A sink pushes one text message to one recipient over some external channel.
//! Sinks are called from a subscriber worker, never from the scheduler tick, so
//! a slow or failing channel cannot stall the lot.

use async_trait::async_trait;

use crate::error::NotifyError;

/// Delivers a text message to a recipient.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    /// Sends `message` to `recipient` once.
    async fn send(&self, recipient: &str, message: &str) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<T> {
    async fn send(&self, recipient: &str, message: &str) -> Result<(), NotifyError> {
        (**self).send(recipient, message).await
    }
}
