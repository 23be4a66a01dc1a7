//! Persistence contract for notifications and their live subscriptions.

use async_trait::async_trait;
use entity::{notifications, Id};
#[cfg(feature = "mock")]
use mockall::automock;
use std::sync::Arc;

use super::error::Error;

/// Invoked with the recipient's full notification list whenever it changes.
pub type NotificationCallback = Arc<dyn Fn(Vec<notifications::Model>) + Send + Sync>;

/// Handle for a live subscription. Dropping the handle releases the subscription.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

#[cfg_attr(feature = "mock", automock)]
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create_notification(
        &self,
        notification: notifications::NewNotification,
    ) -> Result<Id, Error>;

    async fn get_user_notifications(
        &self,
        user_id: Id,
    ) -> Result<Vec<notifications::Model>, Error>;

    async fn mark_notification_as_read(
        &self,
        user_id: Id,
        notification_id: Id,
    ) -> Result<bool, Error>;

    async fn delete_notification(&self, user_id: Id, notification_id: Id) -> Result<bool, Error>;

    /// Registers a push subscription for the recipient's notifications. No polling.
    fn subscribe_to_notifications(
        &self,
        user_id: Id,
        callback: NotificationCallback,
    ) -> Result<Subscription, Error>;
}
