pub mod webhook;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{NotifyOutcome, Res, ScheduledNotification};

// Traits.

/// Generic notification trait that clients must implement.
///
/// Notifications are fire-and-forget: callers log failures and move on.
#[async_trait]
pub trait GenericNotifyClient: Send + Sync + 'static {
    /// Announce that a ticket has been scheduled.
    async fn notify_scheduled(&self, notification: &ScheduledNotification) -> Res<NotifyOutcome>;
}

// Structs.

/// Notification client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct NotifyClient {
    inner: Arc<dyn GenericNotifyClient>,
}

impl Deref for NotifyClient {
    type Target = dyn GenericNotifyClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl NotifyClient {
    pub fn new(inner: Arc<dyn GenericNotifyClient>) -> Self {
        Self { inner }
    }
}
