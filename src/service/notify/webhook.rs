//! Webhook implementation of scheduling notifications.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{NotifyOutcome, Res, ScheduledNotification},
};

use super::{GenericNotifyClient, NotifyClient};

// Extra methods on `NotifyClient` applied by the webhook implementation.

impl NotifyClient {
    /// Creates a webhook notifier; an absent URL turns every call into a no-op.
    pub fn webhook(config: &Config) -> Res<Self> {
        let client = WebhookNotifyClient::new(config.notify_webhook_url.as_deref())?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Specific implementations.

/// Posts notifications as JSON to a single webhook URL.
#[derive(Clone)]
pub struct WebhookNotifyClient {
    client: reqwest::Client,
    url: Option<Url>,
}

impl WebhookNotifyClient {
    pub fn new(url: Option<&str>) -> Res<Self> {
        let url = url.map(Url::parse).transpose()?;

        if url.is_none() {
            info!("No notify webhook configured; scheduling notifications are disabled.");
        }

        Ok(Self { client: reqwest::Client::new(), url })
    }
}

#[async_trait]
impl GenericNotifyClient for WebhookNotifyClient {
    #[instrument(name = "WebhookNotifyClient::notify_scheduled", skip_all, fields(ticket_id = %notification.ticket_id))]
    async fn notify_scheduled(&self, notification: &ScheduledNotification) -> Res<NotifyOutcome> {
        let Some(url) = &self.url else {
            return Ok(NotifyOutcome::Skipped);
        };

        let response = self.client.post(url.clone()).json(notification).send().await?;
        let status = response.status().as_u16();

        info!("Webhook answered with status {status}.");

        Ok(NotifyOutcome::Delivered { status })
    }
}

// Tests.
