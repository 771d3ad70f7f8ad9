//! Notification delivery
//!
//! The registry hands every committed mutation to a [`NotificationEmitter`].
//! Delivery is best-effort: an emitter must not block the caller on the
//! network, and its errors are logged by the registry, never propagated.

use async_trait::async_trait;
use shared::models::NotificationEvent;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification client error: {0}")]
    Client(String),

    #[error("notification rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait NotificationEmitter: Send + Sync {
    async fn emit(&self, event: &NotificationEvent) -> Result<(), NotifyError>;
}

/// Writes events to the log only
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmitter;

#[async_trait]
impl NotificationEmitter for LogEmitter {
    async fn emit(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        tracing::info!(
            member_id = %event.member_id,
            status = %event.status,
            title = %event.title,
            "Member notification"
        );
        Ok(())
    }
}

/// Posts events as JSON to a chat webhook
///
/// The request runs on a spawned task; `emit` returns as soon as it is queued.
#[derive(Debug, Clone)]
pub struct WebhookEmitter {
    client: reqwest::Client,
    url: String,
}

impl WebhookEmitter {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let url = url.into();
        reqwest::Url::parse(&url).map_err(|e| NotifyError::Client(format!("{url}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl NotificationEmitter for WebhookEmitter {
    async fn emit(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        let client = self.client.clone();
        let url = self.url.clone();
        let event = event.clone();

        tokio::spawn(async move {
            match client.post(&url).json(&event).send().await {
                Ok(resp) if resp.status().is_success() => {
                    tracing::debug!(member_id = %event.member_id, "Webhook notification delivered");
                }
                Ok(resp) => {
                    tracing::warn!(
                        member_id = %event.member_id,
                        status = %resp.status(),
                        "Webhook notification rejected"
                    );
                }
                Err(e) => {
                    tracing::warn!(member_id = %event.member_id, error = %e, "Webhook notification failed");
                }
            }
        });
        Ok(())
    }
}
