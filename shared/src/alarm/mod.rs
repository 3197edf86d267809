use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::models::events::AlarmMessage;

pub mod sns;

pub use sns::SnsNotifier;

/// Upper bound for a single alarm publication
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to serialize alarm: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to publish alarm: {0}")]
    Publish(String),

    #[error("Alarm publication timed out after {0:?}")]
    Timeout(Duration),
}

/// Channel that forwards alarms to humans
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(&self, alarm: &AlarmMessage) -> std::result::Result<(), NotifyError>;
}

/// Publishes `alarm` within `timeout`. Failures are logged and swallowed so the
/// caller's own failure path is never blocked by the alarm channel.
pub async fn notify_best_effort<N: Notifier + ?Sized>(
    notifier: &N,
    alarm: &AlarmMessage,
    timeout: Duration,
) -> bool {
    let outcome = match tokio::time::timeout(timeout, notifier.notify(alarm)).await {
        Ok(result) => result,
        Err(_) => Err(NotifyError::Timeout(timeout)),
    };

    match outcome {
        Ok(()) => {
            tracing::info!("Alarm published: {}", alarm.payload.message);
            true
        }
        Err(err) => {
            tracing::error!(
                "Could not publish alarm '{}': {}",
                alarm.payload.message,
                err
            );
            false
        }
    }
}
