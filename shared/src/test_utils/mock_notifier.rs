use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::alarm::{Notifier, NotifyError};
use crate::models::events::AlarmMessage;

/// Collects alarms. Can be made to fail or to stall.
#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<AlarmMessage>>,
    fail: bool,
    delay: Option<Duration>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<AlarmMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, alarm: &AlarmMessage) -> Result<(), NotifyError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(NotifyError::Publish("simulated SNS outage".to_string()));
        }
        self.sent.lock().unwrap().push(alarm.clone());
        Ok(())
    }
}
