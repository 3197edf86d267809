use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sns::Client as SnsClient;

use super::{Notifier, NotifyError};
use crate::config::AlarmConfig;
use crate::error::aws_error_message;
use crate::models::events::AlarmMessage;

/// Alarm topic; a separate subscriber forwards messages to the team channel
pub struct SnsNotifier {
    client: SnsClient,
    topic_arn: String,
}

impl SnsNotifier {
    pub async fn from_config(config: &AlarmConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::new(SnsClient::new(&sdk_config), config.topic_arn.clone())
    }

    pub fn new(client: SnsClient, topic_arn: String) -> Self {
        Self { client, topic_arn }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn notify(&self, alarm: &AlarmMessage) -> Result<(), NotifyError> {
        let message = serde_json::to_string(alarm)?;

        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .message(message)
            .send()
            .await
            .map_err(|err| NotifyError::Publish(aws_error_message(&err)))?;

        Ok(())
    }
}
