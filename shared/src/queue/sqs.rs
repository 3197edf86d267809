use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sqs::Client;

use crate::config::QueueConfig;
use crate::error::{map_aws_error, Result};
use crate::models::events::RelocationMessage;

pub struct SqsRelocationQueue {
    client: Client,
    queue_url: String,
}

impl SqsRelocationQueue {
    pub async fn from_config(config: &QueueConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::new(Client::new(&sdk_config), config.queue_url.clone())
    }

    pub fn new(client: Client, queue_url: String) -> Self {
        Self { client, queue_url }
    }
}

#[async_trait]
impl super::RelocationQueue for SqsRelocationQueue {
    async fn enqueue(&self, message: &RelocationMessage) -> Result<()> {
        let body = serde_json::to_string(message)?;

        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|err| map_aws_error("SQS", "send_message", err))?;

        tracing::info!(
            "Enqueued relocation for owner {} (message id {})",
            message.owner_id,
            output.message_id().unwrap_or("unknown")
        );
        Ok(())
    }
}
