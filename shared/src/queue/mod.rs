use async_trait::async_trait;

use crate::error::Result;
use crate::models::events::RelocationMessage;

pub mod sqs;

pub use sqs::SqsRelocationQueue;

/// Queue feeding the relocation worker
#[async_trait]
pub trait RelocationQueue: Send + Sync + 'static {
    async fn enqueue(&self, message: &RelocationMessage) -> Result<()>;
}
