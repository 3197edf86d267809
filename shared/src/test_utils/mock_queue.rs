use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, ServiceError};
use crate::models::events::RelocationMessage;
use crate::queue::RelocationQueue;

/// Records enqueued messages instead of sending them
#[derive(Default)]
pub struct MockRelocationQueue {
    messages: Mutex<Vec<RelocationMessage>>,
    fail: AtomicBool,
}

impl MockRelocationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<RelocationMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelocationQueue for MockRelocationQueue {
    async fn enqueue(&self, message: &RelocationMessage) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::InternalError(
                "SQS send_message error: simulated failure".to_string(),
            ));
        }
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}
