use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, ServiceError};
use crate::storage::ObjectStorage;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub content: Vec<u8>,
    pub content_type: String,
}

/// In-memory bucket. Puts and copies can be switched to fail.
#[derive(Default)]
pub struct MockObjectStorage {
    objects: Mutex<HashMap<String, StoredObject>>,
    copies: Mutex<Vec<(String, String)>>,
    fail_puts: AtomicBool,
    fail_copies: AtomicBool,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_copies(&self, fail: bool) {
        self.fail_copies.store(fail, Ordering::SeqCst);
    }

    pub fn insert_object(&self, key: &str, content: Vec<u8>, content_type: &str) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                content,
                content_type: content_type.to_string(),
            },
        );
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Copies issued so far as (source, destination), in call order
    pub fn copies(&self) -> Vec<(String, String)> {
        self.copies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn put_object(&self, key: &str, content: Vec<u8>, content_type: &str) -> Result<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(ServiceError::StorageWrite(format!(
                "S3 put_object error: simulated failure for {}",
                key
            )));
        }
        self.insert_object(key, content, content_type);
        Ok(())
    }

    async fn copy_object(&self, source_key: &str, destination_key: &str) -> Result<()> {
        self.copies
            .lock()
            .unwrap()
            .push((source_key.to_string(), destination_key.to_string()));

        if self.fail_copies.load(Ordering::SeqCst) {
            return Err(ServiceError::StorageWrite(format!(
                "S3 copy_object error: simulated failure for {}",
                source_key
            )));
        }

        let mut objects = self.objects.lock().unwrap();
        let source = objects.get(source_key).cloned().ok_or_else(|| {
            ServiceError::StorageWrite(format!(
                "S3 copy_object error: NoSuchKey: {} does not exist",
                source_key
            ))
        })?;
        objects.insert(destination_key.to_string(), source);
        Ok(())
    }
}
