use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::config::StorageConfig;
use crate::error::{aws_error_message, Result, ServiceError};

/// S3 bucket behind the CDN
pub struct S3ObjectStorage {
    client: Client,
    bucket_name: String,
}

impl S3ObjectStorage {
    pub async fn from_config(config: &StorageConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::new(Client::new(&sdk_config), config.bucket_name.clone())
    }

    pub fn new(client: Client, bucket_name: String) -> Self {
        Self {
            client,
            bucket_name,
        }
    }
}

#[async_trait]
impl super::ObjectStorage for S3ObjectStorage {
    async fn put_object(&self, key: &str, content: Vec<u8>, content_type: &str) -> Result<()> {
        let size = content.len();

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(ByteStream::from(content))
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| {
                tracing::error!("S3 put_object failed for {}: {:?}", key, err);
                ServiceError::StorageWrite(format!(
                    "S3 put_object error: {}",
                    aws_error_message(&err)
                ))
            })?;

        tracing::debug!("Stored {} ({} bytes, {})", key, size, content_type);
        Ok(())
    }

    async fn copy_object(&self, source_key: &str, destination_key: &str) -> Result<()> {
        // ids are uuids and subjects pass auth::check_subject, so nothing needs escaping
        let copy_source = format!("{}/{}", self.bucket_name, source_key);

        self.client
            .copy_object()
            .bucket(&self.bucket_name)
            .copy_source(copy_source)
            .key(destination_key)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(
                    "S3 copy_object failed from {} to {}: {:?}",
                    source_key,
                    destination_key,
                    err
                );
                ServiceError::StorageWrite(format!(
                    "S3 copy_object error: {}",
                    aws_error_message(&err)
                ))
            })?;

        tracing::debug!("Copied {} to {}", source_key, destination_key);
        Ok(())
    }
}
