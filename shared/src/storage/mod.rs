use async_trait::async_trait;

use crate::error::Result;

pub mod s3;

pub use s3::S3ObjectStorage;

/// Object storage holding the image variants.
///
/// Keys are bucket keys, i.e. CDN paths without the leading separator
/// (see `images::keys::object_key`).
#[async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    /// Writes `content` under `key`, replacing any existing object
    async fn put_object(&self, key: &str, content: Vec<u8>, content_type: &str) -> Result<()>;

    /// Server-side copy inside the bucket. Copying onto an existing identical
    /// object is harmless.
    async fn copy_object(&self, source_key: &str, destination_key: &str) -> Result<()>;
}
