use futures::future::join_all;
use std::sync::Arc;

use super::deriver::{DerivedImage, DerivedVariant, Preview};
use super::keys::{content_type, object_key, KeyLayout};
use crate::error::{Result, ServiceError};
use crate::models::{VariantRef, VariantSet};
use crate::storage::ObjectStorage;

/// Writes derived variants under the owner's temporary prefix.
pub struct TemporaryStager<O: ObjectStorage> {
    storage: Arc<O>,
    layout: KeyLayout,
}

impl<O: ObjectStorage> TemporaryStager<O> {
    pub fn new(storage: Arc<O>, layout: KeyLayout) -> Self {
        Self { storage, layout }
    }

    fn reference(&self, owner_id: &str, variant: &DerivedVariant) -> VariantRef {
        VariantRef {
            id: variant.id.clone(),
            key: self.layout.temp_key(owner_id, &variant.id, &variant.ext),
            ext: variant.ext.clone(),
            width: variant.width,
            height: variant.height,
        }
    }

    /// Stores every distinct variant concurrently and returns their references.
    ///
    /// Any failed write fails the whole call with `StorageWrite`. Objects that
    /// were written before the failure stay where they are.
    pub async fn stage(&self, owner_id: &str, image: DerivedImage) -> Result<VariantSet> {
        let orig = self.reference(owner_id, &image.orig);
        let thmb = self.reference(owner_id, &image.thmb);
        let prvw = match &image.prvw {
            Preview::Original => orig.clone(),
            Preview::Converted(variant) => self.reference(owner_id, variant),
        };

        let mut uploads = vec![(orig.key.clone(), image.orig)];
        if let Preview::Converted(variant) = image.prvw {
            uploads.push((prvw.key.clone(), variant));
        }
        uploads.push((thmb.key.clone(), image.thmb));

        tracing::info!(
            "Staging {} objects under {}",
            uploads.len(),
            self.layout.temp_owner_prefix(owner_id)
        );

        let writes = uploads.into_iter().map(|(key, variant)| {
            let storage = Arc::clone(&self.storage);
            async move {
                storage
                    .put_object(
                        object_key(&key),
                        variant.content,
                        &content_type(&variant.ext),
                    )
                    .await
                    .map_err(|err| (key, err))
            }
        });

        let mut failure = None;
        for result in join_all(writes).await {
            if let Err((key, err)) = result {
                tracing::error!("Failed to stage {}: {}", key, err);
                failure.get_or_insert(err);
            }
        }

        match failure {
            None => Ok(VariantSet { prvw, orig, thmb }),
            Some(ServiceError::StorageWrite(message)) => Err(ServiceError::StorageWrite(message)),
            Some(other) => Err(ServiceError::StorageWrite(other.to_string())),
        }
    }
}
