//! Moves staged variants to the permanent prefix and points the owning profile
//! at them.
//!
//! Per message: look up the profile, copy every variant that is still staged,
//! then overwrite the record with the permanent keys. A failed copy or write
//! leaves the record untouched and raises an alarm, so a redelivered message
//! repeats the same work.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use crate::alarm::{notify_best_effort, Notifier, NOTIFY_TIMEOUT};
use crate::error::{Result, ServiceError};
use crate::images::keys::{object_key, KeyLayout};
use crate::models::events::{AlarmMessage, RelocationMessage};
use crate::models::{VariantRef, VariantSet};
use crate::storage::ObjectStorage;
use crate::store::ProfileStore;

pub const ALARM_SOURCE: &str = "Image relocation handler";

#[derive(Debug, Clone, PartialEq)]
pub enum RelocationOutcome {
    /// Objects copied and the record rewritten with these variants
    Relocated(VariantSet),
    /// Every variant already lives under the permanent prefix
    AlreadyRelocated,
    ProfileNotFound,
    NoProfileImage,
    /// Nothing was written to the record; an alarm was raised
    Failed(String),
}

pub struct RelocationWorker<S, O, N>
where
    S: ProfileStore + ?Sized,
    O: ObjectStorage + ?Sized,
    N: Notifier + ?Sized,
{
    store: Arc<S>,
    storage: Arc<O>,
    notifier: Arc<N>,
    layout: KeyLayout,
    notify_timeout: Duration,
}

pub fn alarm_message(message_id: &str) -> String {
    format!(
        "Error during processing an image for the msg id [{}]",
        message_id
    )
}

impl<S, O, N> RelocationWorker<S, O, N>
where
    S: ProfileStore + ?Sized,
    O: ObjectStorage + ?Sized,
    N: Notifier + ?Sized,
{
    pub fn new(store: Arc<S>, storage: Arc<O>, notifier: Arc<N>, layout: KeyLayout) -> Self {
        Self {
            store,
            storage,
            notifier,
            layout,
            notify_timeout: NOTIFY_TIMEOUT,
        }
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    /// Handles one raw queue record. An unparsable body is reported like any
    /// other failure.
    pub async fn process_raw(&self, message_id: &str, body: Option<&str>) -> RelocationOutcome {
        let parsed = match body {
            Some(body) => serde_json::from_str::<RelocationMessage>(body).map_err(|err| {
                ServiceError::ValidationError(format!("Invalid relocation message: {}", err))
            }),
            None => Err(ServiceError::ValidationError(
                "Relocation message has no body".to_string(),
            )),
        };

        match parsed {
            Ok(message) => self.process(message_id, &message).await,
            Err(err) => self.fail(message_id, err).await,
        }
    }

    pub async fn process(&self, message_id: &str, message: &RelocationMessage) -> RelocationOutcome {
        tracing::info!(
            "Received an image relocation message [{}] for owner {}",
            message_id,
            message.owner_id
        );
        tracing::debug!("Relocation message [{}]: {:?}", message_id, message);

        match self.relocate(message).await {
            Ok(outcome) => outcome,
            Err(err) => self.fail(message_id, err).await,
        }
    }

    async fn fail(&self, message_id: &str, err: ServiceError) -> RelocationOutcome {
        let message = alarm_message(message_id);
        tracing::error!("{}: {}", message, err);

        let details = format!("{} {}", err.kind(), err);
        let alarm = AlarmMessage::new(ALARM_SOURCE, message, details.clone());
        notify_best_effort(self.notifier.as_ref(), &alarm, self.notify_timeout).await;

        RelocationOutcome::Failed(details)
    }

    async fn relocate(&self, message: &RelocationMessage) -> Result<RelocationOutcome> {
        let owner_id = message.owner_id.as_str();

        let Some(mut record) = self.store.get_profile(owner_id).await? else {
            tracing::error!("Not found a profile with owner id [{}]", owner_id);
            return Ok(RelocationOutcome::ProfileNotFound);
        };

        let Some(current) = record.profile_image.clone() else {
            tracing::error!("Profile [{}] has no image variants to relocate", owner_id);
            return Ok(RelocationOutcome::NoProfileImage);
        };

        let queued_ids = message.variants.iter().map(|v| v.id.as_str());
        if !queued_ids.eq(current.iter().map(|v| v.id.as_str())) {
            tracing::warn!(
                "Queued variants for [{}] differ from the stored profile image; relocating the stored ones",
                owner_id
            );
        }

        let pending: Vec<(&VariantRef, String)> = current
            .distinct()
            .into_iter()
            .map(|variant| (variant, self.layout.permanent_key_for(owner_id, variant)))
            .filter(|(variant, permanent)| &variant.key != permanent)
            .collect();

        if pending.is_empty() {
            tracing::info!("Profile image of [{}] is already relocated", owner_id);
            return Ok(RelocationOutcome::AlreadyRelocated);
        }

        let copies = pending.iter().map(|(variant, permanent)| {
            self.storage
                .copy_object(object_key(&variant.key), object_key(permanent))
        });

        let mut failure = None;
        for ((variant, _), result) in pending.iter().zip(join_all(copies).await) {
            if let Err(err) = result {
                tracing::error!("Failed to relocate {}: {}", variant.key, err);
                failure.get_or_insert(err);
            }
        }
        if let Some(err) = failure {
            return Err(err);
        }

        let relocated = current.map_keys(|variant| self.layout.permanent_key_for(owner_id, variant));
        let expected_updated_at = record.updated_at;
        record.profile_image = Some(relocated.clone());
        record.touch();

        tracing::debug!("Saving relocated profile {:?}", record);
        self.store.replace_profile(record, expected_updated_at).await?;
        tracing::info!("Relocated {} objects for [{}]", pending.len(), owner_id);

        Ok(RelocationOutcome::Relocated(relocated))
    }
}
