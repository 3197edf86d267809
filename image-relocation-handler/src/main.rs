use aws_lambda_events::event::sqs::SqsEvent;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use std::env;
use std::sync::Arc;
use tracing::{error, info, warn};

use profiles_shared::alarm::{Notifier, SnsNotifier};
use profiles_shared::config::{AlarmConfig, StorageConfig, TableConfig};
use profiles_shared::relocation::{RelocationOutcome, RelocationWorker};
use profiles_shared::storage::{ObjectStorage, S3ObjectStorage};
use profiles_shared::store::{DynamoProfileStore, ProfileStore};


type Worker = RelocationWorker<DynamoProfileStore, S3ObjectStorage, SnsNotifier>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "info,image_relocation_handler=debug".into()),
        )
        .with_ansi(false)
        .with_target(true)
        .init();

    info!("Starting Image Relocation Handler Lambda");

    let table = TableConfig::from_env()?;
    let storage = StorageConfig::from_env()?;
    let alarm = AlarmConfig::from_env()?;

    let worker: Arc<Worker> = Arc::new(RelocationWorker::new(
        Arc::new(DynamoProfileStore::from_config(&table).await),
        Arc::new(S3ObjectStorage::from_config(&storage).await),
        Arc::new(SnsNotifier::from_config(&alarm).await),
        storage.layout.clone(),
    ));

    lambda_runtime::run(service_fn(|event| handler(event, worker.clone()))).await?;
    Ok(())
}

/// Runs every record of the batch through the worker. Failures are alarmed by
/// the worker and never stop the remaining records.
pub async fn handler<S, O, N>(
    event: LambdaEvent<SqsEvent>,
    worker: Arc<RelocationWorker<S, O, N>>,
) -> Result<(), Error>
where
    S: ProfileStore + ?Sized,
    O: ObjectStorage + ?Sized,
    N: Notifier + ?Sized,
{
    let outcomes = process_batch(event.payload, worker.as_ref()).await;

    let failed = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, RelocationOutcome::Failed(_)))
        .count();
    info!(
        "Processed {} relocation message(s), {} failed",
        outcomes.len(),
        failed
    );

    Ok(())
}

pub async fn process_batch<S, O, N>(
    event: SqsEvent,
    worker: &RelocationWorker<S, O, N>,
) -> Vec<RelocationOutcome>
where
    S: ProfileStore + ?Sized,
    O: ObjectStorage + ?Sized,
    N: Notifier + ?Sized,
{
    let mut outcomes = Vec::with_capacity(event.records.len());

    for record in event.records {
        let message_id = record.message_id.unwrap_or_default();
        let outcome = worker.process_raw(&message_id, record.body.as_deref()).await;

        match &outcome {
            RelocationOutcome::Relocated(_) => {
                info!("Relocated the image of message [{}]", message_id)
            }
            RelocationOutcome::AlreadyRelocated => {
                info!("Message [{}] was already relocated", message_id)
            }
            RelocationOutcome::ProfileNotFound | RelocationOutcome::NoProfileImage => {
                warn!("Dropping message [{}]: {:?}", message_id, outcome)
            }
            RelocationOutcome::Failed(details) => {
                error!("Message [{}] failed: {}", message_id, details)
            }
        }

        outcomes.push(outcome);
    }

    outcomes
}
