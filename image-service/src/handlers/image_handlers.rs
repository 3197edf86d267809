use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use profiles_shared::auth::AuthUser;
use profiles_shared::error::ServiceError;
use profiles_shared::images::VariantDeriver;
use profiles_shared::models::VariantSet;
use profiles_shared::storage::ObjectStorage;

use super::ImageState;
use crate::error::Result;
use crate::extract::AppJson;
use crate::models::UploadImageRequest;

// POST /images
pub async fn upload_image<O>(
    State(state): State<Arc<ImageState<O>>>,
    Extension(user): Extension<AuthUser>,
    AppJson(payload): AppJson<UploadImageRequest>,
) -> Result<(StatusCode, Json<VariantSet>)>
where
    O: ObjectStorage,
{
    let bytes = VariantDeriver::decode_payload(&payload.image)?;
    tracing::info!("Received an image of {} bytes from {}", bytes.len(), user.sub);

    // decoding and resizing would stall the runtime
    let deriver = state.deriver;
    let derived = tokio::task::spawn_blocking(move || deriver.derive(bytes))
        .await
        .map_err(|err| ServiceError::InternalError(format!("Image processing aborted: {}", err)))??;

    let variants = state.stager.stage(&user.sub, derived).await?;
    tracing::info!(
        "Staged image variants for {}: orig={}, prvw={}, thmb={}",
        user.sub,
        variants.orig.key,
        variants.prvw.key,
        variants.thmb.key
    );

    Ok((StatusCode::CREATED, Json(variants)))
}
