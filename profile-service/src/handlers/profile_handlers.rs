use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query, State},
    http::{header, StatusCode},
    Json,
};
use std::sync::Arc;

use profiles_shared::auth::AuthUser;
use profiles_shared::error::ServiceError;
use profiles_shared::models::events::{ImageType, RelocationMessage};
use profiles_shared::models::{
    now_millis, ProfileRecord, ProfileResponse, ProfilesResponse, PROFILE_PARTITION,
};
use profiles_shared::queue::RelocationQueue;
use profiles_shared::store::{sort_for_listing, ProfileStore};

use super::AppState;
use crate::error::Result;
use crate::extract::AppJson;
use crate::models::{CreateProfileRequest, ListProfilesParams};

fn not_found() -> ServiceError {
    ServiceError::NotFound("Resource does not exist".to_string())
}

// POST /profiles
pub async fn create_profile<S, Q>(
    State(state): State<Arc<AppState<S, Q>>>,
    Extension(user): Extension<AuthUser>,
    AppJson(payload): AppJson<CreateProfileRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<ProfileResponse>)>
where
    S: ProfileStore + ?Sized,
    Q: RelocationQueue + ?Sized,
{
    payload.validate(&user.sub, &state.layout)?;

    let now = now_millis();
    let record = ProfileRecord {
        pk: PROFILE_PARTITION.to_string(),
        sk: user.sub.clone(),
        email: user.email.clone(),
        profile_type: payload.profile_type,
        display_name: payload.display_name,
        instagram_profile: payload.instagram_profile,
        profile_image: payload.profile_image,
        created_at: now,
        updated_at: now,
    };

    tracing::debug!("Saving profile {:?}", record);
    let saved = state.store.put_profile(record).await?;
    tracing::info!("Saved profile for owner {}", saved.sk);

    if let Some(variants) = &saved.profile_image {
        let message = RelocationMessage {
            owner_id: saved.sk.clone(),
            image_type: ImageType::Profile,
            variants: variants.clone(),
        };
        state.queue.enqueue(&message).await?;
    }

    let location = format!("{}/profiles/{}", state.route_prefix, saved.sk);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ProfileResponse::from(saved)),
    ))
}

// GET /profiles
pub async fn list_profiles<S, Q>(
    State(state): State<Arc<AppState<S, Q>>>,
    params: std::result::Result<Query<ListProfilesParams>, QueryRejection>,
) -> Result<Json<ProfilesResponse>>
where
    S: ProfileStore + ?Sized,
    Q: RelocationQueue + ?Sized,
{
    let Query(params) =
        params.map_err(|rejection| ServiceError::ValidationError(rejection.body_text()))?;
    let query = params.into_query()?;

    let mut page = state.store.query_profiles(query).await?;
    sort_for_listing(&mut page.items);

    let next = match page.next {
        Some(cursor) => Some(cursor.encode()?),
        None => None,
    };

    Ok(Json(ProfilesResponse {
        items: page.items.into_iter().map(ProfileResponse::from).collect(),
        next,
    }))
}

// GET /profiles/me
pub async fn get_my_profile<S, Q>(
    State(state): State<Arc<AppState<S, Q>>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>>
where
    S: ProfileStore + ?Sized,
    Q: RelocationQueue + ?Sized,
{
    let record = state.store.get_profile(&user.sub).await?.ok_or_else(not_found)?;
    Ok(Json(record.into()))
}

// GET /profiles/:id
pub async fn get_profile<S, Q>(
    State(state): State<Arc<AppState<S, Q>>>,
    Path(id): Path<String>,
) -> Result<Json<ProfileResponse>>
where
    S: ProfileStore + ?Sized,
    Q: RelocationQueue + ?Sized,
{
    let record = state.store.get_profile(&id).await?.ok_or_else(not_found)?;
    Ok(Json(record.into()))
}
