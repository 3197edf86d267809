use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};
use crate::models::{ProfileRecord, ProfileType, PROFILE_PARTITION};

pub mod dynamo;

pub use dynamo::DynamoProfileStore;

/// Largest page a listing returns
pub const MAX_PAGE_SIZE: usize = 50;

/// Filter and paging for a profile listing
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileQuery {
    pub profile_type: Option<ProfileType>,
    pub limit: usize,
    pub cursor: Option<CursorKey>,
}

impl Default for ProfileQuery {
    fn default() -> Self {
        Self {
            profile_type: None,
            limit: MAX_PAGE_SIZE,
            cursor: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePage {
    pub items: Vec<ProfileRecord>,
    pub next: Option<CursorKey>,
}

/// Last evaluated primary key of a page
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CursorKey {
    pub pk: String,
    pub sk: String,
}

impl CursorKey {
    /// Opaque token handed to clients as `next`
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json))
    }

    pub fn decode(token: &str) -> Result<Self> {
        let invalid = || ServiceError::ValidationError("next is not a valid pagination token".into());
        let bytes = STANDARD.decode(token.trim()).map_err(|_| invalid())?;
        let cursor: CursorKey = serde_json::from_slice(&bytes).map_err(|_| invalid())?;

        // any other partition contradicts the query's key condition
        if cursor.pk != PROFILE_PARTITION {
            return Err(invalid());
        }
        Ok(cursor)
    }
}

/// ProfileStore trait defining the interface for profile storage implementations
#[async_trait]
pub trait ProfileStore: Send + Sync + 'static {
    /// Gets the profile owned by `owner_id`, if any
    async fn get_profile(&self, owner_id: &str) -> Result<Option<ProfileRecord>>;

    /// Writes the full record, replacing whatever is stored for its owner
    async fn put_profile(&self, record: ProfileRecord) -> Result<ProfileRecord>;

    /// Full overwrite that only succeeds while the stored record still carries
    /// `expected_updated_at`. Fails with `Conflict` otherwise.
    async fn replace_profile(
        &self,
        record: ProfileRecord,
        expected_updated_at: i64,
    ) -> Result<ProfileRecord>;

    /// One page of profiles in sort-key order
    async fn query_profiles(&self, query: ProfileQuery) -> Result<ProfilePage>;
}

/// Presentation order of a listed page: creation time, then display name,
/// then profile type.
pub fn sort_for_listing(items: &mut [ProfileRecord]) {
    items.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.display_name.cmp(&b.display_name))
            .then_with(|| a.profile_type.ordinal().cmp(&b.profile_type.ordinal()))
    });
}
