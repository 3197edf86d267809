use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, ServiceError};
use crate::models::{ProfileRecord, PROFILE_PARTITION};
use crate::store::{CursorKey, ProfilePage, ProfileQuery, ProfileStore};

/// MockProfileStore is a simple in-memory implementation of ProfileStore for testing.
///
/// Records are kept in sort-key order and paged like a DynamoDB query: the
/// limit counts evaluated items, the type filter applies afterwards.
pub struct MockProfileStore {
    profiles: Mutex<BTreeMap<String, ProfileRecord>>,
    conflict_on_replace: AtomicBool,
}

impl MockProfileStore {
    /// Create a new empty MockProfileStore
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(BTreeMap::new()),
            conflict_on_replace: AtomicBool::new(false),
        }
    }

    /// Create a MockProfileStore with initial test data
    pub fn with_data(records: Vec<ProfileRecord>) -> Self {
        let store = Self::new();
        {
            let mut profiles = store.profiles.lock().unwrap();
            for record in records {
                profiles.insert(record.sk.clone(), record);
            }
        }
        store
    }

    /// Snapshot of a stored record
    pub fn profile(&self, owner_id: &str) -> Option<ProfileRecord> {
        self.profiles.lock().unwrap().get(owner_id).cloned()
    }

    /// Seeds a record without going through the async trait
    pub fn put_profile_sync(&self, record: ProfileRecord) -> ProfileRecord {
        self.profiles
            .lock()
            .unwrap()
            .insert(record.sk.clone(), record.clone());
        record
    }

    /// Makes every conditional replace lose its race, as if another writer
    /// touched the record in between
    pub fn set_conflict_on_replace(&self, conflict: bool) {
        self.conflict_on_replace.store(conflict, Ordering::SeqCst);
    }

    pub fn remove(&self, owner_id: &str) -> Option<ProfileRecord> {
        self.profiles.lock().unwrap().remove(owner_id)
    }
}

impl Default for MockProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for MockProfileStore {
    async fn get_profile(&self, owner_id: &str) -> Result<Option<ProfileRecord>> {
        Ok(self.profile(owner_id))
    }

    async fn put_profile(&self, record: ProfileRecord) -> Result<ProfileRecord> {
        self.profiles
            .lock()
            .unwrap()
            .insert(record.sk.clone(), record.clone());
        Ok(record)
    }

    async fn replace_profile(
        &self,
        record: ProfileRecord,
        expected_updated_at: i64,
    ) -> Result<ProfileRecord> {
        let mut profiles = self.profiles.lock().unwrap();
        let conflict = self.conflict_on_replace.load(Ordering::SeqCst);
        match profiles.get(&record.sk) {
            Some(existing) if !conflict && existing.updated_at == expected_updated_at => {
                profiles.insert(record.sk.clone(), record.clone());
                Ok(record)
            }
            _ => Err(ServiceError::Conflict(
                "Item was modified concurrently".to_string(),
            )),
        }
    }

    async fn query_profiles(&self, query: ProfileQuery) -> Result<ProfilePage> {
        let profiles = self.profiles.lock().unwrap();

        let after = query.cursor.as_ref().map(|cursor| cursor.sk.clone());
        let mut remaining = profiles
            .values()
            .filter(|record| match &after {
                Some(sk) => record.sk.as_str() > sk.as_str(),
                None => true,
            })
            .peekable();

        let mut evaluated = Vec::new();
        while evaluated.len() < query.limit {
            match remaining.next() {
                Some(record) => evaluated.push(record.clone()),
                None => break,
            }
        }

        let next = match (remaining.peek(), evaluated.last()) {
            (Some(_), Some(last)) => Some(CursorKey {
                pk: PROFILE_PARTITION.to_string(),
                sk: last.sk.clone(),
            }),
            _ => None,
        };

        let items = evaluated
            .into_iter()
            .filter(|record| match query.profile_type {
                Some(profile_type) => record.profile_type == profile_type,
                None => true,
            })
            .collect();

        Ok(ProfilePage { items, next })
    }
}
