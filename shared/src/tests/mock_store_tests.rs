use std::sync::Arc;

use crate::error::ServiceError;
use crate::models::{now_millis, ProfileRecord, ProfileType, PROFILE_PARTITION};
use crate::store::dynamo::DynamoProfileStore;
use crate::store::{ProfileQuery, ProfileStore};
use crate::test_utils::dynamo_test_utils::{
    clear_dynamo_table, create_dynamo_client, create_profile_table, use_dynamodb,
};
use crate::test_utils::mock_profile_store::MockProfileStore;
use crate::test_utils::test_logging::init_test_logging;

const TEST_TABLE_NAME: &str = "profiles-store-test-table";

fn record(owner_id: &str, profile_type: ProfileType) -> ProfileRecord {
    let now = now_millis();
    ProfileRecord {
        pk: PROFILE_PARTITION.to_string(),
        sk: owner_id.to_string(),
        email: format!("{}@test.co", owner_id),
        profile_type,
        display_name: format!("Display {}", owner_id),
        instagram_profile: Some(format!("https://instagram.com/{}", owner_id)),
        profile_image: None,
        created_at: now,
        updated_at: now,
    }
}

// Mock store by default, local DynamoDB when USE_DYNAMODB=true
async fn create_test_store() -> Arc<dyn ProfileStore> {
    init_test_logging();

    if use_dynamodb() {
        let client = create_dynamo_client().await;
        if let Err(e) = create_profile_table(&client, TEST_TABLE_NAME).await {
            eprintln!("Error setting up test table: {}", e);
        }
        clear_dynamo_table(&client, TEST_TABLE_NAME).await;
        Arc::new(DynamoProfileStore::with_client_and_table(
            client,
            TEST_TABLE_NAME.to_string(),
        ))
    } else {
        Arc::new(MockProfileStore::new())
    }
}

#[tokio::test]
async fn test_put_and_get_profile() {
    let store = create_test_store().await;

    assert!(store.get_profile("owner-1").await.unwrap().is_none());

    let created = store
        .put_profile(record("owner-1", ProfileType::Model))
        .await
        .unwrap();
    let fetched = store.get_profile("owner-1").await.unwrap().unwrap();
    assert_eq!(fetched, created);

    // upsert replaces the whole record
    let mut changed = created.clone();
    changed.display_name = "Renamed".to_string();
    changed.instagram_profile = None;
    store.put_profile(changed).await.unwrap();

    let fetched = store.get_profile("owner-1").await.unwrap().unwrap();
    assert_eq!(fetched.display_name, "Renamed");
    assert_eq!(fetched.instagram_profile, None);
}

#[tokio::test]
async fn test_replace_profile_detects_concurrent_change() {
    let store = create_test_store().await;
    let stored = store
        .put_profile(record("owner-2", ProfileType::Photo))
        .await
        .unwrap();

    let mut first = stored.clone();
    first.touch();
    store
        .replace_profile(first.clone(), stored.updated_at)
        .await
        .unwrap();

    // second writer still expects the old timestamp
    let mut second = stored.clone();
    second.display_name = "Stale".to_string();
    second.touch();
    let result = store.replace_profile(second, stored.updated_at).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));

    let fetched = store.get_profile("owner-2").await.unwrap().unwrap();
    assert_eq!(fetched, first);
}

#[tokio::test]
async fn test_query_profiles_pages_with_cursor() {
    let store = create_test_store().await;
    for owner in ["a", "b", "c", "d", "e"] {
        store
            .put_profile(record(owner, ProfileType::Brand))
            .await
            .unwrap();
    }

    let first = store
        .query_profiles(ProfileQuery {
            limit: 2,
            ..ProfileQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(first.items.len(), 2);
    let cursor = first.next.expect("first page should have a cursor");

    let mut seen: Vec<String> = first.items.iter().map(|r| r.sk.clone()).collect();
    let mut next = Some(cursor);
    while let Some(cursor) = next {
        let page = store
            .query_profiles(ProfileQuery {
                limit: 2,
                cursor: Some(cursor),
                ..ProfileQuery::default()
            })
            .await
            .unwrap();
        seen.extend(page.items.iter().map(|r| r.sk.clone()));
        next = page.next;
    }

    assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);
}

#[tokio::test]
async fn test_query_profiles_filters_by_type() {
    let store = create_test_store().await;
    store.put_profile(record("m1", ProfileType::Model)).await.unwrap();
    store.put_profile(record("p1", ProfileType::Photo)).await.unwrap();
    store.put_profile(record("m2", ProfileType::Model)).await.unwrap();

    let page = store
        .query_profiles(ProfileQuery {
            profile_type: Some(ProfileType::Model),
            ..ProfileQuery::default()
        })
        .await
        .unwrap();

    let owners: Vec<&str> = page.items.iter().map(|r| r.owner_id()).collect();
    assert_eq!(owners, vec!["m1", "m2"]);
    assert!(page.next.is_none());
}
