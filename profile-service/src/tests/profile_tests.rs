use axum::{body::Body, http::StatusCode, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use profiles_shared::config::DEFAULT_ROUTE_PREFIX;
use profiles_shared::images::KeyLayout;
use profiles_shared::models::{ProfileRecord, ProfileType, VariantRef, VariantSet, PROFILE_PARTITION};
use profiles_shared::store::{DynamoProfileStore, ProfileStore};
use profiles_shared::test_utils::auth_test_utils::{
    create_raw_request, create_test_request, test_auth_mode,
};
use profiles_shared::test_utils::dynamo_test_utils::{
    clear_dynamo_table, create_dynamo_client, create_profile_table, use_dynamodb,
};
use profiles_shared::test_utils::http_test_utils::{location_header, response_to_json};
use profiles_shared::test_utils::mock_profile_store::MockProfileStore;
use profiles_shared::test_utils::mock_queue::MockRelocationQueue;
use profiles_shared::test_utils::test_logging::init_test_logging;

use crate::handlers::AppState;
use crate::routes;

// Constants for DynamoDB tests
const TEST_TABLE_NAME: &str = "profile-service-test-table";
const OWNER: &str = "56a20244-0061-708a-0441-62c42ace7b39";

struct TestApp {
    router: Router,
    store: Arc<dyn ProfileStore>,
    queue: Arc<MockRelocationQueue>,
}

fn layout() -> KeyLayout {
    KeyLayout::new("res", "temp", "images").unwrap()
}

// Helper for setting up test router with appropriate store
async fn create_test_app() -> TestApp {
    init_test_logging();

    let store: Arc<dyn ProfileStore> = if use_dynamodb() {
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
    };
    let queue = Arc::new(MockRelocationQueue::new());

    let state = Arc::new(AppState {
        store: store.clone(),
        queue: queue.clone(),
        layout: layout(),
        route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
    });

    TestApp {
        router: routes::create_router_with_state(state, test_auth_mode()),
        store,
        queue,
    }
}

fn path(suffix: &str) -> String {
    format!("{}{}", DEFAULT_ROUTE_PREFIX, suffix)
}

fn staged_variant(owner: &str, id: &str, ext: &str, width: u32, height: u32) -> VariantRef {
    VariantRef {
        id: id.to_string(),
        key: layout().temp_key(owner, id, ext),
        ext: ext.to_string(),
        width,
        height,
    }
}

fn staged_image(owner: &str) -> VariantSet {
    VariantSet {
        prvw: staged_variant(owner, "prvw-id", "webp", 612, 408),
        orig: staged_variant(owner, "orig-id", "jpeg", 612, 408),
        thmb: staged_variant(owner, "thmb-id", "webp", 200, 133),
    }
}

fn record(owner: &str, name: &str, profile_type: ProfileType, created_at: i64) -> ProfileRecord {
    ProfileRecord {
        pk: PROFILE_PARTITION.to_string(),
        sk: owner.to_string(),
        email: format!("{}@test.co", owner),
        profile_type,
        display_name: name.to_string(),
        instagram_profile: None,
        profile_image: None,
        created_at,
        updated_at: created_at,
    }
}

#[tokio::test]
async fn test_create_profile_without_image() {
    let app = create_test_app().await;

    let body = json!({
        "profileType": "MODEL",
        "displayName": "Jane",
        "instagramProfile": "https://instagram.com/jane"
    });
    let response = app
        .router
        .clone()
        .oneshot(create_test_request("POST", &path("/profiles"), OWNER, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        location_header(&response).unwrap(),
        format!("/api/v1/profiles/{}", OWNER)
    );

    let json = response_to_json(response).await;
    assert_eq!(json["id"], OWNER);
    assert_eq!(json["email"], format!("{}@example.com", OWNER));
    assert_eq!(json["profileType"], "MODEL");
    assert_eq!(json["displayName"], "Jane");
    assert!(json.get("profileImage").is_none());
    assert_eq!(json["createdAt"], json["updatedAt"]);

    assert!(app.queue.messages().is_empty());
    assert!(app.store.get_profile(OWNER).await.unwrap().is_some());
}

#[tokio::test]
async fn test_create_profile_with_image_enqueues_relocation() {
    let app = create_test_app().await;
    let image = staged_image(OWNER);

    let body = json!({
        "profileType": "PHOTO",
        "displayName": "Studio",
        "profileImage": image
    });
    let response = app
        .router
        .clone()
        .oneshot(create_test_request("POST", &path("/profiles"), OWNER, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = response_to_json(response).await;
    assert_eq!(json["profileImage"]["orig"]["key"], image.orig.key);

    let messages = app.queue.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].owner_id, OWNER);
    assert_eq!(messages[0].variants, image);

    let stored = app.store.get_profile(OWNER).await.unwrap().unwrap();
    assert_eq!(stored.profile_image, Some(image));
}

#[tokio::test]
async fn test_create_profile_rejects_invalid_bodies() {
    let app = create_test_app().await;

    let cases = vec![
        // missing displayName
        json!({ "profileType": "MODEL" }),
        // unknown field
        json!({ "profileType": "MODEL", "displayName": "A", "age": 30 }),
        // blank display name
        json!({ "profileType": "MODEL", "displayName": "   " }),
        // variant with an extra attribute
        json!({
            "profileType": "MODEL",
            "displayName": "A",
            "profileImage": {
                "prvw": { "id": "p", "key": "/res/temp/x/p.webp", "ext": "webp", "width": 1, "height": 1, "size": 3 },
                "orig": { "id": "p", "key": "/res/temp/x/p.webp", "ext": "webp", "width": 1, "height": 1 },
                "thmb": { "id": "t", "key": "/res/temp/x/t.webp", "ext": "webp", "width": 1, "height": 1 }
            }
        }),
    ];

    for body in cases {
        let response = app
            .router
            .clone()
            .oneshot(create_test_request("POST", &path("/profiles"), OWNER, Some(body.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "accepted {}", body);
        let json = response_to_json(response).await;
        assert!(json["message"].is_string());
    }

    assert!(app.queue.messages().is_empty());
}

#[tokio::test]
async fn test_create_profile_reports_bad_enum_value() {
    let app = create_test_app().await;

    let body = json!({ "profileType": "TEST", "displayName": "A" });
    let response = app
        .router
        .clone()
        .oneshot(create_test_request("POST", &path("/profiles"), OWNER, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_to_json(response).await;
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("not found in enum"));
}

#[tokio::test]
async fn test_create_profile_rejects_foreign_image_keys() {
    let app = create_test_app().await;

    let body = json!({
        "profileType": "BRAND",
        "displayName": "Brand",
        "profileImage": staged_image("someone-else")
    });
    let response = app
        .router
        .clone()
        .oneshot(create_test_request("POST", &path("/profiles"), OWNER, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.store.get_profile(OWNER).await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_profile_rejects_key_not_matching_id() {
    let app = create_test_app().await;

    // preview claims its own id but points at the original's object
    let mut image = staged_image(OWNER);
    image.prvw = VariantRef {
        id: "another-id".to_string(),
        ..image.orig.clone()
    };

    let body = json!({
        "profileType": "MODEL",
        "displayName": "Model",
        "profileImage": image
    });
    let response = app
        .router
        .clone()
        .oneshot(create_test_request("POST", &path("/profiles"), OWNER, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_to_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("profileImage key"));
    assert!(app.store.get_profile(OWNER).await.unwrap().is_none());
    assert!(app.queue.messages().is_empty());
}

#[tokio::test]
async fn test_create_profile_rejects_malformed_json() {
    let app = create_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(create_raw_request("POST", &path("/profiles"), OWNER, "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_queue_failure_is_a_server_error() {
    let app = create_test_app().await;
    app.queue.set_fail(true);

    let body = json!({
        "profileType": "PHOTO",
        "displayName": "Studio",
        "profileImage": staged_image(OWNER)
    });
    let response = app
        .router
        .clone()
        .oneshot(create_test_request("POST", &path("/profiles"), OWNER, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = response_to_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("SQS send_message"));
}

#[tokio::test]
async fn test_get_my_profile() {
    let app = create_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(create_test_request("GET", &path("/profiles/me"), OWNER, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = response_to_json(response).await;
    assert_eq!(json["message"], "Resource does not exist");

    app.store
        .put_profile(record(OWNER, "Me", ProfileType::Model, 1))
        .await
        .unwrap();

    let response = app
        .router
        .clone()
        .oneshot(create_test_request("GET", &path("/profiles/me"), OWNER, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_to_json(response).await;
    assert_eq!(json["id"], OWNER);
    assert_eq!(json["displayName"], "Me");
}

#[tokio::test]
async fn test_get_profile_by_id() {
    let app = create_test_app().await;
    app.store
        .put_profile(record("other-owner", "Other", ProfileType::Brand, 1))
        .await
        .unwrap();

    let response = app
        .router
        .clone()
        .oneshot(create_test_request("GET", &path("/profiles/other-owner"), OWNER, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_to_json(response).await;
    assert_eq!(json["profileType"], "BRAND");

    let response = app
        .router
        .clone()
        .oneshot(create_test_request("GET", &path("/profiles/nobody"), OWNER, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_profiles_sorted_and_filtered() {
    let app = create_test_app().await;
    for profile in [
        record("a", "Zed", ProfileType::Model, 3),
        record("b", "Amy", ProfileType::Brand, 1),
        record("c", "Amy", ProfileType::Model, 1),
        record("d", "Bob", ProfileType::Photo, 2),
    ] {
        app.store.put_profile(profile).await.unwrap();
    }

    let response = app
        .router
        .clone()
        .oneshot(create_test_request("GET", &path("/profiles"), OWNER, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_to_json(response).await;
    let ids: Vec<&str> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["c", "b", "d", "a"]);
    assert!(json.get("next").is_none());

    let response = app
        .router
        .clone()
        .oneshot(create_test_request("GET", &path("/profiles?type=MODEL"), OWNER, None))
        .await
        .unwrap();
    let json = response_to_json(response).await;
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item["profileType"] == "MODEL"));
}

#[tokio::test]
async fn test_list_profiles_paginates() {
    let app = create_test_app().await;
    for owner in ["p1", "p2", "p3"] {
        app.store
            .put_profile(record(owner, owner, ProfileType::Photo, 1))
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    let mut uri = path("/profiles?limit=2");
    loop {
        let response = app
            .router
            .clone()
            .oneshot(create_test_request("GET", &uri, OWNER, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = response_to_json(response).await;
        for item in json["items"].as_array().unwrap() {
            seen.push(item["id"].as_str().unwrap().to_string());
        }
        match json["next"].as_str() {
            Some(next) => {
                let encoded: String = next
                    .chars()
                    .map(|c| match c {
                        '+' => "%2B".to_string(),
                        '/' => "%2F".to_string(),
                        '=' => "%3D".to_string(),
                        other => other.to_string(),
                    })
                    .collect();
                uri = path(&format!("/profiles?limit=2&next={}", encoded));
            }
            None => break,
        }
    }

    assert_eq!(seen, vec!["p1", "p2", "p3"]);
}

#[tokio::test]
async fn test_list_profiles_rejects_bad_params() {
    let app = create_test_app().await;

    // the last token decodes to a key of another partition
    for query in [
        "limit=0",
        "limit=100",
        "type=TEST",
        "next=%25%25%25",
        "next=eyJwayI6IkJPWCIsInNrIjoib3duZXItMSJ9",
    ] {
        let response = app
            .router
            .clone()
            .oneshot(create_test_request(
                "GET",
                &path(&format!("/profiles?{}", query)),
                OWNER,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "accepted {}", query);
    }
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let app = create_test_app().await;

    let request = axum::http::Request::builder()
        .uri(path("/profiles/me"))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = response_to_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("Unauthorized"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = create_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(create_test_request("GET", "/api/v2/profiles", OWNER, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
