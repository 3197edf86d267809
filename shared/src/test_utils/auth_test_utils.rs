use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::{AuthMode, Claims};

pub const TEST_USER_POOL_ID: &str = "eu-central-1_Pr0f1les";
pub const TEST_CLIENT_ID: &str = "5pgt5gkfulqs0tkdi279c895gp";

/// Auth mode matching the tokens produced by `create_jwt_token`
pub fn test_auth_mode() -> AuthMode {
    AuthMode::Cognito {
        user_pool_id: TEST_USER_POOL_ID.to_string(),
        client_id: TEST_CLIENT_ID.to_string(),
    }
}

/// Creates a JWT token for testing purposes
///
/// This function creates a Cognito-like JWT token for a specific user ID
/// which can be used in test authorization headers
pub fn create_jwt_token(user_id: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time is before Unix epoch")
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email_verified: Some(true),
        iss: format!(
            "https://cognito-idp.eu-central-1.amazonaws.com/{}",
            TEST_USER_POOL_ID
        ),
        cognito_username: Some(user_id.to_string()),
        origin_jti: None,
        aud: TEST_CLIENT_ID.to_string(),
        event_id: None,
        token_use: Some("id".to_string()),
        auth_time: Some(now - 100),
        exp: now + 3600,
        iat: now - 100,
        jti: None,
        email: Some(format!("{}@example.com", user_id)),
    };

    // Cognito signs with RS256; the gateway verifies, so any key works here
    let encoding_key = EncodingKey::from_secret(b"test_secret_key_for_jwt_encoding_in_tests");

    encode(&Header::new(Algorithm::HS256), &claims, &encoding_key).expect("Failed to create JWT")
}

/// Helper function to create an authorization header with a bearer token
pub fn create_auth_header(user_id: &str) -> (String, String) {
    let token = create_jwt_token(user_id);
    ("authorization".to_string(), format!("Bearer {}", token))
}

pub fn create_test_request(
    method: &str,
    path: &str,
    user_id: &str,
    body: Option<serde_json::Value>,
) -> http::Request<axum::body::Body> {
    let mut builder = http::Request::builder().method(method).uri(path);

    // Add authorization header with JWT
    let (auth_key, auth_value) = create_auth_header(user_id);
    builder = builder.header(auth_key, auth_value);

    // Add content type if there is a body
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }

    match body {
        Some(json_body) => builder
            .body(axum::body::Body::from(json_body.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    }
}

/// Authenticated request with a raw (possibly non-JSON) body
pub fn create_raw_request(
    method: &str,
    path: &str,
    user_id: &str,
    body: impl Into<axum::body::Body>,
) -> http::Request<axum::body::Body> {
    let (auth_key, auth_value) = create_auth_header(user_id);
    http::Request::builder()
        .method(method)
        .uri(path)
        .header(auth_key, auth_value)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}
