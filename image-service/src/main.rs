mod error;
mod extract;
mod handlers;
mod models;
mod routes;


use axum::{body::Body, extract::Request, response::Response, Router};
use lambda_http::{
    run, service_fn, Body as LambdaBody, Error, Request as LambdaRequest,
    Response as LambdaResponse,
};
use std::sync::Arc;
use tower::ServiceExt;

use handlers::ImageState;
use profiles_shared::auth::AuthMode;
use profiles_shared::config::{route_prefix_from_env, ImageLimits, StorageConfig};
use profiles_shared::images::{TemporaryStager, VariantDeriver};
use profiles_shared::storage::S3ObjectStorage;

// The Lambda handler function
async fn function_handler(
    app: Router,
    event: LambdaRequest,
) -> Result<LambdaResponse<LambdaBody>, Error> {
    tracing::info!(
        "Received Lambda request: method={:?}, path={:?}, query_params={:?}",
        event.method(),
        event.uri().path(),
        event.uri().query()
    );

    // Convert the Lambda event to an HTTP request for Axum
    let (parts, body) = event.into_parts();
    let body = match body {
        LambdaBody::Empty => Body::empty(),
        LambdaBody::Text(text) => {
            tracing::debug!("Request body (text): {} bytes", text.len());
            Body::from(text)
        }
        LambdaBody::Binary(data) => {
            tracing::debug!("Request body (binary): {} bytes", data.len());
            Body::from(data)
        }
    };

    let http_request = Request::from_parts(parts, body);

    let response = match app.oneshot(http_request).await {
        Ok(response) => {
            tracing::info!("Received response from Axum: status={}", response.status());
            response
        }
        Err(err) => {
            tracing::error!("Error from Axum router: {:?}", err);
            return Err(err.into());
        }
    };

    response_to_lambda(response).await
}

// Convert the Axum response to a format suitable for Lambda
async fn response_to_lambda(response: Response) -> Result<LambdaResponse<LambdaBody>, Error> {
    let (parts, body) = response.into_parts();

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!("Failed to read response body: {:?}", err);
            return Err(err.into());
        }
    };

    let builder = parts
        .headers
        .iter()
        .fold(LambdaResponse::builder().status(parts.status), |builder, (name, value)| {
            builder.header(name.as_str(), value.as_bytes())
        });

    let lambda_response = if bytes.is_empty() {
        builder.body(LambdaBody::Empty)?
    } else {
        builder.body(LambdaBody::Text(String::from_utf8_lossy(&bytes).into_owned()))?
    };

    Ok(lambda_response)
}

async fn build_router() -> Result<Router, Error> {
    let storage = StorageConfig::from_env()?;
    let limits = ImageLimits::from_env()?;
    let auth = AuthMode::from_env()?;
    let prefix = route_prefix_from_env()?;

    let state = Arc::new(ImageState {
        deriver: VariantDeriver::new(limits),
        stager: TemporaryStager::new(
            Arc::new(S3ObjectStorage::from_config(&storage).await),
            storage.layout.clone(),
        ),
    });

    tracing::info!(
        "Image service configured: bucket={}, image limit={} bytes, request limit={} bytes",
        storage.bucket_name,
        limits.max_image_bytes,
        limits.max_request_bytes
    );

    Ok(routes::create_router_with_state(
        state,
        auth,
        &prefix,
        limits.max_request_bytes,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let log_level =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,image_service=debug".into());

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_ansi(false) // Disable ANSI colors in Lambda environment
        .with_target(true)
        .init();

    if let Ok(function_name) = std::env::var("AWS_LAMBDA_FUNCTION_NAME") {
        tracing::info!(
            "Starting AWS Lambda function: {} (version: {})",
            function_name,
            std::env::var("AWS_LAMBDA_FUNCTION_VERSION").unwrap_or_else(|_| "unknown".into())
        );
    }

    let app = build_router().await?;

    run(service_fn(move |event: LambdaRequest| {
        let app = app.clone();
        async move { function_handler(app, event).await }
    }))
    .await
}
