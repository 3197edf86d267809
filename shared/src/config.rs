//! Start-up configuration.
//!
//! Every Lambda builds the pieces it needs once, from the environment, and hands
//! them to its components explicitly. Nothing here is read again after start-up.

use std::env;
use thiserror::Error;

use crate::auth::{check_subject, AuthMode, TestUser};
use crate::images::keys::KeyLayout;

pub const DEFAULT_CDN_PREFIX: &str = "res";
pub const DEFAULT_TEMP_PREFIX: &str = "temp";
pub const DEFAULT_IMAGES_PREFIX: &str = "images";
pub const DEFAULT_ROUTE_PREFIX: &str = "/api/v1";

/// Decoded image size limit (1 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 1024 * 1024;
/// Raw request size accepted by the gateway (10 MiB)
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 200;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name.to_string())),
    }
}

fn optional(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_number<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
                name: name.to_string(),
                reason: format!("'{}' is not a valid number", raw),
            })
        }
        _ => Ok(default),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableConfig {
    pub table_name: String,
}

impl TableConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            table_name: required("TABLE_NAME")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StorageConfig {
    pub bucket_name: String,
    pub layout: KeyLayout,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bucket_name: required("BUCKET_NAME")?,
            layout: key_layout_from_env()?,
        })
    }
}

/// Bucket key layout alone, for services that only validate keys
pub fn key_layout_from_env() -> Result<KeyLayout> {
    KeyLayout::new(
        &optional("CDN_PREFIX", DEFAULT_CDN_PREFIX),
        &optional("S3_TEMP_PREFIX", DEFAULT_TEMP_PREFIX),
        &optional("S3_IMAGES_PREFIX", DEFAULT_IMAGES_PREFIX),
    )
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueueConfig {
    pub queue_url: String,
}

impl QueueConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            queue_url: required("QUEUE_URL")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlarmConfig {
    pub topic_arn: String,
}

impl AlarmConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            topic_arn: required("TOPIC_ARN")?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageLimits {
    pub max_image_bytes: usize,
    pub max_request_bytes: usize,
    pub thumbnail_size: u32,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        }
    }
}

impl ImageLimits {
    pub fn from_env() -> Result<Self> {
        let limits = Self {
            max_image_bytes: parse_number("IMAGE_SIZE_LIMIT_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
            max_request_bytes: parse_number("REQUEST_SIZE_LIMIT_BYTES", DEFAULT_MAX_REQUEST_BYTES)?,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        };

        if limits.max_image_bytes == 0 || limits.max_image_bytes > limits.max_request_bytes {
            return Err(ConfigError::Invalid {
                name: "IMAGE_SIZE_LIMIT_BYTES".to_string(),
                reason: format!(
                    "must be between 1 and the request limit ({} bytes)",
                    limits.max_request_bytes
                ),
            });
        }

        Ok(limits)
    }
}

impl AuthMode {
    /// `AUTH_MODE=mock` selects the fixed test identity, anything else the
    /// Cognito user pool.
    pub fn from_env() -> Result<Self> {
        match optional("AUTH_MODE", "cognito").to_lowercase().as_str() {
            "mock" => {
                let sub = required("MOCK_USER_SUB")?;
                check_subject(&sub).map_err(|_| ConfigError::Invalid {
                    name: "MOCK_USER_SUB".to_string(),
                    reason: "only ASCII letters, digits, '-' and '_' are allowed".to_string(),
                })?;
                Ok(AuthMode::Mock {
                    test_user: TestUser {
                        sub,
                        email: required("MOCK_USER_EMAIL")?,
                    },
                })
            }
            "cognito" => Ok(AuthMode::Cognito {
                user_pool_id: required("USER_POOL_ID")?,
                client_id: required("USER_POOL_CLIENT_ID")?,
            }),
            other => Err(ConfigError::Invalid {
                name: "AUTH_MODE".to_string(),
                reason: format!("unknown mode '{}'", other),
            }),
        }
    }
}

/// Path every HTTP route is nested under.
pub fn route_prefix_from_env() -> Result<String> {
    let prefix = optional("ROUTE_PREFIX", DEFAULT_ROUTE_PREFIX);
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if !trimmed.starts_with('/') {
        return Err(ConfigError::Invalid {
            name: "ROUTE_PREFIX".to_string(),
            reason: "must start with '/'".to_string(),
        });
    }
    Ok(trimmed.to_string())
}
