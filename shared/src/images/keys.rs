use crate::config::ConfigError;
use crate::models::VariantRef;

/// Object key layout of the assets bucket.
///
/// Keys handed to clients are root-relative CDN paths with a leading `/`:
/// `/{cdn}/{temp}/{owner}/{id}.{ext}` while staged and
/// `/{cdn}/{images}/{owner}/{id}.{ext}` once relocated. The bucket itself stores
/// the same path without the leading separator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyLayout {
    cdn_prefix: String,
    temp_prefix: String,
    images_prefix: String,
}

fn check_segment(name: &str, value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() || value.contains('/') {
        return Err(ConfigError::Invalid {
            name: name.to_string(),
            reason: format!("'{}' must be a single non-empty path segment", value),
        });
    }
    Ok(value.to_string())
}

impl KeyLayout {
    pub fn new(cdn_prefix: &str, temp_prefix: &str, images_prefix: &str) -> Result<Self, ConfigError> {
        let layout = Self {
            cdn_prefix: check_segment("CDN_PREFIX", cdn_prefix)?,
            temp_prefix: check_segment("S3_TEMP_PREFIX", temp_prefix)?,
            images_prefix: check_segment("S3_IMAGES_PREFIX", images_prefix)?,
        };

        if layout.temp_prefix == layout.images_prefix {
            return Err(ConfigError::Invalid {
                name: "S3_IMAGES_PREFIX".to_string(),
                reason: "must differ from S3_TEMP_PREFIX".to_string(),
            });
        }

        Ok(layout)
    }

    /// `/{cdn}/{temp}/{owner}/`
    pub fn temp_owner_prefix(&self, owner_id: &str) -> String {
        format!("/{}/{}/{}/", self.cdn_prefix, self.temp_prefix, owner_id)
    }

    /// `/{cdn}/{images}/{owner}/`
    pub fn permanent_owner_prefix(&self, owner_id: &str) -> String {
        format!("/{}/{}/{}/", self.cdn_prefix, self.images_prefix, owner_id)
    }

    pub fn temp_key(&self, owner_id: &str, id: &str, ext: &str) -> String {
        format!("{}{}.{}", self.temp_owner_prefix(owner_id), id, ext)
    }

    pub fn permanent_key(&self, owner_id: &str, id: &str, ext: &str) -> String {
        format!("{}{}.{}", self.permanent_owner_prefix(owner_id), id, ext)
    }

    /// Permanent key for a variant, preserving its id and format
    pub fn permanent_key_for(&self, owner_id: &str, variant: &VariantRef) -> String {
        self.permanent_key(owner_id, &variant.id, &variant.ext)
    }

    pub fn is_staged_for(&self, owner_id: &str, variant: &VariantRef) -> bool {
        variant.key == self.temp_key(owner_id, &variant.id, &variant.ext)
    }
}

/// Bucket key for a CDN path (drops the leading separator)
pub fn object_key(key: &str) -> &str {
    key.trim_start_matches('/')
}

pub fn content_type(ext: &str) -> String {
    format!("image/{}", ext)
}
