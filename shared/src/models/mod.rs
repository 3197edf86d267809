use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod events;

/// Partition key value shared by every profile item in the main table.
pub const PROFILE_PARTITION: &str = "PROFILE";

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProfileType {
    Model,
    Photo,
    Brand,
}

impl ProfileType {
    pub const ALL: [ProfileType; 3] = [ProfileType::Model, ProfileType::Photo, ProfileType::Brand];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Model => "MODEL",
            ProfileType::Photo => "PHOTO",
            ProfileType::Brand => "BRAND",
        }
    }

    /// Position used when ordering listings.
    pub fn ordinal(&self) -> usize {
        match self {
            ProfileType::Model => 0,
            ProfileType::Photo => 1,
            ProfileType::Brand => 2,
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfileType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| {
                format!(
                    "instance value (\"{}\") not found in enum (possible values: [\"MODEL\",\"PHOTO\",\"BRAND\"])",
                    s
                )
            })
    }
}

// Parsed through FromStr so request and table values share one error message
impl<'de> Deserialize<'de> for ProfileType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One derived rendition of an uploaded image.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VariantRef {
    pub id: String,
    pub key: String,
    pub ext: String,
    pub width: u32,
    pub height: u32,
}

impl VariantRef {
    /// Checks the shape invariants of a reference received from a client.
    pub fn validate(&self, name: &str) -> Result<(), String> {
        if self.id.is_empty() {
            return Err(format!("{}.id must not be empty", name));
        }
        if self.ext.is_empty() || self.ext.contains('/') || self.ext.contains('.') {
            return Err(format!("{}.ext '{}' is not a valid format token", name, self.ext));
        }
        if !self.key.ends_with(&format!(".{}", self.ext)) {
            return Err(format!("{}.key must end with '.{}'", name, self.ext));
        }
        if self.width == 0 || self.height == 0 {
            return Err(format!("{}.width and {}.height must be positive", name, name));
        }
        Ok(())
    }
}

/// The three named variants of a profile image.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VariantSet {
    pub prvw: VariantRef,
    pub orig: VariantRef,
    pub thmb: VariantRef,
}

impl VariantSet {
    pub fn validate(&self) -> Result<(), String> {
        self.prvw.validate("prvw")?;
        self.orig.validate("orig")?;
        self.thmb.validate("thmb")?;
        Ok(())
    }

    /// Variants backed by a distinct stored object. The preview is skipped when
    /// it is the original itself.
    pub fn distinct(&self) -> Vec<&VariantRef> {
        let mut variants = vec![&self.orig];
        if self.prvw.key != self.orig.key {
            variants.push(&self.prvw);
        }
        if self.thmb.key != self.orig.key && self.thmb.key != self.prvw.key {
            variants.push(&self.thmb);
        }
        variants
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantRef> {
        [&self.prvw, &self.orig, &self.thmb].into_iter()
    }

    /// Returns a copy with every key rewritten by `f`; ids, formats and
    /// dimensions are preserved.
    pub fn map_keys<F>(&self, mut f: F) -> VariantSet
    where
        F: FnMut(&VariantRef) -> String,
    {
        let mut rekey = |v: &VariantRef| VariantRef {
            key: f(v),
            ..v.clone()
        };
        VariantSet {
            prvw: rekey(&self.prvw),
            orig: rekey(&self.orig),
            thmb: rekey(&self.thmb),
        }
    }
}

/// Profile item as stored in the main table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub pk: String,
    /// Owner id (the authenticated subject)
    pub sk: String,
    pub email: String,
    pub profile_type: ProfileType,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<VariantSet>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ProfileRecord {
    pub fn owner_id(&self) -> &str {
        &self.sk
    }

    /// Bumps `updated_at`, keeping it strictly increasing even when the clock
    /// has not moved since the previous mutation.
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at + 1);
    }
}

// Response DTOs for general use across services
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub profile_type: ProfileType,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<VariantSet>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<ProfileRecord> for ProfileResponse {
    fn from(record: ProfileRecord) -> Self {
        Self {
            id: record.sk,
            email: record.email,
            profile_type: record.profile_type,
            display_name: record.display_name,
            instagram_profile: record.instagram_profile,
            profile_image: record.profile_image,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ProfilesResponse {
    pub items: Vec<ProfileResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub message: String,
}

// Helper function to get current timestamp in epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
