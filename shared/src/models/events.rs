use serde::{Deserialize, Serialize};

use super::VariantSet;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageType {
    Profile,
}

/// Queue message asking for a profile's staged variants to be relocated
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelocationMessage {
    pub owner_id: String,
    pub image_type: ImageType,
    pub variants: VariantSet,
}

/// Alarm published on the notification topic
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AlarmMessage {
    pub source: String,
    pub payload: AlarmPayload,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AlarmPayload {
    pub message: String,
    pub details: String,
}

impl AlarmMessage {
    pub fn new(source: &str, message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            source: source.to_string(),
            payload: AlarmPayload {
                message: message.into(),
                details: details.into(),
            },
        }
    }
}
