use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct UploadImageRequest {
    /// Base64 encoded image bytes (standard alphabet)
    pub image: String,
}
