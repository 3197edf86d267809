use serde::Deserialize;

use profiles_shared::error::ServiceError;
use profiles_shared::images::KeyLayout;
use profiles_shared::models::{ProfileType, VariantSet};
use profiles_shared::store::{CursorKey, ProfileQuery, MAX_PAGE_SIZE};

// Request DTOs
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProfileRequest {
    pub profile_type: ProfileType,
    pub display_name: String,
    #[serde(default)]
    pub instagram_profile: Option<String>,
    #[serde(default)]
    pub profile_image: Option<VariantSet>,
}

impl CreateProfileRequest {
    /// Semantic checks beyond the shape enforced by deserialization
    pub fn validate(&self, owner_id: &str, layout: &KeyLayout) -> Result<(), ServiceError> {
        if self.display_name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "displayName must not be empty".to_string(),
            ));
        }

        if let Some(instagram) = &self.instagram_profile {
            if instagram.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "instagramProfile must not be empty when present".to_string(),
                ));
            }
        }

        if let Some(image) = &self.profile_image {
            image.validate().map_err(ServiceError::ValidationError)?;

            // relocation derives the permanent key from id and ext
            if let Some(foreign) = image.iter().find(|v| !layout.is_staged_for(owner_id, v)) {
                return Err(ServiceError::ValidationError(format!(
                    "profileImage key '{}' is not an upload of the caller",
                    foreign.key
                )));
            }

            let variants: Vec<_> = image.iter().collect();
            for (i, a) in variants.iter().enumerate() {
                if variants[i + 1..].iter().any(|b| a.key == b.key && a != b) {
                    return Err(ServiceError::ValidationError(format!(
                        "profileImage variants sharing key '{}' must be identical",
                        a.key
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Raw listing parameters, parsed by `into_query`
#[derive(Deserialize, Debug, Default)]
pub struct ListProfilesParams {
    #[serde(rename = "type")]
    pub profile_type: Option<String>,
    pub limit: Option<String>,
    pub next: Option<String>,
}

impl ListProfilesParams {
    pub fn into_query(self) -> Result<ProfileQuery, ServiceError> {
        let profile_type = match self.profile_type {
            Some(raw) => Some(
                raw.parse::<ProfileType>()
                    .map_err(|e| ServiceError::ValidationError(format!("type: {}", e)))?,
            ),
            None => None,
        };

        let limit = match self.limit {
            Some(raw) => match raw.parse::<usize>() {
                Ok(limit) if (1..=MAX_PAGE_SIZE).contains(&limit) => limit,
                _ => {
                    return Err(ServiceError::ValidationError(format!(
                        "limit must be an integer between 1 and {}",
                        MAX_PAGE_SIZE
                    )))
                }
            },
            None => MAX_PAGE_SIZE,
        };

        let cursor = match self.next {
            Some(token) => Some(CursorKey::decode(&token)?),
            None => None,
        };

        Ok(ProfileQuery {
            profile_type,
            limit,
            cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profiles_shared::models::VariantRef;

    fn layout() -> KeyLayout {
        KeyLayout::new("res", "temp", "images").unwrap()
    }

    fn variant(id: &str, ext: &str) -> VariantRef {
        VariantRef {
            id: id.to_string(),
            key: layout().temp_key("owner", id, ext),
            ext: ext.to_string(),
            width: 10,
            height: 10,
        }
    }

    fn request(image: VariantSet) -> CreateProfileRequest {
        CreateProfileRequest {
            profile_type: ProfileType::Photo,
            display_name: "Photographer".to_string(),
            instagram_profile: None,
            profile_image: Some(image),
        }
    }

    #[test]
    fn test_webp_upload_may_share_original_as_preview() {
        let orig = variant("orig", "webp");
        let image = VariantSet {
            prvw: orig.clone(),
            orig,
            thmb: variant("thmb", "webp"),
        };
        assert!(request(image).validate("owner", &layout()).is_ok());
    }

    #[test]
    fn test_shared_key_with_different_dimensions_is_rejected() {
        let orig = variant("orig", "webp");
        let mut prvw = orig.clone();
        prvw.width = 20;
        let image = VariantSet {
            prvw,
            orig,
            thmb: variant("thmb", "webp"),
        };
        let err = request(image).validate("owner", &layout()).unwrap_err();
        assert!(err.to_string().contains("must be identical"));
    }

    #[test]
    fn test_key_must_be_derived_from_id() {
        let mut thmb = variant("thmb", "webp");
        thmb.id = "other".to_string();
        let image = VariantSet {
            prvw: variant("prvw", "webp"),
            orig: variant("orig", "png"),
            thmb,
        };
        assert!(request(image).validate("owner", &layout()).is_err());
    }

    #[test]
    fn test_list_params_defaults() {
        let query = ListProfilesParams::default().into_query().unwrap();
        assert_eq!(query.limit, 50);
        assert!(query.profile_type.is_none());
        assert!(query.cursor.is_none());
    }

    #[test]
    fn test_list_params_reject_out_of_range_limit() {
        for raw in ["0", "51", "-1", "ten"] {
            let params = ListProfilesParams {
                limit: Some(raw.to_string()),
                ..ListProfilesParams::default()
            };
            assert!(params.into_query().is_err(), "limit {} accepted", raw);
        }
    }

    #[test]
    fn test_list_params_reject_unknown_type() {
        let params = ListProfilesParams {
            profile_type: Some("TEST".to_string()),
            ..ListProfilesParams::default()
        };
        let err = params.into_query().unwrap_err();
        assert!(err.to_string().contains("not found in enum"));
    }
}
