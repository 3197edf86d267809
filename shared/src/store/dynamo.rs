use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_item};
use std::collections::HashMap;

use super::{CursorKey, ProfilePage, ProfileQuery, ProfileStore};
use crate::config::TableConfig;
use crate::error::{map_dynamo_error, map_put_dynamo_error, map_query_dynamo_error, Result};
use crate::models::{ProfileRecord, PROFILE_PARTITION};

// Main table key attributes
const PK: &str = "pk";
const SK: &str = "sk";

/// DynamoDB store for profiles: partition key is the fixed `PROFILE` tag, sort
/// key the owner id.
pub struct DynamoProfileStore {
    client: Client,
    table_name: String,
}

impl DynamoProfileStore {
    pub async fn from_config(config: &TableConfig) -> Self {
        // Use the recommended defaults() function with latest behavior version
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        Self::with_client_and_table(Client::new(&sdk_config), config.table_name.clone())
    }

    /// Creates a new DynamoDB store with the specified client and table name.
    /// This is mainly useful for testing with a local DynamoDB instance.
    pub fn with_client_and_table(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    fn key(owner_id: &str) -> HashMap<String, AttributeValue> {
        HashMap::from([
            (PK.to_string(), AttributeValue::S(PROFILE_PARTITION.to_string())),
            (SK.to_string(), AttributeValue::S(owner_id.to_string())),
        ])
    }

    fn cursor_from_key(key: &HashMap<String, AttributeValue>) -> Option<CursorKey> {
        let pk = key.get(PK)?.as_s().ok()?;
        let sk = key.get(SK)?.as_s().ok()?;
        Some(CursorKey {
            pk: pk.clone(),
            sk: sk.clone(),
        })
    }
}

#[async_trait]
impl ProfileStore for DynamoProfileStore {
    async fn get_profile(&self, owner_id: &str) -> Result<Option<ProfileRecord>> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(owner_id)))
            .send()
            .await
            .map_err(|e| map_dynamo_error("get_item", e))?;

        match response.item() {
            Some(item) => Ok(Some(from_item(item.clone())?)),
            None => Ok(None),
        }
    }

    async fn put_profile(&self, record: ProfileRecord) -> Result<ProfileRecord> {
        let item = to_item(&record)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(map_put_dynamo_error)?;

        Ok(record)
    }

    async fn replace_profile(
        &self,
        record: ProfileRecord,
        expected_updated_at: i64,
    ) -> Result<ProfileRecord> {
        let item = to_item(&record)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("#updated_at = :expected")
            .expression_attribute_names("#updated_at", "updatedAt")
            .expression_attribute_values(
                ":expected",
                AttributeValue::N(expected_updated_at.to_string()),
            )
            .send()
            .await
            .map_err(map_put_dynamo_error)?;

        Ok(record)
    }

    async fn query_profiles(&self, query: ProfileQuery) -> Result<ProfilePage> {
        let mut request = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("#pk = :pk")
            .expression_attribute_names("#pk", PK)
            .expression_attribute_values(":pk", AttributeValue::S(PROFILE_PARTITION.to_string()))
            .limit(query.limit as i32);

        if let Some(profile_type) = query.profile_type {
            request = request
                .filter_expression("#profile_type = :profile_type")
                .expression_attribute_names("#profile_type", "profileType")
                .expression_attribute_values(
                    ":profile_type",
                    AttributeValue::S(profile_type.as_str().to_string()),
                );
        }

        if let Some(cursor) = &query.cursor {
            request = request.set_exclusive_start_key(Some(HashMap::from([
                (PK.to_string(), AttributeValue::S(cursor.pk.clone())),
                (SK.to_string(), AttributeValue::S(cursor.sk.clone())),
            ])));
        }

        let response = request.send().await.map_err(map_query_dynamo_error)?;

        let mut items = Vec::new();
        for item in response.items() {
            let record: ProfileRecord = from_item(item.clone())?;
            items.push(record);
        }

        let next = response.last_evaluated_key().and_then(Self::cursor_from_key);

        tracing::debug!(
            "Queried {} profiles (more: {})",
            items.len(),
            next.is_some()
        );

        Ok(ProfilePage { items, next })
    }
}
