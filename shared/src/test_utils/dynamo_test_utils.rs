use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, KeySchemaElement, KeyType, ProvisionedThroughput,
    ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;
use std::error::Error;
// Use log macros, but ensure test_logging::init_test_logging() is called in test files
use log::{debug, error, info};

/// # DynamoDB test utilities
///
/// These utilities help set up and manage the profile table against a local
/// DynamoDB (`USE_DYNAMODB=true`, endpoint `http://localhost:8000`).
///
/// ## Example
/// ```rust,ignore
/// use profiles_shared::test_utils::test_logging::init_test_logging;
/// use profiles_shared::test_utils::dynamo_test_utils;
///
/// #[tokio::test]
/// async fn my_dynamo_test() {
///     init_test_logging();
///
///     let client = dynamo_test_utils::create_dynamo_client().await;
///     dynamo_test_utils::create_profile_table(&client, "profiles-test").await.unwrap();
///     // ...
/// }
/// ```

// Constants for DynamoDB tests
pub const DYNAMO_LOCAL_URI: &str = "http://localhost:8000";

// Helper to check if DynamoDB integration tests should be used
pub fn use_dynamodb() -> bool {
    std::env::var("USE_DYNAMODB").unwrap_or_default() == "true"
}

// Helper to set up a DynamoDB client for local testing
pub async fn create_dynamo_client() -> Client {
    let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .endpoint_url(DYNAMO_LOCAL_URI)
        .load()
        .await;

    Client::new(&config)
}

fn key_element(name: &str, key_type: KeyType) -> Result<KeySchemaElement, Box<dyn Error>> {
    Ok(KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()?)
}

fn string_attribute(name: &str) -> Result<AttributeDefinition, Box<dyn Error>> {
    Ok(AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(ScalarAttributeType::S)
        .build()?)
}

async fn delete_table_if_exists(client: &Client, table_name: &str) -> Result<(), Box<dyn Error>> {
    let tables = client.list_tables().send().await?;
    if !tables.table_names().contains(&table_name.to_string()) {
        return Ok(());
    }

    info!("Table '{}' already exists, deleting it first...", table_name);
    if let Err(e) = client.delete_table().table_name(table_name).send().await {
        error!("Error deleting table '{}': {}", table_name, e);
    }

    // Wait for table deletion to complete
    loop {
        let tables = client.list_tables().send().await?;
        if !tables.table_names().contains(&table_name.to_string()) {
            info!("Table '{}' successfully deleted!", table_name);
            return Ok(());
        }
        debug!("Table '{}' still exists, waiting...", table_name);
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    }
}

// Helper to create the profile table (pk hash key, sk range key) for testing
pub async fn create_profile_table(client: &Client, table_name: &str) -> Result<(), Box<dyn Error>> {
    info!("Creating profile table '{}' for testing...", table_name);

    delete_table_if_exists(client, table_name).await?;

    client
        .create_table()
        .table_name(table_name)
        .key_schema(key_element("pk", KeyType::Hash)?)
        .key_schema(key_element("sk", KeyType::Range)?)
        .attribute_definitions(string_attribute("pk")?)
        .attribute_definitions(string_attribute("sk")?)
        .provisioned_throughput(
            ProvisionedThroughput::builder()
                .read_capacity_units(5)
                .write_capacity_units(5)
                .build()?,
        )
        .send()
        .await?;

    // Wait for the table to become ACTIVE before running tests
    info!("Waiting for table '{}' to become ACTIVE...", table_name);
    loop {
        match client.describe_table().table_name(table_name).send().await {
            Ok(resp) => {
                let status = resp.table().and_then(|table| table.table_status());
                if status == Some(&TableStatus::Active) {
                    break;
                }
                debug!("Table '{}' status: {:?}", table_name, status);
            }
            Err(e) => error!("Error checking table status: {}", e),
        }
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    }

    info!("Table '{}' is ready for testing!", table_name);
    Ok(())
}

// Helper to clean the DynamoDB table between tests
pub async fn clear_dynamo_table(client: &Client, table_name: &str) {
    let mut last_key = None;
    loop {
        let scan_resp = match client
            .scan()
            .table_name(table_name)
            .set_exclusive_start_key(last_key.clone())
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                // Ignore scan errors to keep the test running
                error!("Failed to scan table '{}': {}", table_name, e);
                break;
            }
        };

        for item in scan_resp.items() {
            let (Some(AttributeValue::S(pk)), Some(AttributeValue::S(sk))) =
                (item.get("pk"), item.get("sk"))
            else {
                continue;
            };

            if let Err(e) = client
                .delete_item()
                .table_name(table_name)
                .key("pk", AttributeValue::S(pk.clone()))
                .key("sk", AttributeValue::S(sk.clone()))
                .send()
                .await
            {
                error!(
                    "Failed to delete item '{}' from table '{}': {}",
                    sk, table_name, e
                );
            }
        }

        last_key = scan_resp.last_evaluated_key().cloned();
        if last_key.is_none() {
            break;
        }
    }
}
