//! Provisioning of the shared physical table.

use std::time::Duration;

use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;

use super::error::{ProvisionError, Result};

const ACTIVATION_ATTEMPTS: u32 = 60;
const ACTIVATION_DELAY: Duration = Duration::from_secs(2);

/// Creates the shared table and waits until it is active.
///
/// The table has a single string hash key named `key_attribute` and
/// on-demand billing. There is no sort key: every logical record owns its
/// partition.
pub async fn create_table(client: &Client, table_name: &str, key_attribute: &str) -> Result<()> {
    let key_schema = KeySchemaElement::builder()
        .attribute_name(key_attribute)
        .key_type(KeyType::Hash)
        .build()
        .map_err(|e| ProvisionError::AwsSdk(e.to_string()))?;

    let attribute_definition = AttributeDefinition::builder()
        .attribute_name(key_attribute)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .map_err(|e| ProvisionError::AwsSdk(e.to_string()))?;

    let created = client
        .create_table()
        .table_name(table_name)
        .key_schema(key_schema)
        .attribute_definitions(attribute_definition)
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await;

    if let Err(err) = created {
        return Err(match err.into_service_error() {
            CreateTableError::ResourceInUseException(_) => ProvisionError::TableExists {
                table_name: table_name.to_string(),
            },
            err => ProvisionError::AwsSdk(format!("CreateTable failed: {:?}", err)),
        });
    }

    tracing::info!(table = table_name, key = key_attribute, "table created");
    wait_for_table_active(client, table_name).await
}

/// Fetches the current table status, `None` if the table doesn't exist.
pub async fn table_status(client: &Client, table_name: &str) -> Result<Option<TableStatus>> {
    match client.describe_table().table_name(table_name).send().await {
        Ok(response) => Ok(response
            .table()
            .and_then(|table| table.table_status())
            .cloned()),
        Err(err) => match err.into_service_error() {
            DescribeTableError::ResourceNotFoundException(_) => Ok(None),
            err => Err(ProvisionError::AwsSdk(format!(
                "DescribeTable failed: {:?}",
                err
            ))),
        },
    }
}

async fn wait_for_table_active(client: &Client, table_name: &str) -> Result<()> {
    for attempt in 0..ACTIVATION_ATTEMPTS {
        if table_status(client, table_name).await? == Some(TableStatus::Active) {
            return Ok(());
        }
        tracing::debug!(table = table_name, attempt, "waiting for table to become active");
        tokio::time::sleep(ACTIVATION_DELAY).await;
    }

    Err(ProvisionError::TableActivationTimeout {
        table_name: table_name.to_string(),
    })
}
