//! DynamoDB document store.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::ReturnValue;
use aws_sdk_dynamodb::Client;
use sharedtable_core::store::{
    DeleteItemRequest, DocumentStore, GetItemRequest, PutItemRequest, QueryRequest, StoreResult,
    UpdateItemRequest,
};
use sharedtable_core::table::{Item, Page};

use super::client::{create_client, AwsConfig};

/// Document store backed by a DynamoDB client.
///
/// The client is cheap to clone and safe to share between tasks. SDK errors
/// are boxed as they are, so callers can downcast them to the operation's
/// `SdkError`.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
}

impl DynamoDbStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a store with a freshly configured client.
    pub async fn connect(config: &AwsConfig) -> Self {
        Self::new(create_client(config).await)
    }
}

#[async_trait]
impl DocumentStore for DynamoDbStore {
    async fn get_item(&self, request: GetItemRequest) -> StoreResult<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(request.table_name)
            .set_key(Some(request.key))
            .send()
            .await?;

        Ok(output.item)
    }

    async fn put_item(&self, request: PutItemRequest) -> StoreResult<Option<Item>> {
        let options = request.options;
        let output = self
            .client
            .put_item()
            .table_name(request.table_name)
            .set_item(Some(request.item))
            .return_values(ReturnValue::AllOld)
            .set_condition_expression(options.condition_expression)
            .set_expression_attribute_names(non_empty(options.expression_attribute_names))
            .set_expression_attribute_values(non_empty(options.expression_attribute_values))
            .send()
            .await?;

        Ok(output.attributes)
    }

    async fn update_item(&self, request: UpdateItemRequest) -> StoreResult<Option<Item>> {
        let update = request.update;
        let output = self
            .client
            .update_item()
            .table_name(request.table_name)
            .set_key(Some(request.key))
            .update_expression(update.expression)
            .set_expression_attribute_names(non_empty(update.names))
            .set_expression_attribute_values(non_empty(update.values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await?;

        Ok(output.attributes)
    }

    async fn delete_item(&self, request: DeleteItemRequest) -> StoreResult<Option<Item>> {
        let output = self
            .client
            .delete_item()
            .table_name(request.table_name)
            .set_key(Some(request.key))
            .return_values(ReturnValue::AllOld)
            .send()
            .await?;

        Ok(output.attributes)
    }

    async fn query(&self, request: QueryRequest) -> StoreResult<Page> {
        let descriptor = request.descriptor;
        let output = self
            .client
            .query()
            .table_name(request.table_name)
            .set_index_name(descriptor.index_name)
            .set_key_condition_expression(descriptor.key_condition_expression)
            .set_filter_expression(descriptor.filter_expression)
            .set_projection_expression(descriptor.projection_expression)
            .set_expression_attribute_names(non_empty(descriptor.expression_attribute_names))
            .set_expression_attribute_values(non_empty(descriptor.expression_attribute_values))
            .set_limit(descriptor.limit)
            .set_scan_index_forward(descriptor.scan_index_forward)
            .set_consistent_read(descriptor.consistent_read)
            .set_exclusive_start_key(descriptor.exclusive_start_key)
            .send()
            .await?;

        Ok(Page {
            items: output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key.filter(|key| !key.is_empty()),
        })
    }
}

/// DynamoDB rejects empty expression maps, so leave them unset.
fn non_empty<V>(map: HashMap<String, V>) -> Option<HashMap<String, V>> {
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}
