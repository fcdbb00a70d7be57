use async_trait::async_trait;
use serde_json::{json, Value};

use crate::table::{item_to_json, Item, Page, PutOptions, QueryDescriptor, UpdateExpression};

use super::StoreResult;

/// Fetch one item by its full physical key.
#[derive(Debug, Clone, PartialEq)]
pub struct GetItemRequest {
    pub table_name: String,
    pub key: Item,
}

/// Write a full item, returning whatever it replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct PutItemRequest {
    pub table_name: String,
    pub item: Item,
    pub options: PutOptions,
}

/// Overwrite some attributes of an item, returning the item as stored after.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateItemRequest {
    pub table_name: String,
    pub key: Item,
    pub update: UpdateExpression,
}

/// Remove an item, returning it as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteItemRequest {
    pub table_name: String,
    pub key: Item,
}

/// Fetch a single page of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub table_name: String,
    pub descriptor: QueryDescriptor,
}

impl GetItemRequest {
    pub fn to_json(&self) -> Value {
        json!({ "tableName": self.table_name, "key": item_to_json(&self.key) })
    }
}

impl PutItemRequest {
    pub fn to_json(&self) -> Value {
        json!({
            "tableName": self.table_name,
            "item": item_to_json(&self.item),
            "options": self.options.to_json(),
        })
    }
}

impl UpdateItemRequest {
    pub fn to_json(&self) -> Value {
        json!({
            "tableName": self.table_name,
            "key": item_to_json(&self.key),
            "update": self.update.to_json(),
        })
    }
}

impl DeleteItemRequest {
    pub fn to_json(&self) -> Value {
        json!({ "tableName": self.table_name, "key": item_to_json(&self.key) })
    }
}

impl QueryRequest {
    pub fn to_json(&self) -> Value {
        json!({ "tableName": self.table_name, "query": self.descriptor.to_json() })
    }
}

/// The managed document store behind the accessor.
///
/// Each method is one request/response exchange. Implementations return the
/// store's own faults without retrying or reclassifying them.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Gets an item; `None` when no item has the key.
    async fn get_item(&self, request: GetItemRequest) -> StoreResult<Option<Item>>;

    /// Puts an item; returns the previous item, `None` on first write.
    async fn put_item(&self, request: PutItemRequest) -> StoreResult<Option<Item>>;

    /// Applies an update expression; returns all attributes after the update.
    async fn update_item(&self, request: UpdateItemRequest) -> StoreResult<Option<Item>>;

    /// Deletes an item; returns the removed item, `None` when nothing matched.
    async fn delete_item(&self, request: DeleteItemRequest) -> StoreResult<Option<Item>>;

    /// Runs one page of a query starting at the descriptor's continuation token.
    async fn query(&self, request: QueryRequest) -> StoreResult<Page>;
}
