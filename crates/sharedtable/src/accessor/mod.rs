//! Table accessor over the shared physical table.

mod query;

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use sharedtable_core::events::{Event, EventSink};
use sharedtable_core::store::{
    AccessorError, DeleteItemRequest, DocumentStore, GetItemRequest, PutItemRequest, QueryRequest,
    Result, StoreFault, UpdateItemRequest,
};
use sharedtable_core::table::{
    build_update, item_to_json, Item, Key, KeySchema, Page, PutOptions, QueryDescriptor,
};

use crate::config::Config;
use crate::logging::TracingSink;

pub use query::QueryCursor;

/// Record access for one logical table inside the shared physical table.
///
/// Holds only immutable configuration; clones share the store and sink.
/// Every call is a single pass-through request. Faults are reported to the
/// event sink and returned unchanged inside [`AccessorError::Store`].
#[derive(Clone)]
pub struct TableAccessor {
    store: Arc<dyn DocumentStore>,
    sink: Arc<dyn EventSink>,
    physical_table: String,
    schema: KeySchema,
}

impl TableAccessor {
    /// Creates an accessor logging through [`TracingSink`].
    pub fn new(
        store: Arc<dyn DocumentStore>,
        config: &Config,
        logical_table: impl Into<String>,
    ) -> Self {
        Self {
            store,
            sink: Arc::new(TracingSink),
            physical_table: config.table_name.clone(),
            schema: config.key_schema(logical_table),
        }
    }

    /// Replaces the event sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Another logical table sharing this accessor's store, sink and layout.
    pub fn for_table(&self, logical_table: impl Into<String>) -> Self {
        let schema = KeySchema::new(logical_table)
            .with_key_attribute(self.schema.key_attribute())
            .with_id_attribute(self.schema.id_attribute());

        Self {
            store: Arc::clone(&self.store),
            sink: Arc::clone(&self.sink),
            physical_table: self.physical_table.clone(),
            schema,
        }
    }

    /// Name of the physical attribute serving as primary key.
    pub fn key_attribute(&self) -> &str {
        self.schema.key_attribute()
    }

    pub fn physical_table(&self) -> &str {
        &self.physical_table
    }

    pub fn logical_table(&self) -> &str {
        self.schema.logical_table()
    }

    pub fn schema(&self) -> &KeySchema {
        &self.schema
    }

    /// Gets a record; `None` when nothing is stored under the key.
    pub async fn get(&self, key: impl Into<Key>) -> Result<Option<Item>> {
        let request = GetItemRequest {
            table_name: self.physical_table.clone(),
            key: self.schema.format_key(key.into()),
        };
        self.emit(Event::Get, request.to_json());

        match self.store.get_item(request).await {
            Ok(item) => {
                self.emit(
                    Event::GetResult,
                    json!({ "item": item.as_ref().map(item_to_json) }),
                );
                Ok(item)
            }
            Err(fault) => Err(self.fail(Event::Get, fault)),
        }
    }

    /// Writes a full record, returning the one it replaced.
    pub async fn put(&self, record: Item) -> Result<Option<Item>> {
        self.put_with(record, PutOptions::default()).await
    }

    /// Writes a full record with store-specific write conditions.
    ///
    /// Returns `None` on first write.
    pub async fn put_with(&self, record: Item, options: PutOptions) -> Result<Option<Item>> {
        let request = PutItemRequest {
            table_name: self.physical_table.clone(),
            item: self.schema.format_record(record),
            options,
        };
        self.emit(Event::Put, request.to_json());

        self.store
            .put_item(request)
            .await
            .map_err(|fault| self.fail(Event::Put, fault))
    }

    /// Overwrites the attributes present in `partial` and returns the record
    /// as stored afterwards.
    ///
    /// Fails with [`AccessorError::EmptyUpdate`] without contacting the store
    /// when `partial` has no attribute besides the key and id, and with
    /// [`AccessorError::MissingAttributes`] when the store answers without
    /// the updated record.
    pub async fn update(&self, key: impl Into<Key>, partial: Item) -> Result<Item> {
        let Some(update) = build_update(&self.schema, &partial) else {
            let error = AccessorError::EmptyUpdate;
            self.emit(Event::UpdateError, json!({ "error": error.to_string() }));
            return Err(error);
        };

        let request = UpdateItemRequest {
            table_name: self.physical_table.clone(),
            key: self.schema.format_key(key.into()),
            update,
        };
        self.emit(Event::Update, request.to_json());

        match self.store.update_item(request).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => {
                let error = AccessorError::MissingAttributes;
                self.emit(Event::UpdateError, json!({ "error": error.to_string() }));
                Err(error)
            }
            Err(fault) => Err(self.fail(Event::Update, fault)),
        }
    }

    /// Deletes a record, returning it as it was. Deleting a missing record
    /// is a no-op returning `None`.
    pub async fn delete(&self, key: impl Into<Key>) -> Result<Option<Item>> {
        let request = DeleteItemRequest {
            table_name: self.physical_table.clone(),
            key: self.schema.format_key(key.into()),
        };
        self.emit(Event::Delete, request.to_json());

        self.store
            .delete_item(request)
            .await
            .map_err(|fault| self.fail(Event::Delete, fault))
    }

    /// Fetches exactly one page of a query.
    pub async fn query_once(&self, descriptor: QueryDescriptor) -> Result<Page> {
        let request = QueryRequest {
            table_name: self.physical_table.clone(),
            descriptor,
        };
        self.emit(Event::QueryOnce, request.to_json());

        self.store
            .query(request)
            .await
            .map_err(|fault| self.fail(Event::QueryOnce, fault))
    }

    /// A pull-based cursor over every page of a query.
    pub fn cursor(&self, descriptor: QueryDescriptor) -> QueryCursor<'_> {
        QueryCursor::new(self, descriptor)
    }

    fn emit(&self, event: Event, payload: Value) {
        self.sink.log(event, &payload);
    }

    fn fail(&self, event: Event, fault: StoreFault) -> AccessorError {
        self.emit(event.error(), json!({ "error": fault.to_string() }));
        AccessorError::store(event, fault)
    }
}

impl fmt::Debug for TableAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableAccessor")
            .field("physical_table", &self.physical_table)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
