//! In-memory document store.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use sharedtable_core::store::{
    DeleteItemRequest, DocumentStore, GetItemRequest, PutItemRequest, QueryRequest, StoreResult,
    UpdateItemRequest,
};
use sharedtable_core::table::{logical_id, Item, Page, DEFAULT_KEY_ATTRIBUTE};
use tokio::sync::RwLock;

use super::error::InMemoryError;
use super::expression::{parse_conditions, parse_projection, parse_set, Bindings, Condition};

type Table = BTreeMap<String, Item>;

/// In-memory document store for tests and dry runs.
///
/// Tables are created on first write and kept in key order, which is also
/// the order queries return items in. Data is lost when the last clone is
/// dropped.
///
/// Queries follow DynamoDB's rules for a hash-key-only table: the key
/// condition is a single equality on the partition attribute of the table
/// or of a registered index, and `Limit` must be at least 1.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    key_attribute: String,
    /// Secondary index name -> partition attribute.
    indexes: HashMap<String, String>,
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates an empty store keyed by the default key attribute.
    pub fn new() -> Self {
        Self::with_key_attribute(DEFAULT_KEY_ATTRIBUTE)
    }

    pub fn with_key_attribute(key_attribute: impl Into<String>) -> Self {
        Self {
            key_attribute: key_attribute.into(),
            indexes: HashMap::new(),
            tables: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers a global secondary index partitioned by `partition_attribute`.
    ///
    /// Items without the attribute are not part of the index.
    pub fn with_index(
        mut self,
        index_name: impl Into<String>,
        partition_attribute: impl Into<String>,
    ) -> Self {
        self.indexes
            .insert(index_name.into(), partition_attribute.into());
        self
    }

    fn key_of(&self, item: &Item) -> Result<String, InMemoryError> {
        item.get(&self.key_attribute)
            .and_then(logical_id)
            .ok_or_else(|| InMemoryError::MissingKey(self.key_attribute.clone()))
    }

    /// Partition attribute queried by a request: the table key or an index's.
    fn partition_attribute(&self, index_name: Option<&str>) -> Result<&str, InMemoryError> {
        match index_name {
            Some(index) => self
                .indexes
                .get(index)
                .map(String::as_str)
                .ok_or_else(|| InMemoryError::UnknownIndex(index.to_string())),
            None => Ok(&self.key_attribute),
        }
    }
}

/// The partition value of a key condition, which must be a single equality
/// on the partition attribute.
fn partition_value(
    conditions: Vec<Condition>,
    partition_attribute: &str,
    expression: &str,
) -> Result<AttributeValue, InMemoryError> {
    match <[Condition; 1]>::try_from(conditions) {
        Ok([Condition::Equals { attribute, value }]) if attribute == partition_attribute => {
            Ok(value)
        }
        _ => Err(InMemoryError::UnsupportedExpression(expression.to_string())),
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get_item(&self, request: GetItemRequest) -> StoreResult<Option<Item>> {
        let key = self.key_of(&request.key)?;
        let tables = self.tables.read().await;

        Ok(tables
            .get(&request.table_name)
            .and_then(|table| table.get(&key))
            .cloned())
    }

    async fn put_item(&self, request: PutItemRequest) -> StoreResult<Option<Item>> {
        let key = self.key_of(&request.item)?;
        let options = &request.options;

        let conditions = match &options.condition_expression {
            Some(expression) => parse_conditions(
                expression,
                &Bindings::new(
                    &options.expression_attribute_names,
                    &options.expression_attribute_values,
                ),
            )?,
            None => Vec::new(),
        };

        let mut tables = self.tables.write().await;
        let table = tables.entry(request.table_name).or_default();

        let empty = Item::new();
        let current = table.get(&key).unwrap_or(&empty);
        if !conditions.iter().all(|c| c.matches(current)) {
            return Err(InMemoryError::ConditionalCheckFailed.into());
        }

        Ok(table.insert(key, request.item))
    }

    async fn update_item(&self, request: UpdateItemRequest) -> StoreResult<Option<Item>> {
        let key = self.key_of(&request.key)?;
        let update = &request.update;
        let assignments = parse_set(
            &update.expression,
            &Bindings::new(&update.names, &update.values),
        )?;

        let mut tables = self.tables.write().await;
        let item = tables
            .entry(request.table_name)
            .or_default()
            .entry(key)
            .or_insert_with(|| request.key.clone());

        item.extend(assignments);
        Ok(Some(item.clone()))
    }

    async fn delete_item(&self, request: DeleteItemRequest) -> StoreResult<Option<Item>> {
        let key = self.key_of(&request.key)?;
        let mut tables = self.tables.write().await;

        Ok(tables
            .get_mut(&request.table_name)
            .and_then(|table| table.remove(&key)))
    }

    async fn query(&self, request: QueryRequest) -> StoreResult<Page> {
        let descriptor = &request.descriptor;
        let bindings = Bindings::new(
            &descriptor.expression_attribute_names,
            &descriptor.expression_attribute_values,
        );

        let limit = match descriptor.limit {
            Some(limit) if limit < 1 => return Err(InMemoryError::InvalidLimit(limit).into()),
            Some(limit) => limit as usize,
            None => usize::MAX,
        };
        let partition_attribute = self.partition_attribute(descriptor.index_name.as_deref())?;
        let key_condition = descriptor
            .key_condition_expression
            .as_deref()
            .ok_or(InMemoryError::MissingKeyCondition)?;
        let partition = partition_value(
            parse_conditions(key_condition, &bindings)?,
            partition_attribute,
            key_condition,
        )?;
        let filter = match &descriptor.filter_expression {
            Some(expression) => parse_conditions(expression, &bindings)?,
            None => Vec::new(),
        };
        let projection = match &descriptor.projection_expression {
            Some(expression) => Some(parse_projection(expression, &bindings)?),
            None => None,
        };
        let start = match &descriptor.exclusive_start_key {
            Some(key) => Some(self.key_of(key)?),
            None => None,
        };
        let forward = descriptor.scan_index_forward.unwrap_or(true);

        let tables = self.tables.read().await;
        let Some(table) = tables.get(&request.table_name) else {
            return Ok(Page::default());
        };

        let mut matching: Vec<(&String, &Item)> = table
            .iter()
            .filter(|(_, item)| item.get(partition_attribute) == Some(&partition))
            .collect();
        if !forward {
            matching.reverse();
        }
        if let Some(start) = &start {
            matching.retain(|(key, _)| if forward { *key > start } else { *key < start });
        }

        let has_more = matching.len() > limit;
        matching.truncate(limit);

        // Index tokens carry the index key along with the table key.
        let last_evaluated_key: Option<Item> = match matching.last() {
            Some((_, item)) if has_more => Some(
                [self.key_attribute.as_str(), partition_attribute]
                    .into_iter()
                    .filter_map(|name| Some((name.to_string(), item.get(name)?.clone())))
                    .collect(),
            ),
            _ => None,
        };

        let items = matching
            .into_iter()
            .map(|(_, item)| item)
            .filter(|item| filter.iter().all(|c| c.matches(item)))
            .map(|item| project(item, projection.as_deref()))
            .collect();

        Ok(Page {
            items,
            last_evaluated_key,
        })
    }
}

fn project(item: &Item, attributes: Option<&[String]>) -> Item {
    match attributes {
        Some(attributes) => item
            .iter()
            .filter(|(name, _)| attributes.contains(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
        None => item.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharedtable_core::table::{PutOptions, QueryDescriptor, UpdateExpression};

    const TABLE: &str = "shared";

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }

    fn note(pk: &str, owner: &str) -> Item {
        Item::from([
            ("pk".to_string(), s(pk)),
            ("owner".to_string(), s(owner)),
        ])
    }

    fn tagged(pk: &str, owner: &str) -> Item {
        let mut item = note(pk, owner);
        item.insert("tag".to_string(), s("x"));
        item
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new().with_index("ByOwner", "owner")
    }

    async fn put(store: &InMemoryStore, item: Item) -> Option<Item> {
        store
            .put_item(PutItemRequest {
                table_name: TABLE.to_string(),
                item,
                options: PutOptions::default(),
            })
            .await
            .unwrap()
    }

    async fn get(store: &InMemoryStore, pk: &str) -> Option<Item> {
        store
            .get_item(GetItemRequest {
                table_name: TABLE.to_string(),
                key: Item::from([("pk".to_string(), s(pk))]),
            })
            .await
            .unwrap()
    }

    fn by_owner(owner: &str) -> QueryDescriptor {
        QueryDescriptor::new("#o = :o")
            .index("ByOwner")
            .name("#o", "owner")
            .value(":o", s(owner))
    }

    async fn query(store: &InMemoryStore, descriptor: QueryDescriptor) -> StoreResult<Page> {
        store
            .query(QueryRequest {
                table_name: TABLE.to_string(),
                descriptor,
            })
            .await
    }

    async fn query_fault(store: &InMemoryStore, descriptor: QueryDescriptor) -> InMemoryError {
        let err = query(store, descriptor).await.unwrap_err();
        err.downcast_ref::<InMemoryError>().unwrap().clone()
    }

    #[tokio::test]
    async fn test_put_returns_previous_item() {
        let store = store();

        assert!(put(&store, note("notes|1", "a")).await.is_none());
        let previous = put(&store, note("notes|1", "b")).await.unwrap();

        assert_eq!(previous.get("owner"), Some(&s("a")));
        assert_eq!(get(&store, "notes|1").await.unwrap().get("owner"), Some(&s("b")));
    }

    #[tokio::test]
    async fn test_put_condition_failure() {
        let store = store();
        put(&store, note("notes|1", "a")).await;

        let err = store
            .put_item(PutItemRequest {
                table_name: TABLE.to_string(),
                item: note("notes|1", "b"),
                options: PutOptions::default().condition("attribute_not_exists(pk)"),
            })
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<InMemoryError>(),
            Some(&InMemoryError::ConditionalCheckFailed)
        );
    }

    #[tokio::test]
    async fn test_missing_key_is_a_fault() {
        let store = store();
        let err = store
            .get_item(GetItemRequest {
                table_name: TABLE.to_string(),
                key: Item::from([("id".to_string(), s("1"))]),
            })
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<InMemoryError>(),
            Some(&InMemoryError::MissingKey("pk".to_string()))
        );
    }

    #[tokio::test]
    async fn test_update_merges_attributes() {
        let store = store();
        put(&store, note("notes|1", "a")).await;

        let updated = store
            .update_item(UpdateItemRequest {
                table_name: TABLE.to_string(),
                key: Item::from([("pk".to_string(), s("notes|1"))]),
                update: UpdateExpression {
                    expression: "SET #f0 = :v0".to_string(),
                    names: HashMap::from([("#f0".to_string(), "title".to_string())]),
                    values: Item::from([(":v0".to_string(), s("hello"))]),
                },
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.get("title"), Some(&s("hello")));
        assert_eq!(updated.get("owner"), Some(&s("a")));
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = store();
        let removed = store
            .delete_item(DeleteItemRequest {
                table_name: TABLE.to_string(),
                key: Item::from([("pk".to_string(), s("notes|404"))]),
            })
            .await
            .unwrap();

        assert!(removed.is_none());
    }

    #[tokio::test]
    async fn test_query_by_partition_key() {
        let store = store();
        put(&store, note("notes|1", "a")).await;
        put(&store, note("notes|2", "a")).await;

        let page = query(
            &store,
            QueryDescriptor::new("pk = :pk").value(":pk", s("notes|2")),
        )
        .await
        .unwrap();

        assert_eq!(page.items, vec![note("notes|2", "a")]);
        assert!(page.is_last());
    }

    #[tokio::test]
    async fn test_index_query_pages_in_key_order() {
        let store = store();
        for i in 1..=5 {
            put(&store, note(&format!("notes|{i}"), "a")).await;
        }
        put(&store, note("users|1", "b")).await;

        let first = query(&store, by_owner("a").limit(2)).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.items[0].get("pk"), Some(&s("notes|1")));
        let token = first.last_evaluated_key.clone().unwrap();
        assert_eq!(token, note("notes|2", "a"));

        let second = query(&store, by_owner("a").limit(2).start_from(Some(token)))
            .await
            .unwrap();
        assert_eq!(second.items[0].get("pk"), Some(&s("notes|3")));

        let last = query(
            &store,
            by_owner("a").limit(2).start_from(second.last_evaluated_key),
        )
        .await
        .unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(last.is_last());
    }

    #[tokio::test]
    async fn test_query_filter_projection_and_direction() {
        let store = store();
        put(&store, tagged("notes|1", "a")).await;
        put(&store, note("notes|2", "a")).await;
        put(&store, tagged("notes|3", "a")).await;
        put(&store, tagged("notes|4", "b")).await;

        let page = query(
            &store,
            by_owner("a")
                .filter("attribute_exists(tag)")
                .projection("pk")
                .descending(),
        )
        .await
        .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0], Item::from([("pk".to_string(), s("notes|3"))]));
        assert_eq!(page.items[1], Item::from([("pk".to_string(), s("notes|1"))]));
    }

    #[tokio::test]
    async fn test_query_rejects_non_equality_key_condition() {
        let store = store();
        put(&store, note("notes|1", "a")).await;

        let prefix = QueryDescriptor::new("begins_with(pk, :p)").value(":p", s("notes|"));
        assert!(matches!(
            query_fault(&store, prefix).await,
            InMemoryError::UnsupportedExpression(_)
        ));

        let wrong_attribute = QueryDescriptor::new("owner = :o").value(":o", s("a"));
        assert!(matches!(
            query_fault(&store, wrong_attribute).await,
            InMemoryError::UnsupportedExpression(_)
        ));

        let extra_clause = by_owner("a").value(":p", s("notes|"));
        let extra_clause = QueryDescriptor {
            key_condition_expression: Some("#o = :o AND begins_with(pk, :p)".to_string()),
            ..extra_clause
        };
        assert!(matches!(
            query_fault(&store, extra_clause).await,
            InMemoryError::UnsupportedExpression(_)
        ));
    }

    #[tokio::test]
    async fn test_query_rejects_unknown_index() {
        let store = store();
        put(&store, note("notes|1", "a")).await;

        let descriptor = QueryDescriptor::new("pk = :pk")
            .index("NoSuchIndex")
            .value(":pk", s("notes|1"));

        assert_eq!(
            query_fault(&store, descriptor).await,
            InMemoryError::UnknownIndex("NoSuchIndex".to_string())
        );
    }

    #[tokio::test]
    async fn test_query_rejects_limit_below_one() {
        let store = store();
        put(&store, note("notes|1", "a")).await;

        assert_eq!(
            query_fault(&store, by_owner("a").limit(0)).await,
            InMemoryError::InvalidLimit(0)
        );
        assert_eq!(
            query_fault(&store, by_owner("a").limit(-3)).await,
            InMemoryError::InvalidLimit(-3)
        );
    }

    #[tokio::test]
    async fn test_query_requires_key_condition() {
        let store = store();

        assert_eq!(
            query_fault(&store, QueryDescriptor::default()).await,
            InMemoryError::MissingKeyCondition
        );
    }
}
