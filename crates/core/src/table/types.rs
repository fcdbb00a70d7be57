use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::json::{item_to_json, json_to_attribute, ConversionError};

/// A schema-free record as stored in the shared table.
pub type Item = HashMap<String, AttributeValue>;

/// Identifies a single record.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    /// Logical id, mapped to `<logical-table>|<id>`.
    Id(String),
    /// Key attributes passed through as given (unless they carry the logical id).
    Item(Item),
}

impl From<&str> for Key {
    fn from(id: &str) -> Self {
        Key::Id(id.to_string())
    }
}

impl From<String> for Key {
    fn from(id: String) -> Self {
        Key::Id(id)
    }
}

impl From<&String> for Key {
    fn from(id: &String) -> Self {
        Key::Id(id.clone())
    }
}

impl From<Uuid> for Key {
    fn from(id: Uuid) -> Self {
        Key::Id(id.to_string())
    }
}

impl From<Item> for Key {
    fn from(item: Item) -> Self {
        Key::Item(item)
    }
}

/// Store-specific write conditions forwarded untouched on `put`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PutOptions {
    pub condition_expression: Option<String>,
    pub expression_attribute_names: HashMap<String, String>,
    pub expression_attribute_values: Item,
}

impl PutOptions {
    /// Only write when the condition holds.
    pub fn condition(mut self, expression: impl Into<String>) -> Self {
        self.condition_expression = Some(expression.into());
        self
    }

    /// Bind a `#name` placeholder.
    pub fn name(mut self, placeholder: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.expression_attribute_names
            .insert(placeholder.into(), attribute.into());
        self
    }

    /// Bind a `:value` placeholder.
    pub fn value(mut self, placeholder: impl Into<String>, value: AttributeValue) -> Self {
        self.expression_attribute_values
            .insert(placeholder.into(), value);
        self
    }

    pub fn to_json(&self) -> Value {
        json!({
            "conditionExpression": self.condition_expression,
            "expressionAttributeNames": self.expression_attribute_names,
            "expressionAttributeValues": item_to_json(&self.expression_attribute_values),
        })
    }
}

/// Parameters of a paged query against the shared table or one of its indexes.
///
/// `exclusive_start_key` is the continuation token: `None` starts from the
/// beginning, otherwise it is the `last_evaluated_key` of the previous page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDescriptor {
    pub index_name: Option<String>,
    pub key_condition_expression: Option<String>,
    pub filter_expression: Option<String>,
    pub projection_expression: Option<String>,
    pub expression_attribute_names: HashMap<String, String>,
    pub expression_attribute_values: Item,
    /// Page-size hint.
    pub limit: Option<i32>,
    pub scan_index_forward: Option<bool>,
    pub consistent_read: Option<bool>,
    pub exclusive_start_key: Option<Item>,
}

impl QueryDescriptor {
    pub fn new(key_condition_expression: impl Into<String>) -> Self {
        Self {
            key_condition_expression: Some(key_condition_expression.into()),
            ..Default::default()
        }
    }

    pub fn index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        self.filter_expression = Some(expression.into());
        self
    }

    pub fn projection(mut self, expression: impl Into<String>) -> Self {
        self.projection_expression = Some(expression.into());
        self
    }

    pub fn name(mut self, placeholder: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.expression_attribute_names
            .insert(placeholder.into(), attribute.into());
        self
    }

    pub fn value(mut self, placeholder: impl Into<String>, value: AttributeValue) -> Self {
        self.expression_attribute_values
            .insert(placeholder.into(), value);
        self
    }

    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn descending(mut self) -> Self {
        self.scan_index_forward = Some(false);
        self
    }

    pub fn consistent(mut self) -> Self {
        self.consistent_read = Some(true);
        self
    }

    pub fn start_from(mut self, key: Option<Item>) -> Self {
        self.exclusive_start_key = key;
        self
    }

    pub fn to_json(&self) -> Value {
        json!({
            "indexName": self.index_name,
            "keyConditionExpression": self.key_condition_expression,
            "filterExpression": self.filter_expression,
            "projectionExpression": self.projection_expression,
            "expressionAttributeNames": self.expression_attribute_names,
            "expressionAttributeValues": item_to_json(&self.expression_attribute_values),
            "limit": self.limit,
            "scanIndexForward": self.scan_index_forward,
            "consistentRead": self.consistent_read,
            "exclusiveStartKey": self.exclusive_start_key.as_ref().map(item_to_json),
        })
    }

    /// Parse a descriptor from the JSON shape produced by [`to_json`](Self::to_json).
    ///
    /// Attribute values are plain JSON (`":pk": "users|1"`), converted the same
    /// way as record attributes.
    pub fn from_json(value: &Value) -> Result<Self, ConversionError> {
        let raw: RawDescriptor = serde_json::from_value(value.clone())?;

        Ok(Self {
            index_name: raw.index_name,
            key_condition_expression: raw.key_condition_expression,
            filter_expression: raw.filter_expression,
            projection_expression: raw.projection_expression,
            expression_attribute_names: raw.expression_attribute_names,
            expression_attribute_values: attributes(&raw.expression_attribute_values),
            limit: raw.limit,
            scan_index_forward: raw.scan_index_forward,
            consistent_read: raw.consistent_read,
            exclusive_start_key: raw.exclusive_start_key.as_ref().map(attributes),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
struct RawDescriptor {
    index_name: Option<String>,
    key_condition_expression: Option<String>,
    filter_expression: Option<String>,
    projection_expression: Option<String>,
    expression_attribute_names: HashMap<String, String>,
    expression_attribute_values: Map<String, Value>,
    limit: Option<i32>,
    scan_index_forward: Option<bool>,
    consistent_read: Option<bool>,
    exclusive_start_key: Option<Map<String, Value>>,
}

fn attributes(map: &Map<String, Value>) -> Item {
    map.iter()
        .map(|(k, v)| (k.clone(), json_to_attribute(v)))
        .collect()
}

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
    /// Continuation token; `None` on the last page.
    pub last_evaluated_key: Option<Item>,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.last_evaluated_key.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_conversions() {
        assert_eq!(Key::from("a1"), Key::Id("a1".to_string()));
        assert_eq!(Key::from("a1".to_string()), Key::Id("a1".to_string()));

        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap();
        assert_eq!(
            Key::from(id),
            Key::Id("550e8400-e29b-41d4-a716-446655440001".to_string())
        );
    }

    #[test]
    fn test_query_descriptor_builder() {
        let descriptor = QueryDescriptor::new("#k = :k")
            .index("GSI1")
            .name("#k", "owner")
            .value(":k", AttributeValue::S("u1".to_string()))
            .limit(25)
            .descending();

        assert_eq!(descriptor.index_name.as_deref(), Some("GSI1"));
        assert_eq!(
            descriptor.expression_attribute_names.get("#k").map(String::as_str),
            Some("owner")
        );
        assert_eq!(descriptor.limit, Some(25));
        assert_eq!(descriptor.scan_index_forward, Some(false));
        assert!(descriptor.exclusive_start_key.is_none());
    }

    #[test]
    fn test_query_descriptor_json_payload() {
        let descriptor = QueryDescriptor::new("pk = :pk")
            .value(":pk", AttributeValue::S("users|1".to_string()));

        let payload = descriptor.to_json();
        assert_eq!(payload["keyConditionExpression"], "pk = :pk");
        assert_eq!(payload["expressionAttributeValues"][":pk"], "users|1");
        assert!(payload["exclusiveStartKey"].is_null());
    }

    #[test]
    fn test_query_descriptor_from_json() {
        let descriptor = QueryDescriptor::from_json(&json!({
            "indexName": "GSI1",
            "keyConditionExpression": "#o = :o",
            "expressionAttributeNames": { "#o": "owner" },
            "expressionAttributeValues": { ":o": "u1" },
            "limit": 10,
            "exclusiveStartKey": { "pk": "notes|3" }
        }))
        .unwrap();

        assert_eq!(descriptor.index_name.as_deref(), Some("GSI1"));
        assert_eq!(
            descriptor.expression_attribute_values.get(":o"),
            Some(&AttributeValue::S("u1".to_string()))
        );
        assert_eq!(descriptor.limit, Some(10));
        assert_eq!(
            descriptor
                .exclusive_start_key
                .as_ref()
                .and_then(|key| key.get("pk")),
            Some(&AttributeValue::S("notes|3".to_string()))
        );
    }

    #[test]
    fn test_query_descriptor_json_is_symmetric() {
        let descriptor = QueryDescriptor::new("pk = :pk")
            .value(":pk", AttributeValue::S("users|1".to_string()))
            .limit(5);

        assert_eq!(
            QueryDescriptor::from_json(&descriptor.to_json()).unwrap(),
            descriptor
        );
    }

    #[test]
    fn test_query_descriptor_rejects_unknown_fields() {
        assert!(QueryDescriptor::from_json(&json!({ "keyCondition": "pk = :pk" })).is_err());
    }

    #[test]
    fn test_put_options_builder() {
        let options = PutOptions::default()
            .condition("attribute_not_exists(#k)")
            .name("#k", "pk");

        assert_eq!(
            options.condition_expression.as_deref(),
            Some("attribute_not_exists(#k)")
        );
        assert_eq!(options.to_json()["expressionAttributeNames"]["#k"], "pk");
    }

    #[test]
    fn test_page_is_last() {
        assert!(Page::default().is_last());

        let mut token = Item::new();
        token.insert("pk".to_string(), AttributeValue::S("t|1".to_string()));
        let page = Page {
            items: vec![],
            last_evaluated_key: Some(token),
        };
        assert!(!page.is_last());
    }
}
