//! Physical key generation for the shared table.
//!
//! Pure functions mapping a logical table name and a logical id onto the
//! single partition key attribute of the shared physical table. All records
//! of all logical tables live side by side, told apart by the key prefix.

use aws_sdk_dynamodb::types::AttributeValue;

use super::types::{Item, Key};

/// Default name of the physical partition key attribute.
pub const DEFAULT_KEY_ATTRIBUTE: &str = "pk";

/// Default name of the logical id attribute on records.
pub const DEFAULT_ID_ATTRIBUTE: &str = "id";

/// Separator between logical table name and logical id.
pub const KEY_SEPARATOR: char = '|';

/// Key layout of one logical table inside the shared physical table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    logical_table: String,
    key_attribute: String,
    id_attribute: String,
}

impl KeySchema {
    /// Creates a schema with the default attribute names.
    pub fn new(logical_table: impl Into<String>) -> Self {
        Self {
            logical_table: logical_table.into(),
            key_attribute: DEFAULT_KEY_ATTRIBUTE.to_string(),
            id_attribute: DEFAULT_ID_ATTRIBUTE.to_string(),
        }
    }

    pub fn with_key_attribute(mut self, name: impl Into<String>) -> Self {
        self.key_attribute = name.into();
        self
    }

    pub fn with_id_attribute(mut self, name: impl Into<String>) -> Self {
        self.id_attribute = name.into();
        self
    }

    pub fn logical_table(&self) -> &str {
        &self.logical_table
    }

    /// Name of the physical attribute that serves as primary key.
    pub fn key_attribute(&self) -> &str {
        &self.key_attribute
    }

    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    /// Generate the physical key for a logical id.
    ///
    /// Pattern: `<logical_table>|<id>`
    pub fn physical_key(&self, id: &str) -> String {
        format!("{}{KEY_SEPARATOR}{id}", self.logical_table)
    }

    /// Turn a key into the attribute map sent to the store.
    ///
    /// A logical id (bare, or as the id attribute of a key map) is replaced by
    /// the physical key. Anything else is assumed to already be a physical
    /// key and is passed through.
    pub fn format_key(&self, key: Key) -> Item {
        match key {
            Key::Id(id) => self.key_item(&id),
            Key::Item(mut item) => {
                let Some(id) = item.get(&self.id_attribute).and_then(logical_id) else {
                    return item;
                };
                item.remove(&self.id_attribute);
                item.insert(
                    self.key_attribute.clone(),
                    AttributeValue::S(self.physical_key(&id)),
                );
                item
            }
        }
    }

    /// Add the physical key to a record carrying a logical id.
    ///
    /// The id attribute stays on the record. Records without one are passed
    /// through unchanged.
    pub fn format_record(&self, mut record: Item) -> Item {
        if let Some(id) = record.get(&self.id_attribute).and_then(logical_id) {
            record.insert(
                self.key_attribute.clone(),
                AttributeValue::S(self.physical_key(&id)),
            );
        }
        record
    }

    fn key_item(&self, id: &str) -> Item {
        Item::from([(
            self.key_attribute.clone(),
            AttributeValue::S(self.physical_key(id)),
        )])
    }
}

/// Read a logical id out of an attribute value.
///
/// Only strings and numbers qualify.
pub fn logical_id(value: &AttributeValue) -> Option<String> {
    match value {
        AttributeValue::S(s) => Some(s.clone()),
        AttributeValue::N(n) => Some(n.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }

    #[test]
    fn test_physical_key() {
        let schema = KeySchema::new("users");
        assert_eq!(schema.physical_key("42"), "users|42");
    }

    #[test]
    fn test_format_key_from_id() {
        let schema = KeySchema::new("users");
        let key = schema.format_key(Key::from("42"));

        assert_eq!(key.len(), 1);
        assert_eq!(key.get("pk"), Some(&s("users|42")));
    }

    #[test]
    fn test_format_key_replaces_id_attribute() {
        let schema = KeySchema::new("users");
        let key = schema.format_key(Key::Item(Item::from([(
            "id".to_string(),
            AttributeValue::N("7".to_string()),
        )])));

        assert_eq!(key.get("pk"), Some(&s("users|7")));
        assert!(!key.contains_key("id"));
    }

    #[test]
    fn test_format_key_passes_physical_key_through() {
        let schema = KeySchema::new("users");
        let physical = Item::from([("pk".to_string(), s("orders|9"))]);

        assert_eq!(schema.format_key(Key::Item(physical.clone())), physical);
    }

    #[test]
    fn test_format_record_augments() {
        let schema = KeySchema::new("users");
        let record = Item::from([
            ("id".to_string(), s("42")),
            ("name".to_string(), s("Ada")),
        ]);

        let formatted = schema.format_record(record);
        assert_eq!(formatted.get("pk"), Some(&s("users|42")));
        assert_eq!(formatted.get("id"), Some(&s("42")));
        assert_eq!(formatted.get("name"), Some(&s("Ada")));
    }

    #[test]
    fn test_format_record_without_id_is_unchanged() {
        let schema = KeySchema::new("users");
        let record = Item::from([("pk".to_string(), s("users|1")), ("name".to_string(), s("x"))]);

        assert_eq!(schema.format_record(record.clone()), record);
    }

    #[test]
    fn test_custom_attribute_names() {
        let schema = KeySchema::new("docs")
            .with_key_attribute("PK")
            .with_id_attribute("docId");
        let record = Item::from([("docId".to_string(), s("a"))]);

        assert_eq!(schema.key_attribute(), "PK");
        assert_eq!(schema.format_record(record).get("PK"), Some(&s("docs|a")));
    }

    #[test]
    fn test_logical_id_types() {
        assert_eq!(logical_id(&s("a")), Some("a".to_string()));
        assert_eq!(
            logical_id(&AttributeValue::N("3".to_string())),
            Some("3".to_string())
        );
        assert_eq!(logical_id(&AttributeValue::Bool(true)), None);
    }
}
