//! Update expression building for partial attribute overwrites.

use std::collections::HashMap;

use serde_json::{json, Value};

use super::json::item_to_json;
use super::keys::KeySchema;
use super::types::Item;

/// A `SET` update expression with its placeholder bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: Item,
}

impl UpdateExpression {
    pub fn to_json(&self) -> Value {
        json!({
            "updateExpression": self.expression,
            "expressionAttributeNames": self.names,
            "expressionAttributeValues": item_to_json(&self.values),
        })
    }
}

/// Build a `SET` expression overwriting every attribute of `partial`.
///
/// Key and logical id attributes are skipped: neither can change without
/// moving the record. Returns `None` when no attribute is left to update.
///
/// Pattern: `SET #f0 = :v0, #f1 = :v1` with attribute names in sorted order.
pub fn build_update(schema: &KeySchema, partial: &Item) -> Option<UpdateExpression> {
    let mut fields: Vec<&String> = partial
        .keys()
        .filter(|name| {
            name.as_str() != schema.key_attribute() && name.as_str() != schema.id_attribute()
        })
        .collect();

    if fields.is_empty() {
        return None;
    }
    fields.sort();

    let mut update = UpdateExpression::default();
    let mut clauses = Vec::with_capacity(fields.len());

    for (i, field) in fields.into_iter().enumerate() {
        let name = format!("#f{i}");
        let value = format!(":v{i}");
        clauses.push(format!("{name} = {value}"));
        update.names.insert(name, field.clone());
        update.values.insert(value, partial[field].clone());
    }

    update.expression = format!("SET {}", clauses.join(", "));
    Some(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::AttributeValue;

    #[test]
    fn test_build_update_sorted_placeholders() {
        let schema = KeySchema::new("users");
        let partial = Item::from([
            ("name".to_string(), AttributeValue::S("Ada".into())),
            ("age".to_string(), AttributeValue::N("36".into())),
        ]);

        let update = build_update(&schema, &partial).unwrap();

        assert_eq!(update.expression, "SET #f0 = :v0, #f1 = :v1");
        assert_eq!(update.names.get("#f0").map(String::as_str), Some("age"));
        assert_eq!(update.names.get("#f1").map(String::as_str), Some("name"));
        assert_eq!(update.values.get(":v0"), Some(&AttributeValue::N("36".into())));
        assert_eq!(update.values.get(":v1"), Some(&AttributeValue::S("Ada".into())));
    }

    #[test]
    fn test_build_update_skips_key_attributes() {
        let schema = KeySchema::new("users");
        let partial = Item::from([
            ("pk".to_string(), AttributeValue::S("users|1".into())),
            ("id".to_string(), AttributeValue::S("1".into())),
            ("email".to_string(), AttributeValue::S("a@b.c".into())),
        ]);

        let update = build_update(&schema, &partial).unwrap();

        assert_eq!(update.expression, "SET #f0 = :v0");
        assert_eq!(update.names.len(), 1);
        assert_eq!(update.names.get("#f0").map(String::as_str), Some("email"));
    }

    #[test]
    fn test_build_update_empty() {
        let schema = KeySchema::new("users");
        assert!(build_update(&schema, &Item::new()).is_none());

        let only_keys = Item::from([("id".to_string(), AttributeValue::S("1".into()))]);
        assert!(build_update(&schema, &only_keys).is_none());
    }
}
