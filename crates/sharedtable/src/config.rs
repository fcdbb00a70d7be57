use std::env;

use sharedtable_core::table::{KeySchema, DEFAULT_ID_ATTRIBUTE, DEFAULT_KEY_ATTRIBUTE};

/// Default name of the shared physical table.
pub const DEFAULT_TABLE_NAME: &str = "sharedtable";

/// AWS region used when `AWS_REGION` is unset.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Accessor configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Shared physical table holding every logical table (default: "sharedtable")
    pub table_name: String,
    /// Physical partition key attribute (default: "pk")
    pub key_attribute: String,
    /// Logical id attribute on records (default: "id")
    pub id_attribute: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SHAREDTABLE_TABLE_NAME` - Physical table name (default: "sharedtable")
    /// - `SHAREDTABLE_KEY_ATTRIBUTE` - Partition key attribute (default: "pk")
    /// - `SHAREDTABLE_ID_ATTRIBUTE` - Logical id attribute (default: "id")
    pub fn from_env() -> Self {
        Self {
            table_name: env::var("SHAREDTABLE_TABLE_NAME")
                .unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string()),
            key_attribute: env::var("SHAREDTABLE_KEY_ATTRIBUTE")
                .unwrap_or_else(|_| DEFAULT_KEY_ATTRIBUTE.to_string()),
            id_attribute: env::var("SHAREDTABLE_ID_ATTRIBUTE")
                .unwrap_or_else(|_| DEFAULT_ID_ATTRIBUTE.to_string()),
        }
    }

    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Key layout for one logical table under this configuration.
    pub fn key_schema(&self, logical_table: impl Into<String>) -> KeySchema {
        KeySchema::new(logical_table)
            .with_key_attribute(&self.key_attribute)
            .with_id_attribute(&self.id_attribute)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            key_attribute: DEFAULT_KEY_ATTRIBUTE.to_string(),
            id_attribute: DEFAULT_ID_ATTRIBUTE.to_string(),
        }
    }
}
