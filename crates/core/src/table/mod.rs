mod json;
mod keys;
mod types;
mod update;

pub use json::{
    attribute_to_json, from_item, item_to_json, json_to_attribute, json_to_item, to_item,
    ConversionError,
};
pub use keys::{logical_id, KeySchema, DEFAULT_ID_ATTRIBUTE, DEFAULT_KEY_ATTRIBUTE, KEY_SEPARATOR};
pub use types::{Item, Key, Page, PutOptions, QueryDescriptor};
pub use update::{build_update, UpdateExpression};
