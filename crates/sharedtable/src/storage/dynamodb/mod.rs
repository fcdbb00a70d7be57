//! DynamoDB storage backend.
//!
//! Implements [`DocumentStore`](sharedtable_core::store::DocumentStore) on top
//! of `aws-sdk-dynamodb`, plus client setup and provisioning of the shared
//! physical table.

mod client;
mod error;
mod store;
mod table;

pub use client::{create_client, AwsConfig};
pub use error::{ProvisionError, Result};
pub use store::DynamoDbStore;
pub use table::{create_table, table_status};
