//! Backing store implementations.
//!
//! - `dynamodb`: Amazon DynamoDB through `aws-sdk-dynamodb`
//! - `inmemory`: process-local store for tests and dry runs

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbStore;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryStore;
