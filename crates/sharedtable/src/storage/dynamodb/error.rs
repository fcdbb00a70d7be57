//! Error types for table provisioning.
//!
//! Record operations never use these: their faults travel unchanged as
//! `StoreFault`s.

use thiserror::Error;

/// Result type alias for provisioning operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Errors that can occur while provisioning the shared table.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    #[error("Table '{table_name}' already exists")]
    TableExists { table_name: String },

    #[error("Timeout waiting for table '{table_name}' to become active")]
    TableActivationTimeout { table_name: String },
}
