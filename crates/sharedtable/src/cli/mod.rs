//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;

use crate::config::{Config, DEFAULT_REGION, DEFAULT_TABLE_NAME};

/// Read and write records of logical tables stored in one shared DynamoDB table.
#[derive(Debug, Parser)]
#[command(name = "sharedtable")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Shared physical table name.
    #[arg(long, env = "SHAREDTABLE_TABLE_NAME", default_value = DEFAULT_TABLE_NAME)]
    pub table_name: String,

    /// Physical partition key attribute.
    #[arg(long, env = "SHAREDTABLE_KEY_ATTRIBUTE", default_value = "pk")]
    pub key_attribute: String,

    /// Logical id attribute on records.
    #[arg(long, env = "SHAREDTABLE_ID_ATTRIBUTE", default_value = "id")]
    pub id_attribute: String,

    /// Custom DynamoDB endpoint (e.g. http://localhost:8000).
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// AWS region.
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Use a throwaway in-memory store instead of DynamoDB.
    #[arg(long)]
    pub in_memory: bool,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Emit logs as JSON.
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            table_name: self.table_name.clone(),
            key_attribute: self.key_attribute.clone(),
            id_attribute: self.id_attribute.clone(),
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One compact JSON document per line.
    Json,
    /// Indented JSON.
    #[default]
    Pretty,
}

impl OutputFormat {
    pub fn render(&self, value: &Value) -> String {
        match self {
            OutputFormat::Json => value.to_string(),
            OutputFormat::Pretty => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Get a record by logical id.
    Get {
        /// Logical table name.
        table: String,
        /// Logical id.
        id: String,
    },
    /// Write a full record (JSON object), printing the record it replaced.
    Put {
        /// Logical table name.
        table: String,
        /// Record as a JSON object.
        record: String,
        /// Only write if no record exists under the key yet.
        #[arg(long)]
        create_only: bool,
    },
    /// Overwrite some attributes of a record, printing the result.
    Update {
        /// Logical table name.
        table: String,
        /// Logical id.
        id: String,
        /// Attributes to overwrite as a JSON object.
        attributes: String,
    },
    /// Delete a record, printing it as it was.
    Delete {
        /// Logical table name.
        table: String,
        /// Logical id.
        id: String,
    },
    /// Run a query described as JSON and print every matching record.
    Query {
        /// Query descriptor, e.g.
        /// '{"keyConditionExpression":"pk = :pk","expressionAttributeValues":{":pk":"users|1"}}'
        descriptor: String,
        /// Page-size hint sent with every page request.
        #[arg(long)]
        page_size: Option<i32>,
        /// Stop after this many records.
        #[arg(long)]
        max_items: Option<usize>,
    },
    /// Shared table management.
    Table(TableCommand),
}

/// Shared table management commands.
#[derive(Debug, Parser)]
pub struct TableCommand {
    #[command(subcommand)]
    pub action: TableAction,
}

/// Available table actions.
#[derive(Debug, Subcommand)]
pub enum TableAction {
    /// Create the shared table and wait until it is active.
    Create,
    /// Show the shared table status.
    Status,
}
