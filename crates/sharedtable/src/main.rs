//! sharedtable CLI entry point.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use futures_util::{pin_mut, StreamExt};
use serde_json::Value;
use sharedtable::cli::{Cli, Commands, OutputFormat, TableAction};
use sharedtable::logging::init_tracing;
use sharedtable::storage::dynamodb::{create_client, create_table, table_status, AwsConfig};
use sharedtable::storage::{DynamoDbStore, InMemoryStore};
use sharedtable::{DocumentStore, PutOptions, QueryDescriptor, TableAccessor};
use sharedtable_core::table::{item_to_json, json_to_item, Item};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = cli.config();
    let aws = AwsConfig {
        endpoint_url: cli.endpoint_url.clone(),
        region: cli.region.clone(),
    };
    let format = cli.format;

    let store: Arc<dyn DocumentStore> = if cli.in_memory {
        tracing::info!("using in-memory store");
        Arc::new(InMemoryStore::with_key_attribute(&config.key_attribute))
    } else {
        tracing::info!(
            endpoint = aws.endpoint_url.as_deref().unwrap_or("default"),
            region = %aws.region,
            table = %config.table_name,
            "using DynamoDB"
        );
        Arc::new(DynamoDbStore::connect(&aws).await)
    };

    match cli.command {
        Commands::Get { table, id } => {
            let accessor = TableAccessor::new(store, &config, table);
            let item = accessor.get(id).await?;
            print(format, &optional(item));
        }
        Commands::Put {
            table,
            record,
            create_only,
        } => {
            let accessor = TableAccessor::new(store, &config, table);
            let record = parse_item(&record).context("invalid record")?;
            let options = if create_only {
                PutOptions::default()
                    .condition("attribute_not_exists(#k)")
                    .name("#k", accessor.key_attribute())
            } else {
                PutOptions::default()
            };
            let previous = accessor.put_with(record, options).await?;
            print(format, &optional(previous));
        }
        Commands::Update {
            table,
            id,
            attributes,
        } => {
            let accessor = TableAccessor::new(store, &config, table);
            let partial = parse_item(&attributes).context("invalid attributes")?;
            let updated = accessor.update(id, partial).await?;
            print(format, &item_to_json(&updated));
        }
        Commands::Delete { table, id } => {
            let accessor = TableAccessor::new(store, &config, table);
            let removed = accessor.delete(id).await?;
            print(format, &optional(removed));
        }
        Commands::Query {
            descriptor,
            page_size,
            max_items,
        } => {
            let value: Value = serde_json::from_str(&descriptor).context("invalid descriptor")?;
            let mut descriptor =
                QueryDescriptor::from_json(&value).context("invalid descriptor")?;
            if page_size.is_some() {
                descriptor.limit = page_size;
            }

            // Query descriptors address physical keys, so the logical table is unused.
            let accessor = TableAccessor::new(store, &config, "");
            let records = accessor.query(descriptor).take(max_items.unwrap_or(usize::MAX));
            pin_mut!(records);

            let mut count = 0usize;
            while let Some(record) = records.next().await {
                print(format, &item_to_json(&record?));
                count += 1;
            }
            tracing::info!(count, "query finished");
        }
        Commands::Table(table_cmd) => {
            if cli.in_memory {
                bail!("table management needs DynamoDB; drop --in-memory");
            }
            let client = create_client(&aws).await;
            match table_cmd.action {
                TableAction::Create => {
                    create_table(&client, &config.table_name, &config.key_attribute).await?;
                    println!("Created table {}", config.table_name);
                }
                TableAction::Status => match table_status(&client, &config.table_name).await? {
                    Some(status) => println!("{}: {}", config.table_name, status.as_str()),
                    None => println!("{}: not found", config.table_name),
                },
            }
        }
    }

    Ok(())
}

fn parse_item(input: &str) -> Result<Item> {
    let value: Value = serde_json::from_str(input)?;
    Ok(json_to_item(&value)?)
}

fn optional(item: Option<Item>) -> Value {
    item.as_ref().map(item_to_json).unwrap_or(Value::Null)
}

fn print(format: OutputFormat, value: &Value) {
    println!("{}", format.render(value));
}
