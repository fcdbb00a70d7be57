//! Logical tables on top of one shared DynamoDB table.
//!
//! [`TableAccessor`] maps record get/put/update/delete/query calls onto a
//! single physical table, prefixing every partition key with the logical
//! table name. Backing stores live in [`storage`].

pub mod accessor;
pub mod cli;
pub mod config;
pub mod logging;
pub mod storage;

pub use accessor::{QueryCursor, TableAccessor};
pub use config::Config;
pub use logging::TracingSink;
pub use sharedtable_core::events::{Event, EventSink};
pub use sharedtable_core::store::{AccessorError, DocumentStore, Result, StoreFault};
pub use sharedtable_core::table::{Item, Key, Page, PutOptions, QueryDescriptor};
