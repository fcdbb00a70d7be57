//! Core types and pure functions for sharedtable.
//!
//! Everything in this crate is free of I/O: key formatting, update expression
//! building, the JSON bridge for items, event names, and the traits that the
//! imperative shell implements (`DocumentStore`, `EventSink`).

pub mod events;
pub mod store;
pub mod table;
