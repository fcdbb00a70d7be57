//! In-memory storage backend.

mod error;
mod expression;
mod store;

pub use error::InMemoryError;
pub use store::InMemoryStore;
