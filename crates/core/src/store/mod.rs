mod error;
mod traits;

pub use error::{AccessorError, Result, StoreFault, StoreResult};
pub use traits::{
    DeleteItemRequest, DocumentStore, GetItemRequest, PutItemRequest, QueryRequest,
    UpdateItemRequest,
};
