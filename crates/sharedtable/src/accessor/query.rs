//! Paged queries.

use std::collections::VecDeque;

use futures_util::stream::Stream;
use serde_json::json;
use sharedtable_core::events::Event;
use sharedtable_core::store::{AccessorError, Result};
use sharedtable_core::table::{Item, QueryDescriptor};

use super::TableAccessor;

/// Forward-only cursor over the pages of a query.
///
/// Holds the descriptor with the current continuation token, the items of
/// the page being consumed and whether the store reported the last page.
/// A page is fetched only when the buffered items run out. After a failed
/// fetch the cursor is unchanged, so pulling again retries the same page.
#[derive(Debug)]
pub struct QueryCursor<'a> {
    accessor: &'a TableAccessor,
    descriptor: QueryDescriptor,
    buffer: VecDeque<Item>,
    exhausted: bool,
}

impl<'a> QueryCursor<'a> {
    pub(super) fn new(accessor: &'a TableAccessor, descriptor: QueryDescriptor) -> Self {
        Self {
            accessor,
            descriptor,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Continuation token of the next page to fetch.
    pub fn continuation(&self) -> Option<&Item> {
        self.descriptor.exclusive_start_key.as_ref()
    }

    /// True once the last page was fetched and every item handed out.
    pub fn is_done(&self) -> bool {
        self.exhausted && self.buffer.is_empty()
    }

    /// Returns the next page of items, `None` after the last page.
    ///
    /// Items buffered by [`next_item`](Self::next_item) are returned first as
    /// a page of their own.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Item>>> {
        if !self.buffer.is_empty() {
            return Ok(Some(self.buffer.drain(..).collect()));
        }
        if self.exhausted {
            return Ok(None);
        }

        let page = self.accessor.query_once(self.descriptor.clone()).await?;
        self.exhausted = page.is_last();
        self.descriptor.exclusive_start_key = page.last_evaluated_key;

        Ok(Some(page.items))
    }

    /// Returns the next item, fetching pages as needed.
    pub async fn next_item(&mut self) -> Result<Option<Item>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            match self.next_page().await? {
                Some(items) => self.buffer.extend(items),
                None => return Ok(None),
            }
        }
    }
}

impl TableAccessor {
    /// Lazily yields every record matching the query, page by page.
    ///
    /// Nothing is fetched until the stream is polled. Pages are requested
    /// one at a time by re-issuing the descriptor with the continuation
    /// token, so dropping the stream early skips the remaining pages. The
    /// stream ends after the first fault.
    pub fn query(
        &self,
        descriptor: QueryDescriptor,
    ) -> impl Stream<Item = Result<Item>> + Send + '_ {
        async_stream::stream! {
            self.emit(Event::Query, descriptor.to_json());
            let mut cursor = self.cursor(descriptor);

            loop {
                match cursor.next_item().await {
                    Ok(Some(item)) => yield Ok(item),
                    Ok(None) => break,
                    Err(error) => {
                        self.emit(Event::QueryError, json!({ "error": error_message(&error) }));
                        yield Err(error);
                        break;
                    }
                }
            }
        }
    }
}

fn error_message(error: &AccessorError) -> String {
    match error.store_fault() {
        Some(fault) => fault.to_string(),
        None => error.to_string(),
    }
}
