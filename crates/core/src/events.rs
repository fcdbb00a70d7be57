//! Structured events emitted around every accessor call.

use std::fmt;

use serde_json::Value;

/// Event names emitted by the accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Get,
    GetResult,
    GetError,
    Put,
    PutError,
    Update,
    UpdateError,
    Delete,
    DeleteError,
    QueryOnce,
    QueryOnceError,
    Query,
    QueryError,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::Get => "get",
            Event::GetResult => "get:result",
            Event::GetError => "get:error",
            Event::Put => "put",
            Event::PutError => "put:error",
            Event::Update => "update",
            Event::UpdateError => "update:error",
            Event::Delete => "delete",
            Event::DeleteError => "delete:error",
            Event::QueryOnce => "queryOnce",
            Event::QueryOnceError => "queryOnce:error",
            Event::Query => "query",
            Event::QueryError => "query:error",
        }
    }

    /// The `<op>:error` counterpart of an entry event.
    pub fn error(&self) -> Event {
        match self {
            Event::Get | Event::GetResult | Event::GetError => Event::GetError,
            Event::Put | Event::PutError => Event::PutError,
            Event::Update | Event::UpdateError => Event::UpdateError,
            Event::Delete | Event::DeleteError => Event::DeleteError,
            Event::QueryOnce | Event::QueryOnceError => Event::QueryOnceError,
            Event::Query | Event::QueryError => Event::QueryError,
        }
    }

    pub fn is_error(&self) -> bool {
        self.as_str().ends_with(":error")
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives accessor events. Must not fail; the return value is ignored.
pub trait EventSink: Send + Sync {
    fn log(&self, event: Event, payload: &Value);
}

impl<F> EventSink for F
where
    F: Fn(Event, &Value) + Send + Sync,
{
    fn log(&self, event: Event, payload: &Value) {
        self(event, payload)
    }
}
