//! Tracing integration.

use serde_json::Value;
use sharedtable_core::events::{Event, EventSink};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Event sink forwarding accessor events to `tracing`.
///
/// `*:error` events are logged at error level, `get:result` at trace level
/// and every request at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn log(&self, event: Event, payload: &Value) {
        if event.is_error() {
            tracing::error!(event = %event, %payload, "table accessor call failed");
        } else if event == Event::GetResult {
            tracing::trace!(event = %event, %payload, "table accessor result");
        } else {
            tracing::debug!(event = %event, %payload, "table accessor call");
        }
    }
}

/// Install the global tracing subscriber.
///
/// Honours `RUST_LOG`, defaulting to `sharedtable=info`.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sharedtable=info".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;
    use tracing::field::{Field, Visit};
    use tracing::{Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer};

    use super::*;

    type Captured = Arc<Mutex<Vec<(Level, String)>>>;

    /// Records the level and `event` field of every tracing event.
    struct CaptureLayer(Captured);

    #[derive(Default)]
    struct EventName(String);

    impl Visit for EventName {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "event" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut name = EventName::default();
            event.record(&mut name);
            self.0
                .lock()
                .unwrap()
                .push((*event.metadata().level(), name.0));
        }
    }

    #[test]
    fn test_tracing_sink_levels() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry().with(CaptureLayer(captured.clone()));

        tracing::subscriber::with_default(subscriber, || {
            let payload = json!({ "key": { "pk": "users|1" } });
            TracingSink.log(Event::Get, &payload);
            TracingSink.log(Event::GetResult, &payload);
            TracingSink.log(Event::GetError, &payload);
            TracingSink.log(Event::QueryOnce, &payload);
            TracingSink.log(Event::QueryError, &payload);
        });

        assert_eq!(
            *captured.lock().unwrap(),
            vec![
                (Level::DEBUG, "get".to_string()),
                (Level::TRACE, "get:result".to_string()),
                (Level::ERROR, "get:error".to_string()),
                (Level::DEBUG, "queryOnce".to_string()),
                (Level::ERROR, "query:error".to_string()),
            ]
        );
    }
}
