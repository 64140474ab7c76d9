// In app/src/tracing_layer.rs

use chrono::Utc;
use events::{WsCache, WsLogMessage, WsMessage};
use tokio::sync::broadcast;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;

/// Forwards every log event to WebSocket clients and the replay cache.
pub struct WsBroadcastLayer {
    tx: broadcast::Sender<WsMessage>,
    cache: WsCache,
}

impl WsBroadcastLayer {
    pub fn new(tx: broadcast::Sender<WsMessage>, cache: WsCache) -> Self {
        Self { tx, cache }
    }
}

impl<S> Layer<S> for WsBroadcastLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = LogMessageVisitor::default();
        event.record(&mut visitor);
        let msg = WsMessage::Log(WsLogMessage {
            timestamp: Utc::now(),
            level: event.metadata().level().to_string(),
            message: visitor.render(),
        });
        // No connected clients is fine.
        let _ = self.tx.send(msg.clone());
        events::push_cached(&self.cache, msg);
    }
}

/// Captures the `message` field plus any structured fields as `key=value`.
#[derive(Default)]
struct LogMessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl LogMessageVisitor {
    fn render(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl tracing::field::Visit for LogMessageVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::prelude::*;

    #[test]
    fn log_events_reach_clients_and_cache() {
        let (tx, mut rx) = broadcast::channel(16);
        let cache = events::new_cache();
        let subscriber = tracing_subscriber::registry().with(WsBroadcastLayer::new(tx, cache.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(slot = "stats", "Fetch failed.");
        });

        match rx.try_recv().unwrap() {
            WsMessage::Log(log) => {
                assert_eq!(log.level, "WARN");
                assert_eq!(log.message, "Fetch failed. slot=stats");
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert_eq!(events::cached_messages(&cache).len(), 1);
    }
}
