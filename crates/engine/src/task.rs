use api_client::DataProvider;
use events::SlotKind;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// A self-contained task that keeps one input slot filled from the provider.
pub struct SlotTask {
    kind: SlotKind,
    provider: Arc<dyn DataProvider>,
    tx: watch::Sender<Value>,
    refresh: Option<Duration>,
}

impl SlotTask {
    pub fn new(
        kind: SlotKind,
        provider: Arc<dyn DataProvider>,
        tx: watch::Sender<Value>,
        refresh: Option<Duration>,
    ) -> Self {
        Self {
            kind,
            provider,
            tx,
            refresh,
        }
    }

    /// Fetches once, or forever on the refresh period.
    ///
    /// A successful fetch replaces the slot wholesale. A failed one leaves the
    /// previous value in place.
    pub async fn run(self) {
        tracing::info!(slot = ?self.kind, provider = self.provider.name(), "Starting slot task.");

        loop {
            let result = match self.kind {
                SlotKind::Returns => self.provider.fetch_returns().await,
                SlotKind::Stats => self.provider.fetch_global_stats().await,
            };

            match result {
                Ok(value) => {
                    tracing::info!(slot = ?self.kind, "Slot updated.");
                    self.tx.send_replace(value);
                }
                Err(e) => {
                    tracing::warn!(slot = ?self.kind, error = %e, "Fetch failed. Keeping the previous snapshot.");
                }
            }

            match self.refresh {
                Some(period) => tokio::time::sleep(period).await,
                None => break,
            }
        }

        tracing::info!(slot = ?self.kind, "Slot task finished.");
    }
}
