// In crates/engine/src/lib.rs

pub mod task;

use crate::task::SlotTask;
use analytics::{compute_view, RawBacktestData};
use anyhow::Result;
use api_client::DataProvider;
use chrono::Utc;
use core_types::ViewParams;
use events::{SlotKind, WsMessage, WsSnapshotUpdate};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

/// Keeps the latest backtest inputs current and republishes them on every change.
///
/// The returns and stats slots are filled by independent tasks. Neither
/// waits for the other; every update of either slot triggers a pure
/// recompute over the latest value of both.
pub struct DashboardEngine {
    provider: Arc<dyn DataProvider>,
    params: ViewParams,
    refresh: Option<Duration>,
    confidence_analysis: Value,
    monthly_stats: Value,
    snapshot_tx: watch::Sender<Arc<RawBacktestData>>,
    ws_tx: broadcast::Sender<WsMessage>,
}

impl DashboardEngine {
    pub fn new(
        provider: Arc<dyn DataProvider>,
        params: ViewParams,
        refresh: Option<Duration>,
        ws_tx: broadcast::Sender<WsMessage>,
    ) -> Self {
        let confidence_analysis = api_client::reference::confidence_analysis();
        let monthly_stats = api_client::reference::monthly_stats();

        // Subscribers see the empty-but-valid initial state until a slot resolves.
        let initial = RawBacktestData {
            confidence_analysis: confidence_analysis.clone(),
            monthly_stats: monthly_stats.clone(),
            ..RawBacktestData::default()
        };
        let (snapshot_tx, _) = watch::channel(Arc::new(initial));

        Self {
            provider,
            params,
            refresh,
            confidence_analysis,
            monthly_stats,
            snapshot_tx,
            ws_tx,
        }
    }

    /// Replaces the locally constructed bucket and monthly collections.
    pub fn with_reference_data(mut self, confidence_analysis: Value, monthly_stats: Value) -> Self {
        self.confidence_analysis = confidence_analysis;
        self.monthly_stats = monthly_stats;
        let current = RawBacktestData::clone(&self.snapshot_tx.borrow());
        self.snapshot_tx.send_replace(Arc::new(RawBacktestData {
            confidence_analysis: self.confidence_analysis.clone(),
            monthly_stats: self.monthly_stats.clone(),
            ..current
        }));
        self
    }

    /// A receiver that always holds the latest combined inputs.
    pub fn subscribe(&self) -> watch::Receiver<Arc<RawBacktestData>> {
        self.snapshot_tx.subscribe()
    }

    /// Spawns both slot tasks and recomputes on every slot update.
    ///
    /// Returns once both tasks have finished. The last snapshot stays
    /// available to subscribers afterwards.
    pub async fn run(&self) -> Result<()> {
        tracing::info!("Initializing dashboard engine...");

        let (returns_tx, mut returns_rx) = watch::channel(Value::Null);
        let (stats_tx, mut stats_rx) = watch::channel(Value::Null);

        let returns_task = SlotTask::new(SlotKind::Returns, self.provider.clone(), returns_tx, self.refresh);
        let stats_task = SlotTask::new(SlotKind::Stats, self.provider.clone(), stats_tx, self.refresh);
        tokio::spawn(returns_task.run());
        tokio::spawn(stats_task.run());

        let mut returns_open = true;
        let mut stats_open = true;

        while returns_open || stats_open {
            tokio::select! {
                changed = returns_rx.changed(), if returns_open => match changed {
                    Ok(()) => self.recompute(SlotKind::Returns, &returns_rx, &stats_rx),
                    Err(_) => returns_open = false,
                },
                changed = stats_rx.changed(), if stats_open => match changed {
                    Ok(()) => self.recompute(SlotKind::Stats, &returns_rx, &stats_rx),
                    Err(_) => stats_open = false,
                },
            }
        }

        tracing::info!("All slot tasks have finished. Holding the last snapshot.");
        Ok(())
    }

    fn recompute(
        &self,
        slot: SlotKind,
        returns_rx: &watch::Receiver<Value>,
        stats_rx: &watch::Receiver<Value>,
    ) {
        let raw = Arc::new(RawBacktestData {
            returns: returns_rx.borrow().clone(),
            stats: stats_rx.borrow().clone(),
            confidence_analysis: self.confidence_analysis.clone(),
            monthly_stats: self.monthly_stats.clone(),
        });

        let view = compute_view(&raw, &self.params);
        self.snapshot_tx.send_replace(raw);

        tracing::info!(
            ?slot,
            daily_returns = view.snapshot.daily_returns.len(),
            stocks = view.snapshot.stock_performance.len(),
            "Dashboard recomputed."
        );

        // No connected clients is fine.
        let _ = self.ws_tx.send(WsMessage::SnapshotUpdated(Box::new(WsSnapshotUpdate {
            timestamp: Utc::now(),
            slot,
            view,
        })));
    }
}
