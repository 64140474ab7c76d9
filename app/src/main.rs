// In app/src/main.rs

use analytics::format::{fixed, percent};
use analytics::types::{CalibrationVerdict, Comparison};
use analytics::{compute_view, DashboardView, RawBacktestData};
use anyhow::{Context, Result};
use api_client::DataProvider;
use app_config::types::Settings;
use clap::{Args, Parser, Subcommand};
use core_types::{StrategyKind, ViewParams};
use engine::DashboardEngine;
use events::WsMessage;
use serde_json::Value;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing_subscriber::prelude::*;

use self::tracing_layer::WsBroadcastLayer;
mod tracing_layer;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Analytics core for a backtest results dashboard.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Keeps the dashboard current from the provider and serves it over HTTP.
    Serve,

    /// Computes the dashboard once and prints it.
    Report(ReportArgs),
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Read the returns slot from this JSON file instead of the provider.
    #[arg(long)]
    returns_file: Option<PathBuf>,

    /// Read the stats slot from this JSON file instead of the provider.
    #[arg(long)]
    stats_file: Option<PathBuf>,

    /// Overrides the configured strategy (long-only, long-short, top-n).
    #[arg(long)]
    strategy: Option<StrategyKind>,

    /// Overrides the configured confidence threshold, as a fraction.
    #[arg(long)]
    threshold: Option<f64>,

    /// Print the whole view as JSON.
    #[arg(long)]
    json: bool,
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = app_config::load_settings()?;

    // --- WebSocket and Tracing Setup ---
    let (ws_tx, _) = broadcast::channel::<WsMessage>(1024);
    let ws_cache = events::new_cache();
    let ws_layer = WsBroadcastLayer::new(ws_tx.clone(), ws_cache.clone());
    let default_level = settings
        .app
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("hyper", tracing::Level::WARN)
            .with_target("reqwest", tracing::Level::WARN)
            .with_default(default_level),
    );
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(ws_layer)
        .init();

    tracing::info!(environment = %settings.app.environment, "Starting backtest dashboard");

    match cli.command {
        Commands::Serve => {
            run_serve(settings, ws_tx, ws_cache).await?;
        }
        Commands::Report(args) => {
            handle_report(&settings, args).await?;
        }
    }

    tracing::info!("Backtest dashboard has finished successfully.");

    Ok(())
}

// --- "Serve" Subcommand Logic ---

/// Runs the slot tasks and the web server until one of them stops.
async fn run_serve(
    settings: Settings,
    ws_tx: broadcast::Sender<WsMessage>,
    ws_cache: events::WsCache,
) -> Result<()> {
    let params = settings.dashboard.view_params()?;
    let provider: Arc<dyn DataProvider> = Arc::new(api_client::new(&settings.provider)?);
    let refresh = settings
        .provider
        .refresh_interval_secs
        .map(Duration::from_secs);

    let dashboard_engine = Arc::new(DashboardEngine::new(provider, params, refresh, ws_tx.clone()));
    let app_state = web_server::AppState {
        snapshot_rx: dashboard_engine.subscribe(),
        default_params: params,
        ws_tx,
        ws_cache,
    };

    tracing::info!("Launching concurrent dashboard engine and web server tasks...");

    let engine_handle = tokio::spawn({
        let dashboard_engine = dashboard_engine.clone();
        async move { dashboard_engine.run().await }
    });
    let mut server_handle = tokio::spawn(web_server::run(settings.server, app_state));

    tokio::select! {
        engine_result = engine_handle => {
            match engine_result {
                // One-shot fetches finished; the last snapshot keeps being served.
                Ok(Ok(())) => tracing::info!("Dashboard engine finished. Serving the last snapshot."),
                other => tracing::error!(?other, "Dashboard engine task has terminated unexpectedly."),
            }
        }
        server_result = &mut server_handle => {
            tracing::error!(?server_result, "Web server task has terminated unexpectedly.");
            anyhow::bail!("The web server terminated. Shutting down.");
        }
    }

    let server_result = server_handle.await;
    tracing::error!(?server_result, "Web server task has terminated unexpectedly.");
    anyhow::bail!("The web server terminated. Shutting down.");
}

// --- "Report" Subcommand Logic ---

/// Handles the logic for the `report` subcommand.
async fn handle_report(settings: &Settings, args: ReportArgs) -> Result<()> {
    let defaults = settings.dashboard.view_params()?;
    let params = ViewParams::new(
        args.strategy.unwrap_or(defaults.strategy),
        args.threshold.unwrap_or(defaults.confidence_threshold),
    )?;

    let provider = api_client::new(&settings.provider)?;

    // Each slot comes from its file when given, otherwise from the provider.
    let (returns, stats) = tokio::join!(
        load_slot(args.returns_file.as_deref(), "returns", provider.fetch_returns()),
        load_slot(args.stats_file.as_deref(), "stats", provider.fetch_global_stats()),
    );

    let raw = RawBacktestData {
        returns: returns?,
        stats: stats?,
        confidence_analysis: api_client::reference::confidence_analysis(),
        monthly_stats: api_client::reference::monthly_stats(),
    };
    let view = compute_view(&raw, &params);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render_report(&view)?);
    }
    Ok(())
}

/// Reads a slot from disk, or fetches it. A failed fetch or unparsable file
/// leaves the slot empty, the same as a provider that never answered.
async fn load_slot(
    file: Option<&Path>,
    slot: &'static str,
    fetch: impl std::future::Future<Output = api_client::Result<Value>>,
) -> Result<Value> {
    match file {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {} file {}", slot, path.display()))?;
            Ok(parse_slot(&text, slot))
        }
        None => match fetch.await {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(slot, error = %e, "Fetch failed. Rendering the slot as empty.");
                Ok(Value::Null)
            }
        },
    }
}

fn parse_slot(text: &str, slot: &'static str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|e| {
        tracing::warn!(slot, error = %e, "File is not valid JSON. Rendering the slot as empty.");
        Value::Null
    })
}

/// Renders the dashboard as a plain-text summary.
fn render_report(view: &DashboardView) -> std::result::Result<String, std::fmt::Error> {
    let summary = &view.display_summary;
    let derived = &view.derived;
    let mut out = String::new();

    writeln!(out, "\n--- Backtest Dashboard ---")?;
    writeln!(
        out,
        "Strategy: {} | Confidence threshold: {}",
        view.params.strategy,
        percent(view.params.confidence_threshold, 0)
    )?;
    writeln!(out, "--------------------------")?;
    writeln!(
        out,
        "  - Return: {} | Buy & Hold: {} | Outperformance: {}",
        percent(summary.total_return, 2),
        percent(summary.buy_hold_return, 2),
        percent(derived.outperformance, 2)
    )?;
    writeln!(
        out,
        "  - Sharpe: {} ({}) | Win Rate: {} ({}) | Max Drawdown: {} ({})",
        fixed(summary.sharpe, 2),
        derived.risk_tier,
        percent(summary.win_rate, 1),
        derived.win_rate_tier,
        percent(summary.max_drawdown, 2),
        derived.drawdown_tier
    )?;
    writeln!(
        out,
        "  - Trades: {} | Avg Trade: {}",
        summary.total_trades,
        percent(summary.avg_trade, 3)
    )?;

    let returns = &view.snapshot.daily_returns;
    match (returns.first(), returns.last()) {
        (Some(first), Some(last)) => writeln!(
            out,
            "  - Daily returns: {} days, {} to {}, cumulative {}",
            returns.len(),
            first.date,
            last.date,
            percent(last.cumulative_return, 2)
        )?,
        _ => writeln!(out, "  - Daily returns: none")?,
    }

    writeln!(out, "\nTop 5 Stocks by Average Return:")?;
    if view.snapshot.stock_performance.is_empty() {
        writeln!(out, "  (no stock data)")?;
    }
    for (i, stock) in view.snapshot.stock_performance.iter().take(5).enumerate() {
        writeln!(
            out,
            "  [{}] {} | Avg: {} | Win Rate: {} | Sharpe: {} | Trades: {}",
            i + 1,
            stock.ticker.0,
            percent(stock.avg_return, 3),
            percent(stock.win_rate, 1),
            fixed(stock.sharpe, 2),
            stock.trades
        )?;
    }

    let calibration = &view.calibration;
    writeln!(
        out,
        "\nCalibration: lowest bucket {} vs highest {} ({}, {})",
        percent(calibration.low_accuracy, 1),
        percent(calibration.high_accuracy, 1),
        match calibration.comparison {
            Comparison::Better => "better",
            Comparison::Similar => "similar",
        },
        match calibration.verdict {
            CalibrationVerdict::Good => "good",
            CalibrationVerdict::NeedsWork => "needs work",
        }
    )?;
    writeln!(
        out,
        "  - Buckets at or above threshold: {}",
        view.buckets_above_threshold
            .iter()
            .map(|bucket| bucket.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    )?;

    let totals = &view.direction.totals;
    writeln!(
        out,
        "  - Long win rate: {} | Short win rate: {}",
        percent(totals.long_win_rate, 1),
        percent(totals.short_win_rate, 1)
    )?;

    writeln!(out, "\nInsights:")?;
    for insight in &view.insights {
        writeln!(out, "  - {}", insight)?;
    }
    writeln!(out, "\n--------------------------")?;

    Ok(out)
}
