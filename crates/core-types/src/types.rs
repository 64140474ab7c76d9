// In crates/core-types/src/types.rs

use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A unique instrument identifier (e.g., "AAPL").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(pub String);

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One point of the portfolio's cumulative return curve.
///
/// The provider serializes its dataframe columns as-is, so both the
/// capitalized column names and camelCase keys are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReturn {
    #[serde(alias = "Date", deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    #[serde(alias = "CumulativeReturn")]
    pub cumulative_return: f64,
    /// Equal-weighted portfolio return for the day.
    #[serde(default, alias = "DailyReturn_EqualWeight", skip_serializing_if = "Option::is_none")]
    pub daily_return: Option<f64>,
    /// Number of positions actually traded that day.
    #[serde(default, alias = "ActivePositions", skip_serializing_if = "Option::is_none")]
    pub active_positions: Option<u32>,
}

impl DailyReturn {
    pub fn validate(&self) -> Result<()> {
        ensure_finite("cumulativeReturn", self.cumulative_return)?;
        if let Some(daily) = self.daily_return {
            ensure_finite("dailyReturn", daily)?;
        }
        Ok(())
    }
}

/// Backtest outcome for a single instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPerformance {
    pub ticker: Ticker,
    pub trades: u32,
    pub win_rate: f64,
    pub avg_return: f64,
    pub sharpe: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_return: Option<f64>,
}

impl StockPerformance {
    pub fn validate(&self) -> Result<()> {
        if self.ticker.0.trim().is_empty() {
            return Err(Error::EmptyField { field: "ticker" });
        }
        ensure_fraction("winRate", self.win_rate)?;
        ensure_finite("avgReturn", self.avg_return)?;
        ensure_finite("sharpe", self.sharpe)?;
        if let Some(total) = self.total_return {
            ensure_finite("totalReturn", total)?;
        }
        Ok(())
    }
}

/// Realized accuracy of the predictions falling in one confidence range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBucket {
    /// The confidence range, e.g. "0.5-0.6".
    #[serde(alias = "confidence")]
    pub label: String,
    pub accuracy: f64,
    pub count: u32,
    pub avg_return: f64,
}

impl ConfidenceBucket {
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(Error::EmptyField { field: "label" });
        }
        ensure_fraction("accuracy", self.accuracy)?;
        ensure_finite("avgReturn", self.avg_return)
    }
}

/// Win/loss counts for one calendar month, split by trade direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStat {
    pub month: String,
    pub long_wins: u32,
    pub long_losses: u32,
    pub short_wins: u32,
    pub short_losses: u32,
    #[serde(rename = "return")]
    pub ret: f64,
}

impl MonthlyStat {
    pub fn validate(&self) -> Result<()> {
        if self.month.trim().is_empty() {
            return Err(Error::EmptyField { field: "month" });
        }
        ensure_finite("return", self.ret)
    }
}

/// The headline statistics of a backtest run.
///
/// Every field is optional: the provider may omit any of them and the
/// absence is kept rather than replaced with an invented value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryStats {
    pub total_return: Option<f64>,
    pub buy_hold_return: Option<f64>,
    pub sharpe: Option<f64>,
    pub win_rate: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub total_trades: Option<u64>,
    pub avg_trade: Option<f64>,
}

/// `SummaryStats` with every absent field rendered as zero, for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSummary {
    pub total_return: f64,
    pub buy_hold_return: f64,
    pub sharpe: f64,
    pub win_rate: f64,
    pub max_drawdown: f64,
    pub total_trades: u64,
    pub avg_trade: f64,
}

impl SummaryStats {
    pub fn resolved(&self) -> ResolvedSummary {
        ResolvedSummary {
            total_return: self.total_return.unwrap_or(0.0),
            buy_hold_return: self.buy_hold_return.unwrap_or(0.0),
            sharpe: self.sharpe.unwrap_or(0.0),
            win_rate: self.win_rate.unwrap_or(0.0),
            max_drawdown: self.max_drawdown.unwrap_or(0.0),
            total_trades: self.total_trades.unwrap_or(0),
            avg_trade: self.avg_trade.unwrap_or(0.0),
        }
    }
}

fn ensure_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::NonFinite { field })
    }
}

fn ensure_fraction(field: &'static str, value: f64) -> Result<()> {
    ensure_finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::FractionOutOfRange { field, value });
    }
    Ok(())
}

/// Accepts both "2025-01-02" and the "2025-01-02 00:00:00" form pandas emits.
fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .map_err(serde::de::Error::custom)
}
