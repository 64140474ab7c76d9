// In crates/analytics/src/tiers.rs

use serde::Serialize;
use std::fmt;

/// Qualitative reading of the Sharpe ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Good,
    Acceptable,
    Poor,
}

/// Qualitative reading of the win rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WinRateTier {
    #[serde(rename = "strong")]
    Strong,
    #[serde(rename = "slightly positive")]
    SlightlyPositive,
    #[serde(rename = "needs improvement")]
    NeedsImprovement,
}

/// Qualitative reading of the maximum drawdown magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawdownTier {
    Low,
    Moderate,
    High,
}

/// Good above 1.0, acceptable above 0.5, poor otherwise. Both bounds are strict.
pub fn risk_tier(sharpe: f64) -> RiskTier {
    if sharpe > 1.0 {
        RiskTier::Good
    } else if sharpe > 0.5 {
        RiskTier::Acceptable
    } else {
        RiskTier::Poor
    }
}

pub fn win_rate_tier(win_rate: f64) -> WinRateTier {
    if win_rate > 0.55 {
        WinRateTier::Strong
    } else if win_rate > 0.5 {
        WinRateTier::SlightlyPositive
    } else {
        WinRateTier::NeedsImprovement
    }
}

/// Takes the drawdown magnitude; the sign is ignored.
pub fn drawdown_tier(max_drawdown: f64) -> DrawdownTier {
    let magnitude = max_drawdown.abs();
    if magnitude < 0.15 {
        DrawdownTier::Low
    } else if magnitude < 0.25 {
        DrawdownTier::Moderate
    } else {
        DrawdownTier::High
    }
}

impl RiskTier {
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Good => "good",
            RiskTier::Acceptable => "acceptable",
            RiskTier::Poor => "poor",
        }
    }
}

impl WinRateTier {
    pub fn label(&self) -> &'static str {
        match self {
            WinRateTier::Strong => "strong",
            WinRateTier::SlightlyPositive => "slightly positive",
            WinRateTier::NeedsImprovement => "needs improvement",
        }
    }
}

impl DrawdownTier {
    pub fn label(&self) -> &'static str {
        match self {
            DrawdownTier::Low => "low",
            DrawdownTier::Moderate => "moderate",
            DrawdownTier::High => "high",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for WinRateTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for DrawdownTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
