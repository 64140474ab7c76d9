use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The portfolio construction the backtest was run with.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Long the top 20% of predictions.
    LongOnly,
    /// Long the top 20% and short the bottom 20%.
    #[default]
    LongShort,
    /// Long a fixed number of top-ranked stocks.
    TopN,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::LongOnly => "long-only",
            StrategyKind::LongShort => "long-short",
            StrategyKind::TopN => "top-n",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "long-only" => Ok(StrategyKind::LongOnly),
            "long-short" => Ok(StrategyKind::LongShort),
            "top-n" => Ok(StrategyKind::TopN),
            other => Err(Error::UnknownStrategy(other.to_string())),
        }
    }
}

/// Presentation parameters passed explicitly into every view query.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewParams {
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

impl ViewParams {
    pub fn new(strategy: StrategyKind, confidence_threshold: f64) -> Result<Self> {
        let params = Self {
            strategy,
            confidence_threshold,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks that the threshold is a usable confidence value.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::InvalidThreshold(self.confidence_threshold));
        }
        Ok(())
    }
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

fn default_confidence_threshold() -> f64 {
    0.6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_round_trips_through_its_label() {
        for kind in [StrategyKind::LongOnly, StrategyKind::LongShort, StrategyKind::TopN] {
            assert_eq!(kind.as_str().parse::<StrategyKind>().unwrap(), kind);
        }
        assert!("momentum".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        assert!(ViewParams::new(StrategyKind::LongOnly, 0.75).is_ok());
        assert_eq!(
            ViewParams::new(StrategyKind::LongOnly, 1.5),
            Err(Error::InvalidThreshold(1.5))
        );
        assert!(ViewParams::new(StrategyKind::LongOnly, f64::NAN).is_err());
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: ViewParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, ViewParams::default());

        let params: ViewParams =
            serde_json::from_str(r#"{"strategy":"top-n","confidenceThreshold":0.8}"#).unwrap();
        assert_eq!(params.strategy, StrategyKind::TopN);
        assert_eq!(params.confidence_threshold, 0.8);
    }
}
