// In crates/analytics/src/lib.rs

pub mod calibration;
pub mod direction;
pub mod engine;
pub mod format;
pub mod insights;
pub mod tiers;
pub mod types;
pub mod view;

// Re-export the most important types for easy access.
pub use calibration::{CalibrationAnalyzer, CALIBRATION_MARGIN};
pub use engine::AggregationEngine;
pub use types::{
    BacktestSnapshot, CalibrationReport, DashboardView, DerivedStats, DirectionBreakdown,
    RawBacktestData,
};
pub use view::compute_view;
