// In crates/analytics/src/direction.rs

use crate::types::{DirectionBreakdown, DirectionTotals, MonthlyDirection};
use core_types::MonthlyStat;

/// Splits monthly outcomes by trade direction and totals them.
///
/// Counts are summed as `u64` so any `u32` input is representable.
pub fn breakdown(months: &[MonthlyStat]) -> DirectionBreakdown {
    let mut totals = DirectionTotals::default();

    let months = months
        .iter()
        .map(|m| {
            totals.long_wins += u64::from(m.long_wins);
            totals.long_losses += u64::from(m.long_losses);
            totals.short_wins += u64::from(m.short_wins);
            totals.short_losses += u64::from(m.short_losses);

            MonthlyDirection {
                month: m.month.clone(),
                long_trades: u64::from(m.long_wins) + u64::from(m.long_losses),
                short_trades: u64::from(m.short_wins) + u64::from(m.short_losses),
                long_win_rate: win_rate(m.long_wins.into(), m.long_losses.into()),
                short_win_rate: win_rate(m.short_wins.into(), m.short_losses.into()),
                ret: m.ret,
            }
        })
        .collect();

    totals.long_win_rate = win_rate(totals.long_wins, totals.long_losses);
    totals.short_win_rate = win_rate(totals.short_wins, totals.short_losses);

    DirectionBreakdown { months, totals }
}

/// Zero when there were no trades.
fn win_rate(wins: u64, losses: u64) -> f64 {
    let trades = wins as f64 + losses as f64;
    if trades > 0.0 { wins as f64 / trades } else { 0.0 }
}
