// Display helpers shared by the insights and the CLI report.
//
// Ties round half away from zero (1.125 -> "1.13"), matching what the
// dashboard front end renders. Plain `{:.*}` would round them to even.

/// Renders a fraction as a percentage, e.g. `percent(0.1234, 2)` is "12.34%".
pub fn percent(fraction: f64, decimals: usize) -> String {
    format!("{}%", fixed(fraction * 100.0, decimals))
}

pub fn fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, round_half_away(value, decimals))
}

fn round_half_away(value: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    let scaled = value * scale;
    if scaled.is_finite() {
        scaled.round() / scale
    } else {
        value
    }
}
