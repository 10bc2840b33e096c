//! Text plots for the terminal: a histogram and a fitted-probability curve

use crate::pipeline::{CurvePoint, Histogram};

/// Horizontal bar chart, one line per bin
pub fn render_histogram(histogram: &Histogram, width: usize) -> String {
    let mut out = format!("Histogram of {}\n", histogram.variable);

    if histogram.bins.is_empty() {
        out.push_str("  (no non-missing values)\n");
        return out;
    }

    let peak = histogram.bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    for bin in &histogram.bins {
        let len = (bin.count * width + peak - 1) / peak;
        out.push_str(&format!(
            "  [{:>10.3}, {:>10.3}) {:<w$} {}\n",
            bin.lower,
            bin.upper,
            "█".repeat(len),
            bin.count,
            w = width
        ));
    }
    if histogram.missing > 0 {
        out.push_str(&format!("  missing: {}\n", histogram.missing));
    }
    out
}

/// Scatter of P(outcome = 1) against the predictor on a character grid.
///
/// The y axis always spans [0, 1]; the x axis spans the predictor range.
pub fn render_curve(points: &[CurvePoint], width: usize, height: usize, outcome: &str, predictor: &str) -> String {
    let mut out = format!("Prob ({outcome}=1) and {predictor}\n");

    if points.is_empty() || width < 2 || height < 2 {
        out.push_str("  (no fitted values)\n");
        return out;
    }

    let x_min = points.iter().map(|p| p.predictor).fold(f64::INFINITY, f64::min);
    let x_max = points.iter().map(|p| p.predictor).fold(f64::NEG_INFINITY, f64::max);
    let x_span = if x_max > x_min { x_max - x_min } else { 1.0 };

    let mut grid = vec![vec![' '; width]; height];
    for p in points {
        let col = (((p.predictor - x_min) / x_span) * (width - 1) as f64).round() as usize;
        let row = ((1.0 - p.probability.clamp(0.0, 1.0)) * (height - 1) as f64).round() as usize;
        grid[row.min(height - 1)][col.min(width - 1)] = '•';
    }

    for (i, row) in grid.iter().enumerate() {
        let label = match i {
            0 => "1.00".to_string(),
            _ if i == height - 1 => "0.00".to_string(),
            _ if i == (height - 1) / 2 => format!("{:.2}", 1.0 - i as f64 / (height - 1) as f64),
            _ => String::new(),
        };
        out.push_str(&format!("  {:>5} │{}\n", label, row.iter().collect::<String>()));
    }
    out.push_str(&format!("        └{}\n", "─".repeat(width)));
    out.push_str(&format!(
        "         {:<w$}{:>10.3}\n",
        format!("{:.3}", x_min),
        x_max,
        w = width.saturating_sub(10)
    ));
    out.push_str(&format!("         P ({outcome}=1) vs {predictor}\n"));
    out
}
