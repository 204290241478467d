use crate::time_series::TimeSeriesPoint;

/// X (last sample position) and Y (rounded peak WPM) bounds for a chart.
pub fn compute_chart_params(points: &[TimeSeriesPoint], fallback_x: f64) -> (f64, f64) {
    let highest_wpm = points.iter().map(|p| p.wpm).fold(0.0_f64, f64::max);

    let last_x = points.last().map_or(fallback_x, |p| p.t).max(1.0);

    // Leave headroom so a flat series does not sit on the top border.
    let y = if highest_wpm > 0.0 {
        (highest_wpm * 1.1).round()
    } else {
        10.0
    };

    (last_x, y)
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}
