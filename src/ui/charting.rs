/// X (seconds) and Y (WPM) bounds for the results chart. With no samples the
/// x bound falls back to `fallback_duration`; it never drops below one second.
pub fn compute_chart_params(
    wpm_coords: &[(f64, f64)],
    fallback_duration: Option<f64>,
) -> (f64, f64) {
    let highest_wpm = wpm_coords
        .iter()
        .map(|&(_, wpm)| wpm)
        .filter(|wpm| wpm.is_finite())
        .fold(0.0, f64::max);

    let overall_duration = match wpm_coords.last() {
        Some(&(t, _)) => t,
        None => fallback_duration.unwrap_or(1.0),
    };

    (overall_duration.max(1.0), highest_wpm.round())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
