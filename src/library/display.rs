use std::time::Duration;

/// Format seconds as `m:ss`. Minutes are not padded and can exceed 59.
///
/// Negative, NaN and infinite inputs render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Format an optional duration, showing `-:--` when it is unknown.
pub fn format_duration(d: Option<Duration>) -> String {
    match d {
        Some(d) => format_time(d.as_secs_f64()),
        None => "-:--".to_string(),
    }
}

/// `elapsed / total` readout used under the progress bar.
pub fn time_readout(elapsed: Duration, total: Option<Duration>) -> String {
    format!(
        "{} / {}",
        format_time(elapsed.as_secs_f64()),
        format_duration(total)
    )
}
