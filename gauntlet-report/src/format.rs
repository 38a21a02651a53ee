//! Duration Formatting

/// Format a millisecond quantity with an appropriate unit
pub fn format_duration_ms(ms: f64) -> String {
    if !ms.is_finite() {
        return "-".to_string();
    }
    let abs = ms.abs();
    if abs >= 60_000.0 {
        format!("{:.2} min", ms / 60_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.2} s", ms / 1_000.0)
    } else if abs >= 1.0 {
        format!("{:.2} ms", ms)
    } else if abs >= 0.001 {
        format!("{:.2} µs", ms * 1_000.0)
    } else if abs == 0.0 {
        "0 ms".to_string()
    } else {
        format!("{:.0} ns", ms * 1_000_000.0)
    }
}
