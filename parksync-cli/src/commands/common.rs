//! Formatting helpers shared across CLI commands.

use std::time::Duration;

use parksync::provider::DataKind;

/// Parse a data kind argument, listing the valid kinds on failure.
pub fn parse_data_kind(s: &str) -> Result<DataKind, String> {
    s.parse::<DataKind>().map_err(|_| {
        let valid: Vec<&str> = DataKind::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown data kind '{}' (expected one of: {})", s, valid.join(", "))
    })
}

/// Format a byte count for display.
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a duration as `1h 02m 03s`, dropping leading zero units.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
