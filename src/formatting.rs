//! Human-readable numbers and durations for notification messages.

use std::time::Duration;

/// Formats an integer with comma thousands separators, e.g. `1,234,567`.
pub fn pretty_print_i64(num: i64) -> String {
    let digits = num.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if num < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats a duration compactly: `850.000ms`, `12.345s`, `3m7.250s`, `1h2m3.000s`.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    if total < 60 {
        return format!("{:.3?}", d);
    }
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = (total % 60) as f64 + f64::from(d.subsec_millis()) / 1000.0;
    if hours > 0 {
        format!("{}h{}m{:.3}s", hours, minutes, seconds)
    } else {
        format!("{}m{:.3}s", minutes, seconds)
    }
}
