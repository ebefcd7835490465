// SPDX-License-Identifier: MIT

//! Human-readable elapsed-time formatting for step logs.

use std::time::Duration;

/// Formats a duration as `1h2m3s`, dropping leading zero units.
pub fn format_elapsed(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Formats a duration with millisecond precision, for sub-second steps.
pub fn format_elapsed_ms(d: Duration) -> String {
    if d.as_secs() == 0 {
        format!("{}ms", d.as_millis())
    } else {
        format_elapsed(d)
    }
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
