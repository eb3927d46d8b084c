//! `HH:MM:SS` time-of-day parsing and formatting.

use crate::error::{Result, ScheduleError};

pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

fn invalid(input: &str, reason: &str) -> ScheduleError {
    ScheduleError::InvalidTimeOfDay {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse an `HH:MM:SS` time of day into seconds since midnight.
///
/// Requires exactly three numeric components with in-range minutes and
/// seconds and hours below 24. Surrounding whitespace is tolerated,
/// single-digit components are fine (`7:05:00`).
pub fn parse_hms(input: &str) -> Result<u32> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    if parts.len() != 3 {
        return Err(invalid(input, "expected HH:MM:SS"));
    }

    let mut values = [0u32; 3];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| invalid(input, "non-numeric component"))?;
    }

    let [hours, minutes, seconds] = values;
    if hours >= 24 {
        return Err(invalid(input, "hours out of range"));
    }
    if minutes >= 60 {
        return Err(invalid(input, "minutes out of range"));
    }
    if seconds >= 60 {
        return Err(invalid(input, "seconds out of range"));
    }

    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Format a second count as `HH:MM:SS`.
///
/// Also used for durations and spans, so hours are not capped at 23.
pub fn format_hms(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
