use chrono::{DateTime, NaiveDateTime};
use tracing::debug;

const MAX_FRACTION_DIGITS: usize = 3;

/// Formats a liters reading with German separators, `.` for thousands and `,` for
/// decimals, keeping at most three fraction digits. Input that is not a finite number
/// is returned as is.
pub fn format_level(raw: &str) -> String {
    let value = match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            debug!(event = "format.level_fallback", raw = raw);
            return raw.to_string();
        }
    };

    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut formatted = String::with_capacity(fixed.len() + integer.len() / 3 + 1);
    let is_zero = integer.chars().all(|c| c == '0') && fraction.is_empty();
    if value.is_sign_negative() && !is_zero {
        formatted.push('-');
    }

    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(digit);
    }

    if !fraction.is_empty() {
        formatted.push(',');
        formatted.push_str(fraction);
    }

    formatted
}

fn parse_local_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|datetime| datetime.naive_local())
        })
}

/// Formats an ISO-8601 local date-time as `January 1, 2024 at 10:00 AM`. Offsets are
/// accepted and the wall-clock time at that offset is shown. Anything unparseable is
/// returned as is.
pub fn format_timestamp(raw: &str) -> String {
    match parse_local_datetime(raw) {
        Some(datetime) => datetime.format("%B %-d, %Y at %-I:%M %p").to_string(),
        None => {
            debug!(event = "format.timestamp_fallback", raw = raw);
            raw.to_string()
        }
    }
}
