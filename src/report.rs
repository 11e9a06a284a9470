//! Display formatting for the command output. All inputs are SI units.

use std::error::Error;
use time::macros::format_description;
use time::{Duration, OffsetDateTime};

pub const NOT_AVAILABLE: &str = "n/a";

/// Formats with `digits` significant digits, without switching to exponent notation.
pub fn to_precision(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    if value == 0.0 {
        return format!("{:.*}", digits.saturating_sub(1), 0.0);
    }

    let magnitude = value.abs().log10().floor() as i64 + 1;
    let decimals = (digits as i64 - magnitude).max(0) as usize;
    format!("{value:.decimals$}")
}

pub fn format_distance(meters: f64) -> String {
    if !meters.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    if meters > 1000.0 {
        format!("{}km", to_precision(meters / 1000.0, 3))
    } else {
        format!("{}m", to_precision(meters, 3))
    }
}

/// Meters per second shown as km/h.
pub fn format_speed(speed: f64) -> String {
    if !speed.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{}km/h", to_precision(speed * 3.6, 3))
}

pub fn format_seconds(seconds: f64) -> String {
    if !seconds.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{seconds}s")
}

/// `HH:MM:SS`, hours not wrapped at a day.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.whole_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    format!(
        "{sign}{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

pub fn format_timestamp(time: OffsetDateTime) -> Result<String, Box<dyn Error>> {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    Ok(time.format(&format)?)
}

pub fn format_optional_timestamp(time: Option<OffsetDateTime>) -> Result<String, Box<dyn Error>> {
    match time {
        Some(time) => format_timestamp(time),
        None => Ok(NOT_AVAILABLE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_to_precision() {
        assert_eq!(to_precision(11.119, 3), "11.1");
        assert_eq!(to_precision(0.04567, 3), "0.0457");
        assert_eq!(to_precision(123.4, 3), "123");
        assert_eq!(to_precision(98765.0, 3), "98765");
        assert_eq!(to_precision(0.0, 3), "0.00");
        assert_eq!(to_precision(f64::NAN, 3), NOT_AVAILABLE);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(111.19), "111m");
        assert_eq!(format_distance(12345.0), "12.3km");
        assert_eq!(format_distance(0.0), "0.00m");
    }

    #[test]
    fn test_format_speed() {
        assert_eq!(format_speed(10.0), "36.0km/h");
        assert_eq!(format_speed(f64::INFINITY), NOT_AVAILABLE);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(5)), "00:00:05");
        assert_eq!(format_duration(Duration::seconds(3725)), "01:02:05");
        assert_eq!(format_duration(Duration::hours(30)), "30:00:00");
    }

    #[test]
    fn test_format_timestamp() {
        let t = datetime!(2023-01-01 10:00:05 UTC);
        assert_eq!(format_timestamp(t).unwrap(), "2023-01-01 10:00:05");
        assert_eq!(format_optional_timestamp(None).unwrap(), NOT_AVAILABLE);
    }
}
