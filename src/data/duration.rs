use std::time::Duration;

use anyhow::{bail, Result};

/// Parse CLI duration flags like "5s", "500ms", "0.5s".
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    if let Some(val) = s.strip_suffix("ms") {
        return from_value(val, 1e-3);
    }
    if let Some(val) = s.strip_suffix('s') {
        return from_value(val, 1.0);
    }

    bail!("unknown duration format: {s:?} (expected e.g. \"5s\" or \"500ms\")")
}

fn from_value(val: &str, scale: f64) -> Result<Duration> {
    let val: f64 = val.trim().parse()?;
    if !val.is_finite() || val < 0.0 {
        bail!("duration must be a non-negative number, got {val}");
    }
    Ok(Duration::from_secs_f64(val * scale))
}

/// Format a duration for display
pub fn format_duration(d: Duration) -> String {
    if d < Duration::from_secs(1) {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("0.5s").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_milliseconds() {
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_duration("5m").is_err());
        assert!(parse_duration("-1s").is_err());
        assert!(parse_duration("fast").is_err());
    }

    #[test]
    fn test_format() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.00s");
    }
}
