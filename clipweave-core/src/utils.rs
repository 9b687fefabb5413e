//! Utility functions for formatting and escaping.
//!
//! This module provides general-purpose helpers used throughout the
//! clipweave-core library: decimal rendering for filter arguments, the two
//! escaping levels of the ffmpeg filtergraph syntax, and duration formatting.

/// Renders a float with at most six fractional digits, trailing zeros trimmed.
///
/// `0.5` -> `"0.5"`, `2.0` -> `"2"`, `1.0000004` -> `"1"`, `-0.0` -> `"0"`.
#[must_use]
pub fn format_decimal(value: f64) -> String {
    let rendered = format!("{value:.6}");
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" | "-" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Escapes a value for use inside a filter's `key=value:key=value` option list.
#[must_use]
pub fn escape_option_value(value: &str) -> String {
    escape_chars(value, &['\\', '\'', ':', '='])
}

/// Escapes a filter argument string for embedding in a filtergraph description.
#[must_use]
pub fn escape_graph_value(value: &str) -> String {
    escape_chars(value, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if special.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Formats seconds as HH:MM:SS.mmm (e.g., 3725.5 -> "01:02:05.500"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_millis = (seconds * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(0.5), "0.5");
        assert_eq!(format_decimal(2.0), "2");
        assert_eq!(format_decimal(0.0), "0");
        assert_eq!(format_decimal(-0.0), "0");
        assert_eq!(format_decimal(3.25), "3.25");
        assert_eq!(format_decimal(1.0 / 3.0), "0.333333");
        assert_eq!(format_decimal(1.000_000_4), "1");
        assert_eq!(format_decimal(-2.5), "-2.5");
        assert_eq!(format_decimal(10.0), "10");
    }

    #[test]
    fn test_escape_option_value() {
        assert_eq!(escape_option_value("stereo"), "stereo");
        assert_eq!(escape_option_value("a:b"), "a\\:b");
        assert_eq!(escape_option_value("it's"), "it\\'s");
        assert_eq!(escape_option_value("x=1"), "x\\=1");
        assert_eq!(escape_option_value("c:\\tmp"), "c\\:\\\\tmp");
    }

    #[test]
    fn test_escape_graph_value() {
        assert_eq!(
            escape_graph_value("if(between(T,0,1),A,B)"),
            "if(between(T\\,0\\,1)\\,A\\,B)"
        );
        assert_eq!(escape_graph_value("[x];y"), "\\[x\\]\\;y");
        assert_eq!(escape_graph_value("500|500"), "500|500");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(3725.5), "01:02:05.500");
        assert_eq!(format_duration(0.0), "00:00:00.000");
        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
    }
}
