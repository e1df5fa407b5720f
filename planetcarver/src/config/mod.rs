//! Human-readable size parsing (e.g., "1.5GB", "500MB").
//!
//! Used for the `--target-size` CLI argument. Units are decimal (1 KB =
//! 1000 bytes), matching how planet-dump sizes are usually quoted.

use thiserror::Error;

/// Error parsing a size string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid size '{input}' - expected format like '1.5GB', '500MB', or '1000000'")]
pub struct SizeParseError {
    input: String,
}

impl SizeParseError {
    fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports:
/// - Bare numbers (treated as bytes)
/// - KB/K, MB/M, GB/G suffixes (decimal, 1000-based)
/// - Fractional values ("1.5GB")
/// - Case-insensitive, whitespace tolerant
///
/// # Examples
///
/// ```
/// use planetcarver::config::parse_size;
///
/// assert_eq!(parse_size("1000000").unwrap(), 1_000_000);
/// assert_eq!(parse_size("500MB").unwrap(), 500_000_000);
/// assert_eq!(parse_size("1.5 GB").unwrap(), 1_500_000_000);
/// assert_eq!(parse_size("2g").unwrap(), 2_000_000_000);
/// ```
pub fn parse_size(s: &str) -> Result<u64, SizeParseError> {
    let s = s.trim();
    if s.is_empty() || !s.is_ascii() {
        return Err(SizeParseError::new(s));
    }

    let upper = s.to_uppercase();
    let (num_str, multiplier) = if let Some(stripped) = strip_suffix(&upper, &["GB", "G"]) {
        (&s[..stripped], 1_000_000_000f64)
    } else if let Some(stripped) = strip_suffix(&upper, &["MB", "M"]) {
        (&s[..stripped], 1_000_000f64)
    } else if let Some(stripped) = strip_suffix(&upper, &["KB", "K"]) {
        (&s[..stripped], 1_000f64)
    } else {
        (s, 1f64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| SizeParseError::new(s))?;
    if !num.is_finite() || num < 0.0 {
        return Err(SizeParseError::new(s));
    }

    let bytes = num * multiplier;
    if bytes > u64::MAX as f64 {
        return Err(SizeParseError::new(s));
    }
    Ok(bytes as u64)
}

/// Returns the byte length of the numeric part when one of the suffixes
/// matches.
fn strip_suffix(upper: &str, suffixes: &[&str]) -> Option<usize> {
    suffixes
        .iter()
        .find(|suffix| upper.ends_with(*suffix))
        .map(|suffix| upper.len() - suffix.len())
}

/// Format a byte count as a human-readable string.
///
/// # Examples
///
/// ```
/// use planetcarver::config::format_size;
///
/// assert_eq!(format_size(1_500_000_000), "1.50GB");
/// assert_eq!(format_size(500), "500B");
/// ```
pub fn format_size(bytes: u64) -> String {
    const GB: u64 = 1_000_000_000;
    const MB: u64 = 1_000_000;
    const KB: u64 = 1_000;

    if bytes >= GB {
        format!("{:.2}GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2}MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2}KB", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_bytes() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_decimal_units() {
        assert_eq!(parse_size("1KB").unwrap(), 1000);
        assert_eq!(parse_size("2MB").unwrap(), 2_000_000);
        assert_eq!(parse_size("3GB").unwrap(), 3_000_000_000);
    }

    #[test]
    fn test_parse_short_suffix_and_case() {
        assert_eq!(parse_size("2g").unwrap(), 2_000_000_000);
        assert_eq!(parse_size("500m").unwrap(), 500_000_000);
        assert_eq!(parse_size("10k").unwrap(), 10_000);
    }

    #[test]
    fn test_parse_fractional() {
        assert_eq!(parse_size("1.5GB").unwrap(), 1_500_000_000);
        assert_eq!(parse_size("0.5 MB").unwrap(), 500_000);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_size("").is_err());
        assert!(parse_size("GB").is_err());
        assert!(parse_size("twelve").is_err());
        assert!(parse_size("-1GB").is_err());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(1_500_000_000), "1.50GB");
        assert_eq!(format_size(2_000_000), "2.00MB");
        assert_eq!(format_size(1_000), "1.00KB");
        assert_eq!(format_size(999), "999B");
    }
}
