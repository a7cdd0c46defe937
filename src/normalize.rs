// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Small string transforms shared by the record factory, scans and the CLI

/// Placeholder shown for empty values
pub const EM_DASH: &str = "\u{2014}";

/// Prefix `https://` unless the input already carries an http(s) scheme.
///
/// The scheme check is case-insensitive. Input with a scheme is returned
/// unchanged; surrounding whitespace is only dropped when prefixing.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if has_http_scheme(trimmed) {
        input.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

fn has_http_scheme(s: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        s.get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    })
}

/// Map `None` and `""` to an em dash
pub fn dash_if_empty(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => EM_DASH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_host_gets_https() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
    }

    #[test]
    fn test_existing_scheme_passes_through() {
        assert_eq!(normalize_url("http://test.com"), "http://test.com");
        assert_eq!(normalize_url("https://test.com"), "https://test.com");
        assert_eq!(normalize_url("HTTPS://Test.com/a"), "HTTPS://Test.com/a");
        assert_eq!(normalize_url(" https://test.com/ "), " https://test.com/ ");
    }

    #[test]
    fn test_other_schemes_are_prefixed() {
        assert_eq!(normalize_url("ftp://x.org"), "https://ftp://x.org");
        assert_eq!(normalize_url("  example.com/path "), "https://example.com/path");
    }

    #[test]
    fn test_non_ascii_input_does_not_panic() {
        assert_eq!(normalize_url("é"), "https://é");
    }

    #[test]
    fn test_dash_if_empty() {
        assert_eq!(dash_if_empty(Some("")), "\u{2014}");
        assert_eq!(dash_if_empty(None), "\u{2014}");
        assert_eq!(dash_if_empty(Some("max-age=31536000")), "max-age=31536000");
    }
}
