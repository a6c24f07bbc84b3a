/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! Conversions between TNT wire text and typed values.
//!
//! Every function here is total: malformed text maps to `None` or to the
//! protocol default, never to an error.

use crate::tag;
use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// XML text
// ---------------------------------------------------------------------------

/// Escape `& < > " '` for interpolation into element text or attribute values.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Field attributes
// ---------------------------------------------------------------------------

/// Interpret a `writable` element's text.
///
/// `"0"`, `"false"` and `"no"` (any case) are false; anything else is true.
pub fn parse_writable(text: &str) -> bool {
    let t = text.trim().to_ascii_lowercase();
    !matches!(t.as_str(), "0" | "false" | "no")
}

/// Parse an aggregation level id, accepting only plain decimal digits.
pub fn parse_level_id(text: &str) -> Option<u32> {
    let t = text.trim();
    if t.is_empty() || !t.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    t.parse().ok()
}

/// Parse an interval constraint payload of the form `(min max)`.
pub fn parse_interval(value: &str) -> Option<(i64, i64)> {
    static INTERVAL: OnceLock<Option<Regex>> = OnceLock::new();
    let re = INTERVAL
        .get_or_init(|| Regex::new(r"^\(\s*(-?\d+)\s+(-?\d+)\s*\)").ok())
        .as_ref()?;
    let caps = re.captures(value.trim())?;
    let min = caps.get(1)?.as_str().parse().ok()?;
    let max = caps.get(2)?.as_str().parse().ok()?;
    Some((min, max))
}

// ---------------------------------------------------------------------------
// Response markers
// ---------------------------------------------------------------------------

/// True when the raw response reports a version error.
#[inline(always)]
pub fn is_version_error(response: &str) -> bool {
    response.contains(tag::VERSION_ERROR_MARKER)
}

/// Extract the version named by a `<concerning>` element, if any.
///
/// Works on raw text so that a response that fails to parse as XML can
/// still steer the negotiation.
pub fn concerning_version(response: &str) -> Option<String> {
    static CONCERNING: OnceLock<Option<Regex>> = OnceLock::new();
    let re = CONCERNING
        .get_or_init(|| {
            let el = regex::escape(tag::CONCERNING);
            Regex::new(&format!(r"<(?:[\w.-]+:)?{el}>([^<]+)</(?:[\w.-]+:)?{el}>")).ok()
        })
        .as_ref()?;
    let want = re.captures(response)?.get(1)?.as_str().trim();
    if want.is_empty() {
        None
    } else {
        Some(want.to_string())
    }
}

/// True when an order response carries the literal success marker.
#[inline(always)]
pub fn is_success(response: &str) -> bool {
    response.contains(tag::SUCCESS_MARKER)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_escape_all_specials() {
        assert_eq!(
            xml_escape(r#"a&b<c>d"e'f"#),
            "a&amp;b&lt;c&gt;d&quot;e&apos;f"
        );
    }

    #[test]
    fn test_xml_escape_ampersand_first() {
        // An already-escaped entity is escaped again, not passed through.
        assert_eq!(xml_escape("&lt;"), "&amp;lt;");
    }

    #[test]
    fn test_parse_writable() {
        assert!(!parse_writable("0"));
        assert!(!parse_writable("FALSE"));
        assert!(!parse_writable(" No "));
        assert!(parse_writable("1"));
        assert!(parse_writable("true"));
        assert!(parse_writable(""));
    }

    #[test]
    fn test_parse_level_id() {
        assert_eq!(parse_level_id(" 2 "), Some(2));
        assert_eq!(parse_level_id("0"), Some(0));
        assert_eq!(parse_level_id("-1"), None);
        assert_eq!(parse_level_id("two"), None);
        assert_eq!(parse_level_id(""), None);
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("(0 9999)"), Some((0, 9999)));
        assert_eq!(parse_interval("( -5   5 )"), Some((-5, 5)));
        assert_eq!(parse_interval("0 9999"), None);
        assert_eq!(parse_interval("(a b)"), None);
    }

    #[test]
    fn test_concerning_version() {
        let resp = "<tnt><response><version-error/><concerning> 1.1 </concerning></response></tnt>";
        assert_eq!(concerning_version(resp).as_deref(), Some("1.1"));
        assert_eq!(
            concerning_version("<x:concerning>2.0</x:concerning>").as_deref(),
            Some("2.0")
        );
        assert_eq!(concerning_version("<concerning>  </concerning>"), None);
        assert_eq!(concerning_version("<tnt/>"), None);
    }

    #[test]
    fn test_markers() {
        assert!(is_version_error("<error xsi:type=\"version-error\"/>"));
        assert!(!is_version_error("<response/>"));
        assert!(is_success("<return-value>ok</return-value>"));
        assert!(!is_success("<return-value>failed</return-value>"));
    }
}
