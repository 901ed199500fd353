use super::TransactionSummary;
use crate::{Error, Result};

/// Prefix the device lab puts in front of the record when it is printed
pub const TRANSACTION_INFO_PREFIX: &str = "Transaction Information: ";

/// Parser for the `{key=value, key=value}` capture-end format.
///
/// Grammar:
///
/// ```text
/// response := [prefix] '{' [pair (',' pair)*] '}'
/// pair     := key ['=' value]
/// key      := [A-Za-z0-9_]+
/// ```
///
/// A comma separates pairs only when it is followed by `key=` and sits
/// outside a nested `{}`/`[]` value. A value is nested only when it opens
/// with a bracket. Nested records are kept as opaque strings,
/// they are never parsed into maps of their own.
pub struct SummaryParser;

impl SummaryParser {
    pub fn parse(raw: &str) -> Result<TransactionSummary> {
        tracing::debug!("Parsing transaction summary ({} bytes)", raw.len());

        let text = strip_prefix(raw.trim());
        let body = record_body(text)?;

        let mut summary = TransactionSummary::new();
        for segment in split_pairs(body) {
            let (key, value) = match segment.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (segment.trim(), None),
            };

            if key.is_empty() && value.is_none_or(str::is_empty) {
                continue;
            }

            let value = value.filter(|v| *v != "null").map(str::to_string);
            summary.insert(key.to_string(), value);
        }

        tracing::debug!("Parsed transaction summary with {} properties", summary.len());
        Ok(summary)
    }
}

fn strip_prefix(text: &str) -> &str {
    match text.strip_prefix(TRANSACTION_INFO_PREFIX.trim_end()) {
        Some(rest) => rest.trim_start(),
        None => text,
    }
}

fn record_body(text: &str) -> Result<&str> {
    text.strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .ok_or_else(|| {
            Error::MalformedSummary(format!(
                "expected a brace-delimited record, got '{}'",
                preview(text)
            ))
        })
}

/// Split a record body into `key=value` segments at top-level separators.
/// Falls back to plain separator splitting when a nested value is left
/// unterminated.
fn split_pairs(body: &str) -> Vec<&str> {
    split_nested(body).unwrap_or_else(|| split_at(body, |_| false))
}

/// Nesting starts only at a `{` or `[` opening a value, right after `=`.
/// Returns `None` if a nested value is still open at the end of the body.
fn split_nested(body: &str) -> Option<Vec<&str>> {
    let mut depth = 0usize;
    let mut last = None;

    let segments = split_at(body, |byte| {
        match byte {
            b'{' | b'[' if depth > 0 || last == Some(b'=') => depth += 1,
            b'}' | b']' if depth > 0 => depth -= 1,
            _ => {}
        }
        if !byte.is_ascii_whitespace() {
            last = Some(byte);
        }
        depth > 0
    });

    (depth == 0).then_some(segments)
}

/// Split at each `,` followed by `key=`, unless `nested` reports the
/// comma sits inside a nested value. `nested` sees every byte in order.
fn split_at(body: &str, mut nested: impl FnMut(u8) -> bool) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;

    // Only ASCII bytes are inspected, so every split index is a char boundary
    for (idx, byte) in body.bytes().enumerate() {
        if nested(byte) {
            continue;
        }
        if byte == b',' && starts_with_key(&body[idx + 1..]) {
            segments.push(&body[start..idx]);
            start = idx + 1;
        }
    }
    segments.push(&body[start..]);

    segments
}

/// Does `rest` begin with optional whitespace, a key, and `=`?
fn starts_with_key(rest: &str) -> bool {
    let rest = rest.trim_start();
    let key_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    key_len > 0 && rest.as_bytes().get(key_len) == Some(&b'=')
}

fn preview(text: &str) -> String {
    const MAX: usize = 40;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixed_record() {
        let summary = SummaryParser::parse(
            "Transaction Information: {transactionName=login, transactionId=123, link=null}",
        )
        .unwrap();

        assert_eq!(summary.len(), 3);
        assert_eq!(summary.transaction_name(), Some("login"));
        assert_eq!(summary.transaction_id(), Some("123"));
        assert!(summary.contains_key("link"));
        assert_eq!(summary.link(), None);
    }

    #[test]
    fn test_parse_without_prefix() {
        let summary = SummaryParser::parse("{k1=v1, k2=v2, k3=null}").unwrap();
        assert_eq!(summary.get("k1"), Some("v1"));
        assert_eq!(summary.get("k2"), Some("v2"));
        assert_eq!(summary.get("k3"), None);
    }

    #[test]
    fn test_missing_key_is_none() {
        let summary = SummaryParser::parse("{k1=v1}").unwrap();
        assert_eq!(summary.get("nonexistent"), None);
        assert!(summary.require("nonexistent").is_err());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let summary = SummaryParser::parse("{transactionId=abc}").unwrap();
        assert_eq!(summary.get("transactionid"), None);
        assert_eq!(summary.get("transactionId"), Some("abc"));
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let a = SummaryParser::parse("{a=1, b=2, c=null}").unwrap();
        let b = SummaryParser::parse("{c=null, a=1, b=2}").unwrap();

        for key in ["a", "b", "c"] {
            assert_eq!(a.get(key), b.get(key), "mismatch on {}", key);
            assert_eq!(a.contains_key(key), b.contains_key(key));
        }
    }

    #[test]
    fn test_value_keeps_equals_signs() {
        let summary =
            SummaryParser::parse("{link=https://lab.example.com/report?id=42&t=x}").unwrap();
        assert_eq!(summary.link(), Some("https://lab.example.com/report?id=42&t=x"));
    }

    #[test]
    fn test_comma_without_key_stays_in_value() {
        let summary = SummaryParser::parse("{appName=Experi, Bank, appVersion=1.0}").unwrap();
        assert_eq!(summary.app_name(), Some("Experi, Bank"));
        assert_eq!(summary.app_version(), Some("1.0"));
    }

    #[test]
    fn test_nested_record_is_opaque() {
        let summary = SummaryParser::parse(
            "{transactionId=9, device={os=iOS, model=iPhone 15}, link=http://r/9}",
        )
        .unwrap();

        assert_eq!(summary.len(), 3);
        assert_eq!(summary.get("device"), Some("{os=iOS, model=iPhone 15}"));
        assert_eq!(summary.get("os"), None);
        assert_eq!(summary.link(), Some("http://r/9"));
    }

    #[test]
    fn test_bracket_inside_plain_value_does_not_nest() {
        let summary = SummaryParser::parse(
            "Transaction Information: {transactionName=retry [1, transactionId=abc123, link=http://r/abc123}",
        )
        .unwrap();

        assert_eq!(summary.transaction_name(), Some("retry [1"));
        assert_eq!(summary.transaction_id(), Some("abc123"));
        assert_eq!(summary.link(), Some("http://r/abc123"));
    }

    #[test]
    fn test_unterminated_nested_value_falls_back() {
        let summary =
            SummaryParser::parse("{device={os=iOS, transactionId=abc123, link=http://r/1}").unwrap();

        assert_eq!(summary.get("device"), Some("{os=iOS"));
        assert_eq!(summary.transaction_id(), Some("abc123"));
        assert_eq!(summary.link(), Some("http://r/1"));
    }

    #[test]
    fn test_nested_list_value_is_opaque() {
        let summary = SummaryParser::parse("{tags=[a, b=c], transactionId=7}").unwrap();

        assert_eq!(summary.get("tags"), Some("[a, b=c]"));
        assert_eq!(summary.transaction_id(), Some("7"));
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let summary = SummaryParser::parse("{a=1, a=2}").unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary.get("a"), Some("2"));
    }

    #[test]
    fn test_segment_without_equals_is_absent() {
        let summary = SummaryParser::parse("{flag}").unwrap();
        assert!(summary.contains_key("flag"));
        assert_eq!(summary.get("flag"), None);
    }

    #[test]
    fn test_empty_record() {
        let summary = SummaryParser::parse("Transaction Information: {}").unwrap();
        assert!(summary.is_empty());
    }

    #[test]
    fn test_preserves_source_order() {
        let summary = SummaryParser::parse("{z=1, a=2, m=3}").unwrap();
        let keys: Vec<&str> = summary.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_rejects_input_without_braces() {
        let result = SummaryParser::parse("Transaction Info: transactionId=1");
        assert!(matches!(result, Err(Error::MalformedSummary(_))));
    }
}
