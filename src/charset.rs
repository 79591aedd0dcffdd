//! Charset detection heuristic.
//!
//! Mirrors the OpenURI lookup order: a `charset=` attribute in the
//! content-type header wins, then an HTML meta tag near the top of the
//! body. There is deliberately no fallback to a default encoding such as
//! iso-8859-1; "no charset" is the empty string.

use once_cell::sync::Lazy;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;

/// Number of leading body bytes scanned for a meta tag.
const META_SCAN_LIMIT: usize = 1000;

static CONTENT_TYPE_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)charset\s*=\s*([a-zA-Z0-9-]+)").unwrap());

static META_HTTP_EQUIV: Lazy<BytesRegex> = Lazy::new(|| {
    BytesRegex::new(r#"(?is-u)<meta.*http-equiv\s*=\s*['"]?Content-Type['"]?.*?>"#).unwrap()
});

static META_CONTENT_CHARSET: Lazy<BytesRegex> =
    Lazy::new(|| BytesRegex::new(r#"(?is-u)content=['"]text/html.*?charset=(.*?)['"]"#).unwrap());

/// Detects the document charset from the content-type header value and the
/// response body. Returns the lower-cased charset name, or `""` when
/// neither source names one. Each scan stops at its first match.
pub fn detect(content_type: Option<&str>, body: &[u8]) -> String {
    if let Some(content_type) = content_type {
        if let Some(caps) = CONTENT_TYPE_CHARSET.captures(content_type) {
            return caps[1].to_ascii_lowercase();
        }
    }
    let head = &body[..body.len().min(META_SCAN_LIMIT)];
    if let Some(tag) = META_HTTP_EQUIV.find(head) {
        if let Some(caps) = META_CONTENT_CHARSET.captures(tag.as_bytes()) {
            return String::from_utf8_lossy(&caps[1]).to_ascii_lowercase();
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    const META_HTML: &[u8] = b"<html>\n<head>\n\
        <meta content=\"text/html; charset=ISO-8859-1\" http-equiv=\"Content-Type\"/>\n\
        </head>\n<body></body>\n</html>\n";

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(detect(Some("text/html;charset=utf-8"), b""), "utf-8");
        assert_eq!(detect(Some("text/html; charset = utf-8"), b""), "utf-8");
    }

    #[test]
    fn test_charset_case_folded() {
        assert_eq!(detect(Some("text/html;charset=Windows-1251"), b""), "windows-1251");
    }

    #[test]
    fn test_charset_from_meta_tag() {
        assert_eq!(detect(Some("text/html"), META_HTML), "iso-8859-1");
        assert_eq!(detect(None, META_HTML), "iso-8859-1");
    }

    #[test]
    fn test_content_type_wins_over_meta_tag() {
        assert_eq!(detect(Some("text/html;charset=utf-8"), META_HTML), "utf-8");
    }

    #[test]
    fn test_charset_absent() {
        assert_eq!(detect(Some("text/html"), b"<html><body></body></html>"), "");
        assert_eq!(detect(None, b""), "");
    }

    #[test]
    fn test_meta_tag_beyond_scan_limit_ignored() {
        let mut body = vec![b' '; META_SCAN_LIMIT];
        body.extend_from_slice(META_HTML);
        assert_eq!(detect(Some("text/html"), &body), "");
    }
}
