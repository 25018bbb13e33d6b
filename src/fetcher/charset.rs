//! Charset detection for fetched HTML.
//!
//! Order: the Content-Type header, then `<meta charset>` / `http-equiv` in
//! the first 4KB, then a statistical guess.

use encoding_rs::Encoding;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

const SNIFF_BYTES: usize = 4096;

static HEADER_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap(),
        Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap(),
    ]
});

pub fn detect(content_type: &str, body: &[u8]) -> &'static Encoding {
    if let Some(encoding) = label_from(&HEADER_CHARSET, content_type) {
        return encoding;
    }

    let head = &body[..body.len().min(SNIFF_BYTES)];
    let head_str = String::from_utf8_lossy(head);
    if let Some(encoding) = META_PATTERNS
        .iter()
        .find_map(|pattern| label_from(pattern, &head_str))
    {
        return encoding;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, false);
    detector.guess(None, true)
}

/// Decodes `body`, replacing malformed sequences.
pub fn decode(body: &[u8], encoding: &'static Encoding) -> String {
    let (decoded, _, had_errors) = encoding.decode(body);
    if had_errors {
        debug!(encoding = encoding.name(), "body contained malformed sequences");
    }
    decoded.into_owned()
}

fn label_from(pattern: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = pattern.captures(haystack)?.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes())
}
