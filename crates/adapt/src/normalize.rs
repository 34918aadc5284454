use percent_encoding::percent_decode_str;
use regex::Regex;

const LEADING_STRIP: [char; 6] = [' ', '/', ':', '.', ';', ','];

/// Result of recovering the full identifier from a raw HTTP request,
/// `spec.md` §4.5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// The requested identifier as found in the raw URL, before any
    /// introspection-trigger suffix is stripped.
    pub original: String,
    /// `original` with a recognized `?`/`??`/`?info` trigger suffix
    /// stripped, if present. This is what gets split and looked up.
    pub cleaned: String,
    pub is_introspection: bool,
    pub has_service_url: bool,
}

/// Recover the full identifier from the raw request URL `raw_url` and the
/// route-extracted tail `identifier_tail`, per `spec.md` §4.5's four
/// numbered steps (mirrors `CleanedIdentifierRequest.from_request_url` in
/// the original Python service).
///
/// `raw_url` MUST be the unmodified request target as received — a
/// framework that pre-splits on `?` before handing off the path loses the
/// information this function needs (`spec.md` §9 "Raw request URL").
pub fn normalize(raw_url: &str, identifier_tail: &str, service_pattern: Option<&Regex>) -> Normalized {
    let decoded_tail = percent_decode_str(identifier_tail).decode_utf8_lossy();
    let mut cleaned_tail = decoded_tail.trim_start_matches(LEADING_STRIP).to_string();

    let mut has_service_url = false;
    if let Some(pattern) = service_pattern {
        if let Some(m) = pattern.find(&cleaned_tail) {
            if m.start() == 0 {
                cleaned_tail = cleaned_tail[m.end()..].to_string();
                has_service_url = true;
            }
        }
    }

    let raw_url_decoded = percent_decode_str(raw_url).decode_utf8_lossy().to_string();
    let start = raw_url_decoded.find(cleaned_tail.as_str()).unwrap_or(0);
    let requested_identifier = raw_url_decoded[start..].to_string();
    let original = requested_identifier.clone();

    let mut is_introspection = false;
    let mut cleaned = requested_identifier;
    for trigger in ["??", "?info", "?"] {
        if raw_url_decoded.ends_with(trigger) {
            if cleaned.ends_with(trigger) {
                cleaned.truncate(cleaned.len() - trigger.len());
            }
            is_introspection = true;
            break;
        }
    }

    Normalized {
        original,
        cleaned,
        is_introspection,
        has_service_url,
    }
}
