use domain::ParsedIdentifier;

const CONTENT_STRIP: [char; 3] = [' ', '/', ':'];
const VALUE_STRIP: [char; 2] = [' ', '/'];

/// Decompose an identifier string into scheme/prefix/value/content parts.
///
/// Pure, total function: every input produces a `ParsedIdentifier`, even
/// the empty string. See `spec.md` §4.1 for the grammar and edge cases;
/// this mirrors `rslv.lib_rslv.split_identifier_string` from the original
/// Python service field for field, since the spec's prose leaves a few
/// corner cases (scheme with no `:` at all, multi-slash values) to that
/// source.
pub fn split(input: &str) -> ParsedIdentifier {
    let pid = input.trim().to_string();

    let (scheme_part, rest) = match pid.split_once(':') {
        Some((scheme, rest)) => (scheme, Some(rest)),
        None => (pid.as_str(), None),
    };
    let scheme = scheme_part.trim().to_lowercase();

    let content = rest.map(|r| r.trim_start_matches(CONTENT_STRIP).trim().to_string());

    let (prefix, value) = match &content {
        None => (None, None),
        Some(content) => match content.split_once('/') {
            None => (Some(content.trim().to_string()), None),
            Some((prefix_raw, value_raw)) => (
                Some(prefix_raw.trim().to_string()),
                Some(value_raw.trim_start_matches(VALUE_STRIP).trim().to_string()),
            ),
        },
    };

    ParsedIdentifier {
        pid,
        scheme,
        content,
        prefix,
        value,
        suffix: None,
    }
}
