/// Remove `-` characters from `s`, except within the query part (the
/// substring from the first `?` onward, inclusive) — `spec.md` §4.1 "ARK
/// hyphen policy". Applied by the resolver to `content`, `value`, and
/// `suffix` for ARK identifiers before templating, not by the splitter
/// itself.
pub fn strip_hyphens(s: &str) -> String {
    match s.find('?') {
        Some(idx) => {
            let (before, after) = s.split_at(idx);
            let mut out = before.replace('-', "");
            out.push_str(after);
            out
        }
        None => s.replace('-', ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_hyphens_outside_query() {
        assert_eq!(strip_hyphens("99999/912345-a"), "99999/912345a");
    }

    #[test]
    fn leaves_hyphens_inside_query_untouched() {
        assert_eq!(strip_hyphens("99999-a?q=x-y"), "99999a?q=x-y");
    }

    #[test]
    fn no_query_marker_strips_everything() {
        assert_eq!(strip_hyphens("a-b-c"), "abc");
    }

    #[test]
    fn no_hyphens_is_a_no_op() {
        assert_eq!(strip_hyphens("abc?x=y"), "abc?x=y");
    }
}
