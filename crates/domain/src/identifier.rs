/// The result of decomposing a raw identifier string into its components.
///
/// See `spec.md` §3.1. Produced by `core::splitter::split`; `suffix` is
/// filled in later by the resolver once a matching definition is known,
/// since it depends on where that definition's `value` stops matching.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedIdentifier {
    /// The input string, trimmed.
    pub pid: String,
    /// Lowercased, everything before the first `:`. Empty if absent.
    pub scheme: String,
    /// Everything after the first `:`, with leading ` `, `/`, `:` runs and
    /// surrounding whitespace stripped. `None` if there was no `:`.
    pub content: Option<String>,
    /// The part of `content` before the first `/`, trimmed.
    pub prefix: Option<String>,
    /// The part of `content` after the first `/`, trimmed, leading `/`
    /// stripped. `None` if `content` contains no `/`.
    pub value: Option<String>,
    /// Filled in during resolution: the tail of `pid` beyond the matched
    /// definition's `prefix/value`.
    pub suffix: Option<String>,
}

impl ParsedIdentifier {
    /// `value` normalized to `""` the way the catalog treats an absent one.
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    /// `prefix` normalized to `""` the way the catalog treats an absent one.
    pub fn prefix_or_empty(&self) -> &str {
        self.prefix.as_deref().unwrap_or("")
    }
}
