//! Metric name extraction from the suggest API response.
//!
//! The suggest API answers with a flat JSON array of strings such as
//! `["cpu","mem"]`. Names are recovered by deleting every `[`, `]`, `"` and
//! newline and splitting what is left on commas. This is deliberately not a
//! JSON parser: nested arrays, escaped quotes, `\uXXXX` escapes and names
//! containing commas all come out mangled. Scripts generated to date were
//! produced by exactly this transform, so it is kept rather than replaced.

/// Characters removed from the body before splitting.
const STRIPPED: [char; 4] = ['[', ']', '"', '\n'];

/// Extracts metric names from a raw suggest API body.
///
/// Tokens are neither trimmed nor deduplicated. Splitting follows the rules
/// the generated scripts have always been produced with:
/// - text without any comma comes back as a single token, so an empty array
///   `[]` yields one empty name;
/// - trailing empty tokens are dropped, leading and interior ones are kept.
///
/// # Example
/// ```rust
/// use fsckgen_core::metrics::parse_metric_names;
///
/// assert_eq!(parse_metric_names("[\"cpu\",\"mem\"]\n"), vec!["cpu", "mem"]);
/// assert_eq!(parse_metric_names("[]"), vec![""]);
/// ```
pub fn parse_metric_names(body: &str) -> Vec<String> {
    let stripped: String = body.chars().filter(|c| !STRIPPED.contains(c)).collect();

    if !stripped.contains(',') {
        return vec![stripped];
    }

    let mut names: Vec<String> = stripped.split(',').map(str::to_string).collect();
    while names.last().is_some_and(String::is_empty) {
        names.pop();
    }
    names
}

/// Number of empty names in a parsed list.
pub fn count_empty(names: &[String]) -> usize {
    names.iter().filter(|name| name.is_empty()).count()
}
