//! Query expression extraction

use std::sync::OnceLock;

use regex::Regex;

/// Grammar for a dollar-prefixed call expression. The match is greedy and
/// line-bounded: it runs from `$` to the last `)` left on the line, so
/// adjacent calls on one line collapse into a single capture. Table
/// parsing downstream is calibrated against that shape.
const QUERY_PATTERN: &str = r"\$.*\)";

fn query_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(QUERY_PATTERN).expect("query pattern must compile"))
}

/// Extract every templating call expression from raw document markup, in
/// order of appearance. Duplicates are kept.
pub fn extract_queries(content: &str) -> Vec<String> {
    query_regex()
        .find_iter(content)
        .map(|m| m.as_str().to_string())
        .collect()
}
