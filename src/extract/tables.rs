//! Table lookup extraction from query expressions
//!
//! Query expressions can read backend tables, naming a master folder, a
//! table, and argument name/value pairs, e.g.
//! `LOOKUPRECORDS(!MasterData, ALL_USERS, PAIRS(RIID_, LOOKUP(RIID_)))`.
//! The grammar accepts up to two pairs; a reserved language-selector
//! argument in the first position defers to the second pair.

use std::sync::OnceLock;

use regex::Regex;

/// Reserved language-selector argument name. Matching is case-sensitive
/// even though the lookup grammar itself is not.
const RESERVED_ARG_NAME: &str = "LANG";

const TABLE_PATTERN: &str = concat!(
    r"(?i)\((?P<folder_name>!Master[A-Za-z]+),\s?(?P<table_name>[A-Za-z0-9_]+),\s?",
    r"(?:pairs\()?\s?",
    r"(?:(?P<qa>[A-Za-z0-9_]+),\s?(?:\bLOOKUP\(\b)?(?P<qv>[A-Za-z0-9_]+)\)?)+",
    r",?\s?",
    r"(?:(?P<qa2>[A-Za-z0-9_]+),\s?(?:\bLOOKUP\(\b)?(?P<qv2>[A-Za-z0-9_]+)\)?)?"
);

fn table_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TABLE_PATTERN).expect("table pattern must compile"))
}

/// One table lookup parsed out of a query expression. The argument pair is
/// the effective one after the reserved-name substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReference {
    /// Master folder holding the table, e.g. `!MasterData`
    pub folder_name: String,

    /// Name of the table
    pub table_name: String,

    /// Effective argument name, when one survives substitution
    pub arg_name: Option<String>,

    /// Effective argument value, when one survives substitution
    pub arg_value: Option<String>,
}

/// Extract every table lookup from one query expression
pub fn extract_table_references(query: &str) -> Vec<TableReference> {
    table_regex()
        .captures_iter(query)
        .map(|caps| {
            let group = |name: &str| caps.name(name).map(|m| m.as_str().to_string());

            let arg_name = match group("qa") {
                Some(name) if name == RESERVED_ARG_NAME => group("qa2"),
                other => other,
            };
            let arg_value = match group("qv") {
                Some(value) if value == RESERVED_ARG_NAME => group("qv2"),
                other => other,
            };

            TableReference {
                folder_name: caps["folder_name"].to_string(),
                table_name: caps["table_name"].to_string(),
                arg_name,
                arg_value,
            }
        })
        .collect()
}
