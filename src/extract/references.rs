//! Cross-module reference extraction
//!
//! Modules call each other through expressions whose arguments name the
//! library folder and the document file, e.g.
//! `document(contentlibrary/modules, contained.htm)`. The extractor walks
//! the marker occurrences left to right and captures each span up to the
//! last filename terminator before the next occurrence.

/// Folder marker that introduces every module reference
pub const CONTENT_LIBRARY_MARKER: &str = "contentlibrary";

/// Filename terminator that closes a captured reference
const REFERENCE_TERMINATOR: &str = ".htm";

/// Extract raw module references from document markup.
///
/// Returns `None` when the marker never occurs, so callers can tell "this
/// document references nothing" apart from "extraction came up empty".
/// When any occurrence lacks a terminator the whole extraction comes up
/// empty, keeping the all-or-nothing behavior of the reference grammar.
pub fn extract_module_references(content: &str) -> Option<Vec<String>> {
    if !content.contains(CONTENT_LIBRARY_MARKER) {
        return None;
    }

    let escaped = escape_single_line(content);
    let starts: Vec<usize> = escaped
        .match_indices(CONTENT_LIBRARY_MARKER)
        .map(|(start, _)| start)
        .collect();

    let mut references = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let window_end = starts.get(i + 1).copied().unwrap_or(escaped.len());
        let window = &escaped[start..window_end];
        match window.rfind(REFERENCE_TERMINATOR) {
            Some(pos) => {
                references.push(window[..pos + REFERENCE_TERMINATOR.len()].to_string());
            }
            None => return Some(Vec::new()),
        }
    }
    Some(references)
}

/// Normalize a raw captured reference into a `folder/filename` module
/// path: strip anything before the marker, then join the folder argument
/// and the filename argument with a slash.
pub fn resolve_module_path(raw: &str) -> String {
    let trimmed = raw.trim();
    let start = trimmed.find(CONTENT_LIBRARY_MARKER).unwrap_or(0);
    let reference = &trimmed[start..];

    match reference.find(',') {
        Some(comma) => {
            let folder = reference[..comma].trim();
            let filename = reference[comma + 1..].trim();
            format!("{}/{}", folder, filename)
        }
        None => reference.trim().to_string(),
    }
}

/// Escape markup to a single-line representation so literal newlines inside
/// a reference cannot split it across lines
fn escape_single_line(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for ch in content.chars() {
        match ch {
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
