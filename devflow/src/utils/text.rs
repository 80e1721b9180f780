//! Small text helpers shared by the stages.

use regex::Regex;
use std::sync::LazyLock;

static INSTALLATION_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)## Installation(.*?)(?:##|\z)").expect("installation pattern is valid")
});

/// Returns at most `max_chars` characters of `text`.
///
/// Cuts on character boundaries, never inside a UTF-8 sequence.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Lowercases a phase name and replaces spaces with underscores.
///
/// ```
/// use devflow::utils::snake_name;
///
/// assert_eq!(snake_name("Core Components Implementation"), "core_components_implementation");
/// ```
#[must_use]
pub fn snake_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Extracts the body of the `## Installation` section of a markdown document.
///
/// The body runs up to the next `##` marker (of any depth) or the end of the
/// document. Returns `None` when the heading is absent.
#[must_use]
pub fn installation_section(markdown: &str) -> Option<&str> {
    INSTALLATION_SECTION
        .captures(markdown)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
