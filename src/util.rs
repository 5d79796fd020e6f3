//! Shared utility functions

/// Shorten `text` to at most `max_chars` characters for terminal output.
///
/// Whitespace runs (including newlines from page snippets) become single
/// spaces. A truncated preview ends in "...", which counts toward the limit.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let suffix = "...";
    let keep = max_chars.saturating_sub(suffix.len());
    let mut out: String = flat.chars().take(keep).collect();
    out.push_str(suffix);
    out
}
