//! Core types for the search server

use std::ops::Deref;
use std::sync::Arc;

/// Lowercased text a query is matched against.
///
/// Lowercasing and the character count are computed once at construction so the
/// per-request scan never re-normalizes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchableText {
    text: String,
    char_len: usize,
}

impl SearchableText {
    pub fn new(raw: &str) -> Self {
        let text = raw.to_lowercase();
        let char_len = text.chars().count();
        Self { text, char_len }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    /// Number of non-overlapping occurrences of `needle`.
    ///
    /// `needle` must be non-empty.
    pub fn occurrences(&self, needle: &str) -> usize {
        debug_assert!(!needle.is_empty());
        self.text.matches(needle).count()
    }

    /// Occurrences per character of text. A zero-length field has density 0.
    pub fn density(&self, needle: &str) -> f64 {
        if self.char_len == 0 {
            return 0.0;
        }
        self.occurrences(needle) as f64 / self.char_len as f64
    }
}

/// One heading of a page (`<h1>`..`<h6>`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHeading {
    /// 1-6
    pub level: u8,
    pub text: SearchableText,
}

/// Searchable fields of one crawled page.
///
/// `url`, `title` and `content_snippet` keep their original casing because they
/// are returned to clients; each has a lowercased twin used for matching.
#[derive(Debug, Clone)]
pub struct WebIndexItem {
    pub url: String,
    pub title: String,
    pub content_snippet: String,
    pub content_snippet_quality: f64,

    pub url_lc: SearchableText,
    pub title_lc: SearchableText,
    pub headings: Vec<PageHeading>,
    pub description: SearchableText,
    pub keywords: SearchableText,
    pub author: SearchableText,
    pub content_snippet_lc: SearchableText,
    pub image_alts: SearchableText,
    pub link_texts: SearchableText,
}

/// The complete, immutable collection of indexed pages.
///
/// Cloning is cheap (shared `Arc`); there is no way to mutate the items once
/// the index has been built.
#[derive(Debug, Clone, Default)]
pub struct WebIndex {
    items: Arc<[WebIndexItem]>,
}

impl WebIndex {
    pub fn new(items: Vec<WebIndexItem>) -> Self {
        Self {
            items: items.into(),
        }
    }
}

impl Deref for WebIndex {
    type Target = [WebIndexItem];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl FromIterator<WebIndexItem> for WebIndex {
    fn from_iter<I: IntoIterator<Item = WebIndexItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// A candidate page and its accumulated score
#[derive(Debug, Clone, Copy)]
pub struct ScoredResult<'a> {
    pub item: &'a WebIndexItem,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn searchable_text_lowercases_once() {
        let t = SearchableText::new("Rust Programming GUIDE");
        assert_eq!(t.as_str(), "rust programming guide");
        assert_eq!(t.char_len(), 22);
    }

    #[test]
    fn occurrences_are_non_overlapping() {
        let t = SearchableText::new("aaaa");
        assert_eq!(t.occurrences("aa"), 2);
        assert_eq!(t.occurrences("b"), 0);
    }

    #[test]
    fn density_counts_characters_not_bytes() {
        let t = SearchableText::new("žluťoučký kůň");
        assert_eq!(t.char_len(), 13);
        assert!((t.density("kůň") - 1.0 / 13.0).abs() < 1e-12);
    }

    #[test]
    fn density_of_empty_field_is_zero() {
        let t = SearchableText::new("");
        assert!(t.is_empty());
        assert_eq!(t.density("rust"), 0.0);
    }

    #[test]
    fn web_index_clones_share_items() {
        let index: WebIndex = Vec::<WebIndexItem>::new().into_iter().collect();
        let other = index.clone();
        assert!(Arc::ptr_eq(&index.items, &other.items));
        assert!(other.is_empty());
    }
}
