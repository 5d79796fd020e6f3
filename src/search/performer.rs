//! Ranking engine
//!
//! Every page in the index is scored against the canonical query by summing
//! weighted per-field contributions:
//!
//! | Field           | Weight (default) | Modifier                 |
//! |-----------------|------------------|--------------------------|
//! | URL             | 2000             |                          |
//! | Title           | 20000            |                          |
//! | Heading         | 5000             | ÷ heading level          |
//! | Description     | 1500             |                          |
//! | Keywords        | 50               |                          |
//! | Author          | 7500             |                          |
//! | Content snippet | 100              | × snippet quality        |
//! | Image alts      | 200              |                          |
//! | Link texts      | 100              |                          |
//!
//! In occurrence mode a field contributes `occurrences × weight`; in quotient
//! mode it contributes `occurrences / field length × weight`, with zero-length
//! fields contributing nothing. Pages below the minimal score are dropped, the
//! rest are sorted by score (stable, so ties keep index order) and truncated.

use crate::config::ScoringConfig;
use crate::types::{ScoredResult, SearchableText, WebIndex, WebIndexItem};

use super::request::ClientRequest;

/// How a field's matches are turned into a number before weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    /// Raw occurrence count
    Occurrence,
    /// Occurrences per character of the field
    Quotient,
}

impl ScoringMode {
    pub fn from_flag(use_quotient_based_scoring: bool) -> Self {
        if use_quotient_based_scoring {
            Self::Quotient
        } else {
            Self::Occurrence
        }
    }

    fn measure(self, field: &SearchableText, query: &str) -> f64 {
        match self {
            Self::Occurrence => field.occurrences(query) as f64,
            Self::Quotient => field.density(query),
        }
    }
}

/// Scores a read-only web index against client requests
pub struct SearchPerformer<'a> {
    index: &'a WebIndex,
    scoring: &'a ScoringConfig,
}

impl<'a> SearchPerformer<'a> {
    pub fn new(index: &'a WebIndex, scoring: &'a ScoringConfig) -> Self {
        Self { index, scoring }
    }

    /// Rank the whole index for `request`.
    ///
    /// Returns at most `max_results` results, each scoring at least the
    /// configured minimum, sorted by score descending. An empty query matches
    /// nothing.
    pub fn perform_search(&self, request: &ClientRequest) -> Vec<ScoredResult<'a>> {
        let query = request.canonical_search_query();
        if query.is_empty() {
            return Vec::new();
        }

        let mode = ScoringMode::from_flag(request.use_quotient_based_scoring());
        let index: &'a WebIndex = self.index;

        let mut results: Vec<ScoredResult<'a>> = index
            .iter()
            .map(|item| ScoredResult {
                item,
                score: self.score_item(item, query, mode),
            })
            .filter(|result| result.score >= self.scoring.minimal_score)
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(request.max_results());
        results
    }

    /// Total score of one page. `query` must be canonical and non-empty.
    pub fn score_item(&self, item: &WebIndexItem, query: &str, mode: ScoringMode) -> f64 {
        let w = self.scoring;
        let field = |text: &SearchableText, weight: f64| mode.measure(text, query) * weight;

        let mut score = 0.0;
        score += field(&item.url_lc, w.url);
        score += field(&item.title_lc, w.title);
        for heading in &item.headings {
            score += field(&heading.text, w.heading / f64::from(heading.level));
        }
        score += field(&item.description, w.description);
        score += field(&item.keywords, w.keyword);
        score += field(&item.author, w.author);
        score += field(
            &item.content_snippet_lc,
            item.content_snippet_quality * w.content_snippet,
        );
        score += field(&item.image_alts, w.image_alt);
        score += field(&item.link_texts, w.link_text);
        score
    }
}
