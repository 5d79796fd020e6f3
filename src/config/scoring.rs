//! Ranking coefficients

use serde::{Deserialize, Serialize};

/// Per-field weights used by the ranking engine.
///
/// Each field's contribution is its occurrence count (or occurrence density in
/// quotient mode) multiplied by the weight below. Heading weight is further
/// divided by the heading level; content snippet weight is further multiplied
/// by the page's snippet quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Results scoring below this are dropped entirely
    pub minimal_score: f64,
    pub url: f64,
    pub title: f64,
    /// Divided by heading level (h1: 5000, h2: 2500, ...)
    pub heading: f64,
    pub description: f64,
    pub keyword: f64,
    pub author: f64,
    /// Multiplied by the page's content snippet quality
    pub content_snippet: f64,
    pub image_alt: f64,
    pub link_text: f64,
}

impl ScoringConfig {
    /// All field weights with their TOML key, for validation and reporting
    pub fn weights(&self) -> [(&'static str, f64); 9] {
        [
            ("url", self.url),
            ("title", self.title),
            ("heading", self.heading),
            ("description", self.description),
            ("keyword", self.keyword),
            ("author", self.author),
            ("content_snippet", self.content_snippet),
            ("image_alt", self.image_alt),
            ("link_text", self.link_text),
        ]
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            minimal_score: 1.0,
            url: 2000.0,
            title: 20000.0,
            heading: 5000.0,
            description: 1500.0,
            keyword: 50.0,
            author: 7500.0,
            content_snippet: 100.0,
            image_alt: 200.0,
            link_text: 100.0,
        }
    }
}
