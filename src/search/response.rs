//! Response model sent back to clients

use serde::{Deserialize, Serialize};

use crate::types::ScoredResult;

/// One ranked page as exposed to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub url: String,
    pub title: String,
    pub content_snippet: String,
    pub score: f64,
}

/// Ranked results, sorted by score descending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ResultEntry>,
}

impl From<&ScoredResult<'_>> for ResultEntry {
    fn from(result: &ScoredResult<'_>) -> Self {
        Self {
            url: result.item.url.clone(),
            title: result.item.title.clone(),
            content_snippet: result.item.content_snippet.clone(),
            score: result.score,
        }
    }
}

impl SearchResponse {
    pub fn from_results(results: &[ScoredResult<'_>]) -> Self {
        Self {
            results: results.iter().map(ResultEntry::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WebIndexItem;
    use serde_json::json;

    #[test]
    fn exposes_only_client_fields_with_original_case() {
        let item = WebIndexItem::from_json(&json!({
            "final_url": "https://Example.com/Page",
            "title": "Mixed Case Title",
            "headings": {"h1": ["Secret Heading"]},
            "description": "hidden description",
            "keywords": "k",
            "author": "a",
            "content_snippet": "Snippet As Crawled",
            "content_snippet_quality": 0.9,
            "image_alts": "",
            "link_texts": ""
        }))
        .unwrap();
        let scored = [ScoredResult {
            item: &item,
            score: 42.5,
        }];

        let value = serde_json::to_value(SearchResponse::from_results(&scored)).unwrap();
        assert_eq!(
            value,
            json!({
                "results": [{
                    "url": "https://Example.com/Page",
                    "title": "Mixed Case Title",
                    "content_snippet": "Snippet As Crawled",
                    "score": 42.5
                }]
            })
        );
    }

    #[test]
    fn empty_results_serialize_as_empty_list() {
        let value = serde_json::to_value(SearchResponse::from_results(&[])).unwrap();
        assert_eq!(value, json!({"results": []}));
    }
}
