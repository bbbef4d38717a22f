use serde::{Deserialize, Serialize};

use crate::workitems::WorkItemPayload;

/// Placeholder for an optional field that could not be located.
pub const NOT_AVAILABLE: &str = "N/A";

/// Hard cap on results per run, regardless of what the payload asks for.
pub const MAX_RESULTS_CAP: usize = 100;

/// Immutable per-run search parameters, built once from a work item payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub search_phrase: String,
    pub max_results: usize,
    pub sort_by: String,
}

impl SearchConfig {
    pub fn new(search_phrase: String, max_results: usize, sort_by: String) -> Self {
        Self {
            search_phrase,
            max_results: max_results.min(MAX_RESULTS_CAP),
            sort_by,
        }
    }

    pub fn from_payload(payload: &WorkItemPayload) -> Self {
        Self::new(
            payload.search_phrase.clone(),
            payload.max_results,
            payload.sort_by.clone(),
        )
    }
}

/// One extracted news article. Field order matches the spreadsheet columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleRecord {
    pub title: String,
    pub date: String,
    pub description: String,
    pub image_name: String,
    pub search_phrase_count: usize,
    pub contains_money: bool,
    pub news_url: String,
}

impl ArticleRecord {
    /// Column headers for the spreadsheet sink, in field order.
    pub fn column_headers() -> [&'static str; 7] {
        [
            "title",
            "date",
            "description",
            "image_name",
            "search_phrase_count",
            "contains_money",
            "news_url",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(max_results: usize) -> WorkItemPayload {
        WorkItemPayload {
            search_phrase: "climate".to_string(),
            max_results,
            sort_by: "Date".to_string(),
        }
    }

    #[test]
    fn test_max_results_clamped_to_cap() {
        let config = SearchConfig::from_payload(&payload(250));
        assert_eq!(config.max_results, 100);

        let config = SearchConfig::from_payload(&payload(5));
        assert_eq!(config.max_results, 5);

        let config = SearchConfig::from_payload(&payload(0));
        assert_eq!(config.max_results, 0);
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let record = ArticleRecord {
            title: "Title".to_string(),
            date: "N/A".to_string(),
            description: "Desc".to_string(),
            image_name: "Title.jpg".to_string(),
            search_phrase_count: 1,
            contains_money: false,
            news_url: "https://example.com/a".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: ArticleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_headers_cover_every_field() {
        let headers = ArticleRecord::column_headers();
        assert_eq!(headers.len(), 7);
        assert_eq!(headers[0], "title");
        assert_eq!(headers[6], "news_url");
    }
}
