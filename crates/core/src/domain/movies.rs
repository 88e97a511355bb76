// Movie search response model

use serde::{Deserialize, Serialize};

/// Sentinel for an enrichment value that could not be fetched
pub const UNAVAILABLE: &str = "N/A";

/// One search hit merged with its director enrichment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub title: String,
    pub director: String,
}

/// Page of merged search results, the shape stored in the cache and
/// returned to callers verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSearchResponse {
    pub total_results: u64,
    pub total_pages: u64,
    pub results: Vec<MovieSummary>,
}

impl MovieSearchResponse {
    pub fn new(total_results: u64, page_size: u64, results: Vec<MovieSummary>) -> Self {
        Self {
            total_results,
            total_pages: total_results.div_ceil(page_size),
            results,
        }
    }

    /// Empty page, returned for blank search terms without any upstream call
    pub fn empty() -> Self {
        Self {
            total_results: 0,
            total_pages: 0,
            results: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(MovieSearchResponse::new(20, 10, vec![]).total_pages, 2);
        assert_eq!(MovieSearchResponse::new(21, 10, vec![]).total_pages, 3);
        assert_eq!(MovieSearchResponse::new(9, 10, vec![]).total_pages, 1);
        assert_eq!(MovieSearchResponse::new(0, 10, vec![]).total_pages, 0);
    }

    #[test]
    fn test_empty_page() {
        let page = MovieSearchResponse::empty();
        assert_eq!(page.total_results, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.results.is_empty());
    }
}
