//! Web search API module.

mod serpapi;

use thiserror::Error;

pub use serpapi::SerpApiClient;

/// Search API errors.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Connection failed or timed out
    #[error("Network error: {0}")]
    Network(String),

    /// Error reported by the search API
    #[error("Search API error: {0}")]
    Api(String),

    /// Unexpected response body
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A web search returning a text digest of the results.
pub trait SearchService {
    fn run(&self, query: &str) -> Result<String, SearchError>;
}
