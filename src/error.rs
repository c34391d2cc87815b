use thiserror::Error;

/// Errors that can occur while searching for recipes
#[derive(Error, Debug)]
pub enum SearchError {
    /// Failed to reach the recipe API (DNS, connection, timeout)
    #[error("Failed to fetch recipes: {0}")]
    FetchError(#[from] reqwest::Error),

    /// The recipe API answered with a non-success status
    #[error("Recipe API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not valid JSON for the expected schema
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response decoded but carried no `hits` array
    #[error("Response is missing the `hits` array")]
    MissingHits,

    /// An empty query was submitted while empty queries are rejected
    #[error("Search query cannot be empty")]
    EmptyQuery,

    /// Application id or key were not configured
    #[error("Missing credential: {0}")]
    MissingCredentials(&'static str),

    /// A request timeout of zero would fail every request
    #[error("Request timeout must be greater than zero")]
    InvalidTimeout,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}
