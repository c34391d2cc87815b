use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

use crate::config::{Credentials, SearchConfig};
use crate::model::{decode_hits, RecipeSummary};
use crate::SearchError;

/// Anything that can answer a recipe query
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Search for recipes matching `query`
    async fn search(&self, query: &str) -> Result<Vec<RecipeSummary>, SearchError>;
}

/// HTTP client for the Edamam-style `/search` endpoint
pub struct EdamamClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl EdamamClient {
    /// Create a client from configuration; fails when credentials are missing
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let credentials = config.credentials()?;
        Self::with_base_url(credentials, config.base_url.clone(), Some(config.timeout()))
    }

    pub fn with_base_url(
        credentials: Credentials,
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, SearchError> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        if timeout.is_zero() {
            return Err(SearchError::InvalidTimeout);
        }
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }
}

#[async_trait]
impl RecipeSource for EdamamClient {
    async fn search(&self, query: &str) -> Result<Vec<RecipeSummary>, SearchError> {
        let url = format!("{}/search", self.base_url);
        debug!("GET {} q={:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("app_id", self.credentials.app_id.as_str()),
                ("app_key", self.credentials.app_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let recipes = decode_hits(&body)?;
        debug!("Decoded {} hits for {:?}", recipes.len(), query);
        Ok(recipes)
    }
}
