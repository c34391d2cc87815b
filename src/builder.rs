use std::sync::Arc;
use std::time::Duration;

use crate::client::{EdamamClient, RecipeSource};
use crate::config::{EmptyQueryPolicy, SearchConfig};
use crate::controller::QueryController;
use crate::SearchError;

/// Builder for configuring a [`QueryController`]
#[derive(Default)]
pub struct SearchBuilder {
    config: SearchConfig,
    timeout: Option<Duration>,
    source: Option<Arc<dyn RecipeSource>>,
}

impl SearchBuilder {
    /// Start from a loaded configuration
    ///
    /// # Example
    /// ```
    /// use recipe_search::{RecipeSearch, SearchConfig};
    ///
    /// let builder = RecipeSearch::builder().config(SearchConfig::default());
    /// ```
    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the application id sent with every request
    ///
    /// # Example
    /// ```
    /// use recipe_search::RecipeSearch;
    ///
    /// let builder = RecipeSearch::builder()
    ///     .app_id("your-app-id")
    ///     .app_key("your-app-key");
    /// ```
    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.config.app_id = Some(app_id.into());
        self
    }

    /// Set the application key sent with every request
    pub fn app_key(mut self, app_key: impl Into<String>) -> Self {
        self.config.app_key = Some(app_key.into());
        self
    }

    /// Point the client at a different API host
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Query committed at start-up
    pub fn default_query(mut self, query: impl Into<String>) -> Self {
        self.config.default_query = query.into();
        self
    }

    /// Set a timeout for HTTP requests
    ///
    /// Takes precedence over the whole-second `timeout` of the configuration.
    ///
    /// # Example
    /// ```
    /// use recipe_search::RecipeSearch;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeSearch::builder().timeout(Duration::from_secs(10));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn empty_query(mut self, policy: EmptyQueryPolicy) -> Self {
        self.config.empty_query = policy;
        self
    }

    /// Use a custom recipe source instead of the HTTP client
    ///
    /// Credentials are not required when a source is given.
    pub fn source(mut self, source: Arc<dyn RecipeSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Build the controller
    ///
    /// # Errors
    /// Returns `SearchError` if no source was given and the app id or key is
    /// missing, the timeout is zero, or the HTTP client cannot be created.
    ///
    /// # Example
    /// ```no_run
    /// # use recipe_search::RecipeSearch;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let controller = RecipeSearch::builder()
    ///     .app_id("your-app-id")
    ///     .app_key("your-app-key")
    ///     .build()?;
    /// controller.start().await?;
    /// for row in controller.rows() {
    ///     println!("{}", row);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<QueryController, SearchError> {
        let source = match self.source {
            Some(source) => source,
            None => {
                let timeout = self.timeout.unwrap_or_else(|| self.config.timeout());
                Arc::new(EdamamClient::with_base_url(
                    self.config.credentials()?,
                    self.config.base_url.clone(),
                    Some(timeout),
                )?)
            }
        };

        Ok(QueryController::new(
            source,
            self.config.default_query,
            self.config.empty_query,
        ))
    }
}

/// Main entry point for the builder API
pub struct RecipeSearch;

impl RecipeSearch {
    /// Creates a new builder for a recipe search
    ///
    /// # Example
    /// ```
    /// use recipe_search::RecipeSearch;
    ///
    /// let builder = RecipeSearch::builder();
    /// ```
    pub fn builder() -> SearchBuilder {
        SearchBuilder::default()
    }
}
