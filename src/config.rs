use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::SearchError;

/// Search configuration: API credentials, endpoint and controller policy
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Application identifier sent as `app_id`
    pub app_id: Option<String>,
    /// Application key sent as `app_key`
    pub app_key: Option<String>,
    /// Base URL of the recipe API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Query committed at start-up
    #[serde(default = "default_query")]
    pub default_query: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// What to do when an empty query is submitted
    #[serde(default)]
    pub empty_query: EmptyQueryPolicy,
}

/// Handling of submissions whose draft is empty or whitespace
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmptyQueryPolicy {
    /// Refuse the submission and leave all state untouched
    #[default]
    Reject,
    /// Commit the empty query and let the API decide
    Forward,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            app_key: None,
            base_url: default_base_url(),
            default_query: default_query(),
            timeout: default_timeout(),
            empty_query: EmptyQueryPolicy::default(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://api.edamam.com".to_string()
}

fn default_query() -> String {
    "chicken".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Credentials pair checked for presence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub app_id: String,
    pub app_key: String,
}

impl SearchConfig {
    /// Load configuration from `config.toml` and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables with RECIPE_SEARCH__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_SEARCH__APP_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config_from(None)
    }

    /// Parse configuration from a TOML string, without consulting the environment
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Both credentials, or the name of the first one missing
    pub fn credentials(&self) -> Result<Credentials, SearchError> {
        let app_id = non_empty(&self.app_id).ok_or(SearchError::MissingCredentials("app_id"))?;
        let app_key =
            non_empty(&self.app_key).ok_or(SearchError::MissingCredentials("app_key"))?;
        Ok(Credentials { app_id, app_key })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

/// Load configuration from an explicit file (required) or `config.toml` (optional),
/// then environment variables
pub fn load_config_from(path: Option<&Path>) -> Result<SearchConfig, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).format(FileFormat::Toml).required(true),
        None => File::with_name("config")
            .format(FileFormat::Toml)
            .required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        // Use double underscore after the prefix: RECIPE_SEARCH__APP_ID
        .add_source(
            Environment::with_prefix("RECIPE_SEARCH")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(default_base_url(), "https://api.edamam.com");
        assert_eq!(default_query(), "chicken");
        assert_eq!(default_timeout(), 30);
        assert_eq!(EmptyQueryPolicy::default(), EmptyQueryPolicy::Reject);
    }

    #[test]
    fn test_from_toml_full() {
        let config = SearchConfig::from_toml(
            r#"
            app_id = "id-123"
            app_key = "key-456"
            base_url = "http://localhost:8080"
            default_query = "tofu"
            timeout = 5
            empty_query = "forward"
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.default_query, "tofu");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.empty_query, EmptyQueryPolicy::Forward);
        assert_eq!(
            config.credentials().unwrap(),
            Credentials {
                app_id: "id-123".to_string(),
                app_key: "key-456".to_string(),
            }
        );
    }

    #[test]
    fn test_from_toml_uses_defaults() {
        let config = SearchConfig::from_toml(r#"app_id = "id""#).unwrap();
        assert_eq!(config.base_url, "https://api.edamam.com");
        assert_eq!(config.default_query, "chicken");
        assert_eq!(config.timeout, 30);
        assert_eq!(config.empty_query, EmptyQueryPolicy::Reject);
    }

    #[test]
    fn test_missing_credentials() {
        let config = SearchConfig::default();
        assert!(matches!(
            config.credentials(),
            Err(SearchError::MissingCredentials("app_id"))
        ));

        let config = SearchConfig {
            app_id: Some("id".to_string()),
            app_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.credentials(),
            Err(SearchError::MissingCredentials("app_key"))
        ));
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result = SearchConfig::from_toml(r#"empty_query = "sometimes""#);
        assert!(result.is_err());
    }
}
