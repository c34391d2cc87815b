//! Recipe search over a nutrition API.
//!
//! A [`QueryController`] holds the draft query, the committed query and the
//! result list. Submitting commits the draft and fetches matching recipes; each
//! result renders to a [`RecipeRow`] with title, calories, image and ingredients.

pub mod builder;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod render;

pub use builder::{RecipeSearch, SearchBuilder};
pub use client::{EdamamClient, RecipeSource};
pub use config::{load_config_from, Credentials, EmptyQueryPolicy, SearchConfig};
pub use controller::{ApplyOutcome, FetchRequest, FetchStatus, QueryController, SearchState};
pub use error::SearchError;
pub use model::{decode_hits, Ingredient, RecipeSummary};
pub use render::{ingest, render_list, render_row, IngestedRecipe, RecipeRow, RowKey};

/// Search once with configuration from `config.toml` and the environment
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// for row in recipe_search::search_recipes("chicken").await? {
///     println!("{}", row);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search_recipes(query: &str) -> Result<Vec<RecipeRow>, SearchError> {
    let config = SearchConfig::load()?;
    let client = EdamamClient::new(&config)?;
    let recipes = client.search(query).await?;
    Ok(render_list(&ingest(recipes)))
}
