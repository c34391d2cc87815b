use serde::{Deserialize, Serialize};

use crate::SearchError;

/// One recipe as returned by the search API
///
/// Fields are passed through untouched; anything else the API sends is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub label: String,
    pub calories: f64,
    pub image: String,
    pub ingredients: Vec<Ingredient>,
    /// Server-side identifier, when the API provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Option<Vec<Hit>>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    recipe: RecipeSummary,
}

/// Decode a search response body into its recipes
///
/// A body without `hits` is reported as [`SearchError::MissingHits`] instead of
/// an empty list, so the caller can tell "no results" apart from a bad payload.
pub fn decode_hits(body: &str) -> Result<Vec<RecipeSummary>, SearchError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    let hits = response.hits.ok_or(SearchError::MissingHits)?;
    Ok(hits.into_iter().map(|hit| hit.recipe).collect())
}
