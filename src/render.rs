//! Mapping from ingested recipes to display rows.
//!
//! Rows are keyed by a [`RowKey`] assigned when a response is ingested, never by
//! a recipe field alone: two hits can share a calorie count or even a label.

use serde::Serialize;
use std::fmt;

use crate::model::{Ingredient, RecipeSummary};

/// Stable identity of a row within one result list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RowKey {
    /// Position of the hit in the response
    pub position: usize,
    /// Server `uri` when present, else the label
    pub identity: String,
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.position, self.identity)
    }
}

/// A recipe paired with the key it was given at ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedRecipe {
    pub key: RowKey,
    pub recipe: RecipeSummary,
}

/// Assign row keys to a freshly decoded response
pub fn ingest(recipes: Vec<RecipeSummary>) -> Vec<IngestedRecipe> {
    recipes
        .into_iter()
        .enumerate()
        .map(|(position, recipe)| {
            let identity = recipe
                .uri
                .clone()
                .unwrap_or_else(|| recipe.label.clone());
            IngestedRecipe {
                key: RowKey { position, identity },
                recipe,
            }
        })
        .collect()
}

/// One display row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeRow {
    pub key: RowKey,
    pub title: String,
    pub calories: f64,
    pub image: String,
    pub ingredients: Vec<Ingredient>,
}

pub fn render_row(entry: &IngestedRecipe) -> RecipeRow {
    let recipe = &entry.recipe;
    RecipeRow {
        key: entry.key.clone(),
        title: recipe.label.clone(),
        calories: recipe.calories,
        image: recipe.image.clone(),
        ingredients: recipe.ingredients.clone(),
    }
}

pub fn render_list(entries: &[IngestedRecipe]) -> Vec<RecipeRow> {
    entries.iter().map(render_row).collect()
}

impl fmt::Display for RecipeRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "  Calories: {}", self.calories)?;
        writeln!(f, "  Image: {}", self.image)?;
        for ingredient in &self.ingredients {
            writeln!(f, "  - {}", ingredient.text)?;
        }
        Ok(())
    }
}
