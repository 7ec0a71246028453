//! Domain types for recipes and their submissions.

use serde::{Deserialize, Serialize};

/// A fully assembled recipe: parent fields plus ingredient names and
/// instruction steps in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
  /// Opaque id assigned by the store on creation.
  pub id: String,
  pub title: String,
  pub description: String,
  pub image_url: Option<String>,
  pub cook_time_minutes: u32,
  pub servings: u32,
  pub is_favorite: bool,
  /// Ingredient names, in insertion order.
  pub ingredients: Vec<String>,
  /// Instruction contents ordered by step number.
  pub instructions: Vec<String>,
  /// ISO-8601, assigned by the store.
  pub created_at: String,
  pub updated_at: String,
  pub author_id: String,
}

/// Parent-only view of a recipe for list screens.
///
/// List queries skip the child tables; use [`Recipe`] for detail views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
  pub id: String,
  pub title: String,
  pub description: String,
  pub image_url: Option<String>,
  pub cook_time_minutes: u32,
  pub servings: u32,
  pub is_favorite: bool,
  pub created_at: String,
  pub updated_at: String,
  pub author_id: String,
}

/// A recipe as collected from an editor, before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDraft {
  pub title: String,
  pub description: String,
  pub cook_time_minutes: u32,
  pub servings: u32,
  /// Remote image URL, if the user attached one.
  pub image: Option<String>,
  pub ingredients: Vec<IngredientDraft>,
  pub instructions: Vec<String>,
}

/// One ingredient line of a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientDraft {
  pub name: String,
  pub amount: f64,
  pub unit: String,
  /// Grocery-category tag, e.g. "Produce".
  pub category: String,
}

/// Partial update payload.
///
/// `None` fields are left untouched. A present child collection replaces the
/// stored one wholesale; there is no diffing or merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipePatch {
  pub title: Option<String>,
  pub description: Option<String>,
  pub cook_time_minutes: Option<u32>,
  pub servings: Option<u32>,
  pub image: Option<String>,
  pub ingredients: Option<Vec<IngredientDraft>>,
  pub instructions: Option<Vec<String>>,
}

/// One page of a user's recipe list.
#[derive(Debug, Clone)]
pub struct RecipePage {
  pub recipes: Vec<RecipeSummary>,
  /// Whether further pages exist past this one.
  pub has_more: bool,
}
