//! Serde row types matching the remote store's tables.
//!
//! These stay separate from the domain types so wire column names
//! (`cook_time`, `user_id`, …) never leak past the store module.

use serde::{Deserialize, Serialize};

use crate::types::{Recipe, RecipeSummary};

/// A row of the `recipes` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeRow {
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub description: String,
  pub cook_time: u32,
  pub servings: u32,
  pub image_url: Option<String>,
  #[serde(default)]
  pub is_favorite: bool,
  pub user_id: String,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub updated_at: String,
}

/// Insert payload for the `recipes` table; the store assigns id, timestamps
/// and the favorite default.
#[derive(Debug, Clone, Serialize)]
pub struct NewRecipeRow {
  pub title: String,
  pub description: String,
  pub cook_time: u32,
  pub servings: u32,
  pub image_url: Option<String>,
  pub user_id: String,
}

/// Scalar column updates for a `recipes` row. Absent fields are not sent,
/// leaving those columns untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecipeChanges {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cook_time: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub servings: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
}

/// A row of the `ingredients` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientRow {
  #[serde(default)]
  pub id: Option<String>,
  pub recipe_id: String,
  pub name: String,
  pub amount: f64,
  pub unit: String,
  pub category: String,
}

/// Insert payload for the `ingredients` table.
#[derive(Debug, Clone, Serialize)]
pub struct NewIngredientRow {
  pub recipe_id: String,
  pub user_id: String,
  pub name: String,
  pub amount: f64,
  pub unit: String,
  pub category: String,
}

/// A row of the `instructions` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionRow {
  #[serde(default)]
  pub id: Option<String>,
  pub recipe_id: String,
  pub step_number: u32,
  pub content: String,
}

/// Insert payload for the `instructions` table.
#[derive(Debug, Clone, Serialize)]
pub struct NewInstructionRow {
  pub recipe_id: String,
  pub user_id: String,
  pub step_number: u32,
  pub content: String,
}

impl RecipeRow {
  /// Parent-only view for list screens.
  pub fn into_summary(self) -> RecipeSummary {
    RecipeSummary {
      id: self.id,
      title: self.title,
      description: self.description,
      image_url: self.image_url,
      cook_time_minutes: self.cook_time,
      servings: self.servings,
      is_favorite: self.is_favorite,
      created_at: self.created_at,
      updated_at: self.updated_at,
      author_id: self.user_id,
    }
  }

  /// Assemble the full record from this parent row plus its ingredient
  /// names and instruction contents, already in order.
  pub fn into_recipe(self, ingredients: Vec<String>, instructions: Vec<String>) -> Recipe {
    Recipe {
      id: self.id,
      title: self.title,
      description: self.description,
      image_url: self.image_url,
      cook_time_minutes: self.cook_time,
      servings: self.servings,
      is_favorite: self.is_favorite,
      ingredients,
      instructions,
      created_at: self.created_at,
      updated_at: self.updated_at,
      author_id: self.user_id,
    }
  }
}

/// The auth endpoint's user payload.
#[derive(Debug, Deserialize)]
pub(super) struct ApiAuthUser {
  pub id: String,
  pub email: Option<String>,
  #[serde(default)]
  pub user_metadata: serde_json::Value,
}

impl From<ApiAuthUser> for super::AuthUser {
  fn from(user: ApiAuthUser) -> Self {
    Self {
      id: user.id,
      email: user.email,
      metadata: user.user_metadata,
    }
  }
}
