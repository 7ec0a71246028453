//! Typed interface to the remote relational store.
//!
//! The repository depends only on the [`RecipeStore`] and [`AuthProvider`]
//! traits; [`PostgrestStore`] implements both against a PostgREST-compatible
//! HTTP API. One method per table operation keeps every query's shape
//! explicit instead of threading a dynamic filter builder through the layer.

mod api_types;
mod client;

pub use api_types::{
  IngredientRow, InstructionRow, NewIngredientRow, NewInstructionRow, NewRecipeRow, RecipeChanges,
  RecipeRow,
};
pub use client::PostgrestStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// The authenticated user as reported by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
  pub id: String,
  pub email: Option<String>,
  /// Provider-specific profile data, passed through untouched.
  #[serde(default)]
  pub metadata: serde_json::Value,
}

/// Resolves the currently authenticated user, if any.
#[async_trait]
pub trait AuthProvider: Send + Sync {
  /// `Ok(None)` means no session; transport faults are errors.
  async fn current_user(&self) -> Result<Option<AuthUser>, StoreError>;
}

/// Typed access to the recipe tables of the remote store.
///
/// Every call can suspend on network I/O and surfaces the store's failure as
/// a [`StoreError`] with the store's original message.
#[async_trait]
pub trait RecipeStore: Send + Sync {
  /// Insert the parent row and return it with its generated id.
  async fn insert_recipe(&self, row: &NewRecipeRow) -> Result<RecipeRow, StoreError>;

  /// Fetch one parent row by id; `None` when no row matches.
  async fn fetch_recipe(&self, id: &str) -> Result<Option<RecipeRow>, StoreError>;

  /// One page of parent rows for `author_id`, newest first, plus the total
  /// number of matching rows.
  async fn list_by_author(
    &self,
    author_id: &str,
    offset: u32,
    limit: u32,
  ) -> Result<(Vec<RecipeRow>, u64), StoreError>;

  /// Parent rows whose title contains `query` case-insensitively, newest
  /// first.
  async fn search_by_title(&self, query: &str) -> Result<Vec<RecipeRow>, StoreError>;

  /// Update scalar columns of the parent row and return the updated row.
  async fn update_recipe(&self, id: &str, changes: &RecipeChanges)
    -> Result<RecipeRow, StoreError>;

  /// Delete the parent row. Dependent rows are removed by the store's own
  /// referential rules, not by this layer.
  async fn delete_recipe(&self, id: &str) -> Result<(), StoreError>;

  async fn insert_ingredients(&self, rows: &[NewIngredientRow]) -> Result<(), StoreError>;

  async fn ingredients_for(&self, recipe_id: &str) -> Result<Vec<IngredientRow>, StoreError>;

  async fn delete_ingredients_for(&self, recipe_id: &str) -> Result<(), StoreError>;

  async fn insert_instructions(&self, rows: &[NewInstructionRow]) -> Result<(), StoreError>;

  /// Instruction rows for a recipe, ordered by step number ascending.
  async fn instructions_for(&self, recipe_id: &str) -> Result<Vec<InstructionRow>, StoreError>;

  async fn delete_instructions_for(&self, recipe_id: &str) -> Result<(), StoreError>;
}
