//! The repository façade UI code calls for recipe persistence and retrieval.
//!
//! Owns the in-memory record cache and the prefetch in-flight set, and
//! orchestrates validation, the image cache, and the remote store. Detail
//! records are cached per id; list pages are fetched fresh every call.

use futures::future::try_join_all;
use futures::try_join;

use crate::cache::{ImageCache, RecordCache};
use crate::error::{Error, Result};
use crate::store::{
  AuthProvider, AuthUser, NewIngredientRow, NewInstructionRow, NewRecipeRow, RecipeChanges,
  RecipeStore,
};
use crate::types::{IngredientDraft, Recipe, RecipeDraft, RecipePage, RecipePatch};
use crate::validation;

/// Rows per page when the caller does not choose a size.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Caching façade over the remote store.
///
/// All mutating operations re-verify ownership against a freshly fetched
/// parent row, never a cached copy.
pub struct RecipeRepository<S, A> {
  store: S,
  auth: A,
  cache: RecordCache<Recipe>,
  images: ImageCache,
}

impl<S, A> RecipeRepository<S, A>
where
  S: RecipeStore + Clone + Send + Sync + 'static,
  A: AuthProvider,
{
  pub fn new(store: S, auth: A, images: ImageCache) -> Self {
    Self {
      store,
      auth,
      cache: RecordCache::new(),
      images,
    }
  }

  async fn require_user(&self) -> Result<AuthUser> {
    self
      .auth
      .current_user()
      .await?
      .ok_or(Error::Unauthenticated)
  }

  /// Create a recipe with its ingredient and instruction rows.
  ///
  /// The parent row is written first so the children can reference its
  /// generated id. A failure partway leaves the earlier writes committed
  /// and surfaces the store's error unchanged; there is no compensation.
  pub async fn create_recipe(&self, draft: RecipeDraft) -> Result<Recipe> {
    let user = self.require_user().await?;
    validation::validate(&draft)?;
    let draft = validation::sanitize(draft);

    let row = self
      .store
      .insert_recipe(&NewRecipeRow {
        title: draft.title.clone(),
        description: draft.description.clone(),
        cook_time: draft.cook_time_minutes,
        servings: draft.servings,
        image_url: draft.image.clone(),
        user_id: user.id.clone(),
      })
      .await?;

    if !draft.ingredients.is_empty() {
      let rows = ingredient_rows(&row.id, &user.id, &draft.ingredients);
      self.store.insert_ingredients(&rows).await?;
    }

    if !draft.instructions.is_empty() {
      let rows = instruction_rows(&row.id, &user.id, &draft.instructions);
      self.store.insert_instructions(&rows).await?;
    }

    let ingredients = draft.ingredients.into_iter().map(|i| i.name).collect();
    Ok(row.into_recipe(ingredients, draft.instructions))
  }

  /// Fetch one recipe, serving the cached copy while it is fresh.
  pub async fn get_recipe(&self, id: &str) -> Result<Recipe> {
    if let Some(recipe) = self.cache.get(id) {
      tracing::debug!(id, "record cache hit");
      return Ok(recipe);
    }

    let recipe = load_recipe(&self.store, id).await?;
    self.cache.set(id, recipe.clone());
    Ok(recipe)
  }

  /// Speculatively warm the detail cache for `id`.
  ///
  /// Advisory: de-duplicated against in-flight prefetches for the same id,
  /// and never surfaces an error.
  pub fn prefetch_recipe(&self, id: &str) {
    let store = self.store.clone();
    let id_owned = id.to_string();
    self
      .cache
      .prefetch(id, move || async move { load_recipe(&store, &id_owned).await });
  }

  /// One page of the current user's recipes, newest first.
  ///
  /// Pages are 1-based; page 1 is meant to replace the caller's accumulated
  /// list, later pages to append. Rows are parent-only summaries and the
  /// per-id record cache is neither consulted nor populated here.
  pub async fn get_user_recipes(&self, page: u32, page_size: u32) -> Result<RecipePage> {
    let user = self.require_user().await?;
    let offset = page.saturating_sub(1).saturating_mul(page_size);

    let (rows, total) = self.store.list_by_author(&user.id, offset, page_size).await?;
    let has_more = (offset as u64 + rows.len() as u64) < total;

    Ok(RecipePage {
      recipes: rows.into_iter().map(|row| row.into_summary()).collect(),
      has_more,
    })
  }

  /// Update a recipe the current user owns.
  ///
  /// Scalar fields update in place; a present child collection is replaced
  /// wholesale (delete all rows for the recipe, insert the new set). The
  /// refreshed record is written back to the cache so detail views see the
  /// update immediately.
  pub async fn update_recipe(&self, id: &str, patch: RecipePatch) -> Result<Recipe> {
    let user = self.require_user().await?;

    let existing = self
      .store
      .fetch_recipe(id)
      .await?
      .ok_or_else(|| Error::NotFound { id: id.to_string() })?;
    if existing.user_id != user.id {
      return Err(Error::Forbidden { id: id.to_string() });
    }

    validation::validate_patch(&patch)?;
    let patch = validation::sanitize_patch(patch);

    let row = self
      .store
      .update_recipe(
        id,
        &RecipeChanges {
          title: patch.title,
          description: patch.description,
          cook_time: patch.cook_time_minutes,
          servings: patch.servings,
          image_url: patch.image,
        },
      )
      .await?;

    let ingredients = match patch.ingredients {
      Some(list) => {
        self.store.delete_ingredients_for(id).await?;
        if !list.is_empty() {
          let rows = ingredient_rows(id, &user.id, &list);
          self.store.insert_ingredients(&rows).await?;
        }
        list.into_iter().map(|i| i.name).collect()
      }
      // The patch left the collection untouched; read it back so the
      // assembled record (and the cache entry) stays complete.
      None => self
        .store
        .ingredients_for(id)
        .await?
        .into_iter()
        .map(|i| i.name)
        .collect(),
    };

    let instructions = match patch.instructions {
      Some(list) => {
        self.store.delete_instructions_for(id).await?;
        if !list.is_empty() {
          let rows = instruction_rows(id, &user.id, &list);
          self.store.insert_instructions(&rows).await?;
        }
        list
      }
      None => self
        .store
        .instructions_for(id)
        .await?
        .into_iter()
        .map(|i| i.content)
        .collect(),
    };

    let recipe = row.into_recipe(ingredients, instructions);
    self.cache.set(id, recipe.clone());
    Ok(recipe)
  }

  /// Delete a recipe the current user owns.
  ///
  /// Only the parent row is deleted here; the store's referential rules
  /// cascade to the child tables.
  pub async fn delete_recipe(&self, id: &str) -> Result<()> {
    let user = self.require_user().await?;

    let existing = self
      .store
      .fetch_recipe(id)
      .await?
      .ok_or_else(|| Error::NotFound { id: id.to_string() })?;
    if existing.user_id != user.id {
      return Err(Error::Forbidden { id: id.to_string() });
    }

    self.store.delete_recipe(id).await?;
    Ok(())
  }

  /// Recipes whose title contains `query`, newest first, fully assembled.
  ///
  /// Each match fetches its own child collections; fine for the result
  /// sizes of a personal collection.
  pub async fn search_recipes(&self, query: &str) -> Result<Vec<Recipe>> {
    let rows = self.store.search_by_title(query).await?;

    let store = &self.store;
    try_join_all(rows.into_iter().map(|row| async move {
      let (ingredients, instructions) =
        try_join!(store.ingredients_for(&row.id), store.instructions_for(&row.id))?;
      Ok::<_, Error>(row.into_recipe(
        ingredients.into_iter().map(|i| i.name).collect(),
        instructions.into_iter().map(|i| i.content).collect(),
      ))
    }))
    .await
  }

  /// Resolve a recipe image URL through the disk cache.
  ///
  /// Called at display time; record assembly never downloads images.
  pub async fn resolve_image(&self, remote_url: &str) -> String {
    self.images.resolve(remote_url).await
  }
}

/// Fetch and assemble one recipe: the parent row plus both child
/// collections, fetched concurrently.
async fn load_recipe<S: RecipeStore>(store: &S, id: &str) -> Result<Recipe> {
  let row = store
    .fetch_recipe(id)
    .await?
    .ok_or_else(|| Error::NotFound { id: id.to_string() })?;

  let (ingredients, instructions) =
    try_join!(store.ingredients_for(id), store.instructions_for(id))?;

  Ok(row.into_recipe(
    ingredients.into_iter().map(|i| i.name).collect(),
    instructions.into_iter().map(|i| i.content).collect(),
  ))
}

fn ingredient_rows(
  recipe_id: &str,
  user_id: &str,
  drafts: &[IngredientDraft],
) -> Vec<NewIngredientRow> {
  drafts
    .iter()
    .map(|i| NewIngredientRow {
      recipe_id: recipe_id.to_string(),
      user_id: user_id.to_string(),
      name: i.name.clone(),
      amount: i.amount,
      unit: i.unit.clone(),
      category: i.category.clone(),
    })
    .collect()
}

fn instruction_rows(recipe_id: &str, user_id: &str, steps: &[String]) -> Vec<NewInstructionRow> {
  steps
    .iter()
    .enumerate()
    .map(|(index, content)| NewInstructionRow {
      recipe_id: recipe_id.to_string(),
      user_id: user_id.to_string(),
      step_number: index as u32 + 1,
      content: content.clone(),
    })
    .collect()
}
