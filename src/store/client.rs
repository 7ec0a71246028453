//! PostgREST-backed implementation of the store traits.
//!
//! Every operation maps to one HTTP call against the store's REST surface;
//! non-success responses become [`StoreError::Api`] carrying the store's own
//! message.

use async_trait::async_trait;
use reqwest::header::CONTENT_RANGE;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{Config, ConfigError};
use crate::error::StoreError;

use super::api_types::{
  ApiAuthUser, IngredientRow, InstructionRow, NewIngredientRow, NewInstructionRow, NewRecipeRow,
  RecipeChanges, RecipeRow,
};
use super::{AuthProvider, AuthUser, RecipeStore};

/// HTTP client for a PostgREST-compatible remote store.
#[derive(Clone)]
pub struct PostgrestStore {
  http: reqwest::Client,
  base_url: String,
  api_key: String,
  /// Bearer token of the signed-in session; the anon key is used when absent.
  access_token: Option<String>,
}

impl PostgrestStore {
  pub fn new(config: &Config) -> Result<Self, ConfigError> {
    let api_key = Config::api_key()?;

    Ok(Self {
      http: reqwest::Client::new(),
      base_url: config.store.url.trim_end_matches('/').to_string(),
      api_key,
      access_token: Config::access_token(),
    })
  }

  /// Use `token` as the bearer credential for subsequent calls.
  pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
    self.access_token = Some(token.into());
    self
  }

  fn rest_url(&self, table: &str) -> String {
    format!("{}/rest/v1/{}", self.base_url, table)
  }

  fn request(&self, method: Method, url: &str) -> RequestBuilder {
    let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
    self
      .http
      .request(method, url)
      .header("apikey", &self.api_key)
      .bearer_auth(bearer)
  }

  /// Turn a non-success response into the store's own error message.
  async fn api_error(response: Response) -> StoreError {
    #[derive(serde::Deserialize)]
    struct ApiError {
      message: String,
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiError>(&body) {
      Ok(parsed) => parsed.message,
      Err(_) if !body.is_empty() => body,
      Err(_) => format!("store returned status {}", status),
    };

    StoreError::Api { status, message }
  }

  async fn decode_rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, StoreError> {
    if !response.status().is_success() {
      return Err(Self::api_error(response).await);
    }
    let body = response.bytes().await.map_err(StoreError::Transport)?;
    Ok(serde_json::from_slice(&body)?)
  }

  async fn select<T: DeserializeOwned>(
    &self,
    table: &str,
    query: &[(&str, String)],
  ) -> Result<Vec<T>, StoreError> {
    let response = self
      .request(Method::GET, &self.rest_url(table))
      .query(query)
      .send()
      .await?;
    Self::decode_rows(response).await
  }

  /// Insert rows and return the stored representation.
  async fn insert_returning<B: Serialize, T: DeserializeOwned>(
    &self,
    table: &str,
    rows: &B,
  ) -> Result<Vec<T>, StoreError> {
    let response = self
      .request(Method::POST, &self.rest_url(table))
      .header("Prefer", "return=representation")
      .json(rows)
      .send()
      .await?;
    Self::decode_rows(response).await
  }

  /// Insert rows, discarding the response body.
  async fn insert_minimal<B: Serialize>(&self, table: &str, rows: &B) -> Result<(), StoreError> {
    let response = self
      .request(Method::POST, &self.rest_url(table))
      .header("Prefer", "return=minimal")
      .json(rows)
      .send()
      .await?;
    if !response.status().is_success() {
      return Err(Self::api_error(response).await);
    }
    Ok(())
  }

  async fn delete_where(&self, table: &str, field: &str, id: &str) -> Result<(), StoreError> {
    let response = self
      .request(Method::DELETE, &self.rest_url(table))
      .query(&[(field, format!("eq.{}", id))])
      .send()
      .await?;
    if !response.status().is_success() {
      return Err(Self::api_error(response).await);
    }
    Ok(())
  }
}

/// Total row count from a `Content-Range` header, e.g. `0-19/45` or `*/45`.
fn content_range_total(value: &str) -> Option<u64> {
  value.rsplit('/').next()?.parse().ok()
}

#[async_trait]
impl RecipeStore for PostgrestStore {
  async fn insert_recipe(&self, row: &NewRecipeRow) -> Result<RecipeRow, StoreError> {
    let mut rows: Vec<RecipeRow> = self.insert_returning("recipes", &[row]).await?;
    rows.pop().ok_or(StoreError::Api {
      status: 500,
      message: "insert returned no recipe row".to_string(),
    })
  }

  async fn fetch_recipe(&self, id: &str) -> Result<Option<RecipeRow>, StoreError> {
    let mut rows: Vec<RecipeRow> = self
      .select(
        "recipes",
        &[("id", format!("eq.{}", id)), ("limit", "1".to_string())],
      )
      .await?;
    Ok(rows.pop())
  }

  async fn list_by_author(
    &self,
    author_id: &str,
    offset: u32,
    limit: u32,
  ) -> Result<(Vec<RecipeRow>, u64), StoreError> {
    let response = self
      .request(Method::GET, &self.rest_url("recipes"))
      .header("Prefer", "count=exact")
      .query(&[
        ("user_id", format!("eq.{}", author_id)),
        ("order", "created_at.desc".to_string()),
        ("offset", offset.to_string()),
        ("limit", limit.to_string()),
      ])
      .send()
      .await?;

    let total = response
      .headers()
      .get(CONTENT_RANGE)
      .and_then(|v| v.to_str().ok())
      .and_then(content_range_total);

    let rows: Vec<RecipeRow> = Self::decode_rows(response).await?;
    // Without a usable count header, the rows seen so far are the total.
    let total = total.unwrap_or(offset as u64 + rows.len() as u64);
    Ok((rows, total))
  }

  async fn search_by_title(&self, query: &str) -> Result<Vec<RecipeRow>, StoreError> {
    self
      .select(
        "recipes",
        &[
          ("title", format!("ilike.*{}*", query)),
          ("order", "created_at.desc".to_string()),
        ],
      )
      .await
  }

  async fn update_recipe(
    &self,
    id: &str,
    changes: &RecipeChanges,
  ) -> Result<RecipeRow, StoreError> {
    let response = self
      .request(Method::PATCH, &self.rest_url("recipes"))
      .header("Prefer", "return=representation")
      .query(&[("id", format!("eq.{}", id))])
      .json(changes)
      .send()
      .await?;

    let mut rows: Vec<RecipeRow> = Self::decode_rows(response).await?;
    rows.pop().ok_or(StoreError::Api {
      status: 404,
      message: format!("no recipe row updated for id {}", id),
    })
  }

  async fn delete_recipe(&self, id: &str) -> Result<(), StoreError> {
    self.delete_where("recipes", "id", id).await
  }

  async fn insert_ingredients(&self, rows: &[NewIngredientRow]) -> Result<(), StoreError> {
    self.insert_minimal("ingredients", &rows).await
  }

  async fn ingredients_for(&self, recipe_id: &str) -> Result<Vec<IngredientRow>, StoreError> {
    self
      .select("ingredients", &[("recipe_id", format!("eq.{}", recipe_id))])
      .await
  }

  async fn delete_ingredients_for(&self, recipe_id: &str) -> Result<(), StoreError> {
    self.delete_where("ingredients", "recipe_id", recipe_id).await
  }

  async fn insert_instructions(&self, rows: &[NewInstructionRow]) -> Result<(), StoreError> {
    self.insert_minimal("instructions", &rows).await
  }

  async fn instructions_for(&self, recipe_id: &str) -> Result<Vec<InstructionRow>, StoreError> {
    self
      .select(
        "instructions",
        &[
          ("recipe_id", format!("eq.{}", recipe_id)),
          ("order", "step_number.asc".to_string()),
        ],
      )
      .await
  }

  async fn delete_instructions_for(&self, recipe_id: &str) -> Result<(), StoreError> {
    self.delete_where("instructions", "recipe_id", recipe_id).await
  }
}

#[async_trait]
impl AuthProvider for PostgrestStore {
  async fn current_user(&self) -> Result<Option<AuthUser>, StoreError> {
    // No session token means no one is signed in; don't bother the server.
    let Some(token) = self.access_token.as_deref() else {
      return Ok(None);
    };

    let response = self
      .http
      .get(format!("{}/auth/v1/user", self.base_url))
      .header("apikey", &self.api_key)
      .bearer_auth(token)
      .send()
      .await?;

    match response.status() {
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
      status if status.is_success() => {
        let body = response.bytes().await.map_err(StoreError::Transport)?;
        let user: ApiAuthUser = serde_json::from_slice(&body)?;
        Ok(Some(user.into()))
      }
      _ => Err(Self::api_error(response).await),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_content_range_total() {
    assert_eq!(content_range_total("0-19/45"), Some(45));
    assert_eq!(content_range_total("*/45"), Some(45));
    assert_eq!(content_range_total("0-19/*"), None);
    assert_eq!(content_range_total("garbage"), None);
  }
}
