//! Schema validation and sanitization for recipe submissions.
//!
//! `validate` runs before any network call; `sanitize` is applied after it
//! on every create and update path. Both are pure.

use url::Url;

use crate::error::{Error, Result};
use crate::types::{IngredientDraft, RecipeDraft, RecipePatch};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_COOK_TIME_MINUTES: u32 = 1440;
pub const MAX_SERVINGS: u32 = 100;

const MAX_INGREDIENT_NAME_LEN: usize = 100;
const MAX_UNIT_LEN: usize = 20;
const MAX_CATEGORY_LEN: usize = 50;

/// Check a full submission against the schema rules.
///
/// Checks run in declaration order and stop at the first violation. String
/// lengths are measured on the trimmed value, so a draft that validates
/// still validates after [`sanitize`].
pub fn validate(draft: &RecipeDraft) -> Result<()> {
  check_title(&draft.title)?;
  check_description(&draft.description)?;
  check_cook_time(draft.cook_time_minutes)?;
  check_servings(draft.servings)?;
  if let Some(image) = &draft.image {
    check_image_url(image)?;
  }
  check_ingredients(&draft.ingredients)?;
  check_instructions(&draft.instructions)?;
  Ok(())
}

/// Check a partial update payload. The same rules as [`validate`], applied
/// only to the fields present.
pub fn validate_patch(patch: &RecipePatch) -> Result<()> {
  if let Some(title) = &patch.title {
    check_title(title)?;
  }
  if let Some(description) = &patch.description {
    check_description(description)?;
  }
  if let Some(cook_time) = patch.cook_time_minutes {
    check_cook_time(cook_time)?;
  }
  if let Some(servings) = patch.servings {
    check_servings(servings)?;
  }
  if let Some(image) = &patch.image {
    check_image_url(image)?;
  }
  if let Some(ingredients) = &patch.ingredients {
    check_ingredients(ingredients)?;
  }
  if let Some(instructions) = &patch.instructions {
    check_instructions(instructions)?;
  }
  Ok(())
}

/// Trim surrounding whitespace from the text fields of a submission.
///
/// Numeric fields pass through unchanged. Assumes [`validate`] already
/// passed; on invalid input it returns trimmed-but-still-invalid data.
pub fn sanitize(mut draft: RecipeDraft) -> RecipeDraft {
  draft.title = draft.title.trim().to_string();
  draft.description = draft.description.trim().to_string();
  for ingredient in &mut draft.ingredients {
    trim_ingredient(ingredient);
  }
  for step in &mut draft.instructions {
    *step = step.trim().to_string();
  }
  draft
}

/// [`sanitize`] for a partial payload: present fields are trimmed.
pub fn sanitize_patch(mut patch: RecipePatch) -> RecipePatch {
  patch.title = patch.title.map(|s| s.trim().to_string());
  patch.description = patch.description.map(|s| s.trim().to_string());
  if let Some(ingredients) = &mut patch.ingredients {
    for ingredient in ingredients {
      trim_ingredient(ingredient);
    }
  }
  if let Some(instructions) = &mut patch.instructions {
    for step in instructions {
      *step = step.trim().to_string();
    }
  }
  patch
}

fn trim_ingredient(ingredient: &mut IngredientDraft) {
  ingredient.name = ingredient.name.trim().to_string();
  ingredient.unit = ingredient.unit.trim().to_string();
  ingredient.category = ingredient.category.trim().to_string();
}

fn trimmed_len(value: &str) -> usize {
  value.trim().chars().count()
}

fn check_title(title: &str) -> Result<()> {
  let len = trimmed_len(title);
  if len == 0 || len > MAX_TITLE_LEN {
    return Err(Error::validation(
      "title",
      "Title must be between 1 and 200 characters",
    ));
  }
  Ok(())
}

fn check_description(description: &str) -> Result<()> {
  if trimmed_len(description) > MAX_DESCRIPTION_LEN {
    return Err(Error::validation(
      "description",
      "Description cannot exceed 1000 characters",
    ));
  }
  Ok(())
}

fn check_cook_time(minutes: u32) -> Result<()> {
  if minutes == 0 || minutes > MAX_COOK_TIME_MINUTES {
    return Err(Error::validation(
      "cook_time",
      "Cook time must be between 1 and 1440 minutes",
    ));
  }
  Ok(())
}

fn check_servings(servings: u32) -> Result<()> {
  if servings == 0 || servings > MAX_SERVINGS {
    return Err(Error::validation(
      "servings",
      "Servings must be between 1 and 100",
    ));
  }
  Ok(())
}

fn check_image_url(image: &str) -> Result<()> {
  if Url::parse(image.trim()).is_err() {
    return Err(Error::validation("image", "Image must be a valid URL"));
  }
  Ok(())
}

fn check_ingredients(ingredients: &[IngredientDraft]) -> Result<()> {
  if ingredients.is_empty() {
    return Err(Error::validation(
      "ingredients",
      "At least one ingredient is required",
    ));
  }
  for ingredient in ingredients {
    let name_len = trimmed_len(&ingredient.name);
    if name_len == 0 || name_len > MAX_INGREDIENT_NAME_LEN {
      return Err(Error::validation(
        "ingredients",
        "Ingredient name must be between 1 and 100 characters",
      ));
    }
    if ingredient.amount.is_nan() || ingredient.amount <= 0.0 {
      return Err(Error::validation(
        "ingredients",
        "Ingredient amount must be a positive number",
      ));
    }
    let unit_len = trimmed_len(&ingredient.unit);
    if unit_len == 0 || unit_len > MAX_UNIT_LEN {
      return Err(Error::validation(
        "ingredients",
        "Ingredient unit must be between 1 and 20 characters",
      ));
    }
    let category_len = trimmed_len(&ingredient.category);
    if category_len == 0 || category_len > MAX_CATEGORY_LEN {
      return Err(Error::validation(
        "ingredients",
        "Ingredient category must be between 1 and 50 characters",
      ));
    }
  }
  Ok(())
}

fn check_instructions(instructions: &[String]) -> Result<()> {
  if instructions.is_empty() {
    return Err(Error::validation(
      "instructions",
      "At least one instruction is required",
    ));
  }
  for step in instructions {
    if step.trim().is_empty() {
      return Err(Error::validation(
        "instructions",
        "Instructions cannot be empty",
      ));
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn valid_draft() -> RecipeDraft {
    RecipeDraft {
      title: "Soup".to_string(),
      description: "Hot".to_string(),
      cook_time_minutes: 20,
      servings: 2,
      image: None,
      ingredients: vec![IngredientDraft {
        name: "Carrot".to_string(),
        amount: 2.0,
        unit: "pc".to_string(),
        category: "Produce".to_string(),
      }],
      instructions: vec!["Boil".to_string()],
    }
  }

  fn violated_field(result: Result<()>) -> &'static str {
    match result {
      Err(Error::Validation { field, .. }) => field,
      other => panic!("expected validation error, got {:?}", other),
    }
  }

  #[test]
  fn test_valid_draft_passes() {
    assert!(validate(&valid_draft()).is_ok());
  }

  #[test]
  fn test_empty_title_rejected() {
    let mut draft = valid_draft();
    draft.title = String::new();
    assert_eq!(violated_field(validate(&draft)), "title");
  }

  #[test]
  fn test_overlong_title_rejected() {
    let mut draft = valid_draft();
    draft.title = "x".repeat(201);
    assert_eq!(violated_field(validate(&draft)), "title");
  }

  #[test]
  fn test_overlong_description_rejected() {
    let mut draft = valid_draft();
    draft.description = "x".repeat(1001);
    assert_eq!(violated_field(validate(&draft)), "description");
  }

  #[test]
  fn test_cook_time_bounds() {
    let mut draft = valid_draft();
    draft.cook_time_minutes = 0;
    assert_eq!(violated_field(validate(&draft)), "cook_time");

    draft.cook_time_minutes = 1441;
    assert_eq!(violated_field(validate(&draft)), "cook_time");

    draft.cook_time_minutes = 1440;
    assert!(validate(&draft).is_ok());
  }

  #[test]
  fn test_servings_bounds() {
    let mut draft = valid_draft();
    draft.servings = 101;
    assert_eq!(violated_field(validate(&draft)), "servings");

    draft.servings = 100;
    assert!(validate(&draft).is_ok());
  }

  #[test]
  fn test_invalid_image_url_rejected() {
    let mut draft = valid_draft();
    draft.image = Some("not a url".to_string());
    assert_eq!(violated_field(validate(&draft)), "image");

    draft.image = Some("https://example.com/soup.jpg".to_string());
    assert!(validate(&draft).is_ok());
  }

  #[test]
  fn test_empty_ingredients_rejected() {
    let mut draft = valid_draft();
    draft.ingredients.clear();
    assert_eq!(violated_field(validate(&draft)), "ingredients");
  }

  #[test]
  fn test_bad_ingredient_amount_rejected() {
    let mut draft = valid_draft();
    draft.ingredients[0].amount = 0.0;
    assert_eq!(violated_field(validate(&draft)), "ingredients");

    draft.ingredients[0].amount = f64::NAN;
    assert_eq!(violated_field(validate(&draft)), "ingredients");
  }

  #[test]
  fn test_empty_instructions_rejected() {
    let mut draft = valid_draft();
    draft.instructions.clear();
    assert_eq!(violated_field(validate(&draft)), "instructions");

    draft.instructions = vec!["   ".to_string()];
    assert_eq!(violated_field(validate(&draft)), "instructions");
  }

  #[test]
  fn test_first_violation_wins() {
    let mut draft = valid_draft();
    draft.title = String::new();
    draft.servings = 0;
    // title is checked before servings
    assert_eq!(violated_field(validate(&draft)), "title");
  }

  #[test]
  fn test_sanitize_trims_text_fields() {
    let mut draft = valid_draft();
    draft.title = "  Soup  ".to_string();
    draft.description = " Hot ".to_string();
    draft.ingredients[0].name = " Carrot ".to_string();
    draft.ingredients[0].unit = " pc ".to_string();
    draft.ingredients[0].category = " Produce ".to_string();
    draft.instructions = vec!["  Boil  ".to_string()];

    let clean = sanitize(draft);
    assert_eq!(clean.title, "Soup");
    assert_eq!(clean.description, "Hot");
    assert_eq!(clean.ingredients[0].name, "Carrot");
    assert_eq!(clean.ingredients[0].unit, "pc");
    assert_eq!(clean.ingredients[0].category, "Produce");
    assert_eq!(clean.instructions, vec!["Boil".to_string()]);

    // Sanitized output still validates.
    assert!(validate(&clean).is_ok());
  }

  #[test]
  fn test_patch_checks_only_present_fields() {
    let patch = RecipePatch {
      title: Some("New title".to_string()),
      ..Default::default()
    };
    assert!(validate_patch(&patch).is_ok());

    let patch = RecipePatch {
      ingredients: Some(Vec::new()),
      ..Default::default()
    };
    assert_eq!(violated_field(validate_patch(&patch)), "ingredients");
  }

  #[test]
  fn test_sanitize_patch_skips_absent_fields() {
    let patch = RecipePatch {
      title: Some("  Stew  ".to_string()),
      ..Default::default()
    };
    let clean = sanitize_patch(patch);
    assert_eq!(clean.title.as_deref(), Some("Stew"));
    assert!(clean.description.is_none());
  }
}
