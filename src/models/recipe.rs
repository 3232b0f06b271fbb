//! Recipe model matching the backend `recipes` table.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{clean_lines, non_blank, wire};
use crate::errors::AppError;
use crate::store::Record;

/// A recipe in the user's collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(deserialize_with = "wire::int_id")]
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    /// Where the recipe came from ("Family", a link, a cookbook title, ...)
    #[serde(default)]
    pub source: String,
    #[serde(default, deserialize_with = "wire::null_as_empty")]
    pub ingredients: Vec<String>,
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        rename = "isFavorite",
        alias = "is_favorite",
        alias = "isfavorite",
        default,
        deserialize_with = "wire::null_as_false"
    )]
    pub is_favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Writable recipe columns; also the body of create and edit requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeInput {
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub instructions: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(rename = "isFavorite", default)]
    pub is_favorite: bool,
}

impl RecipeInput {
    /// Reject input with an empty title or empty instructions.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        if self.instructions.trim().is_empty() {
            return Err(AppError::Validation("Instructions are required".to_string()));
        }
        Ok(())
    }

    pub fn normalized(self) -> Self {
        Self {
            title: self.title,
            source: self.source.trim().to_string(),
            ingredients: clean_lines(self.ingredients),
            instructions: self.instructions,
            notes: non_blank(self.notes),
            is_favorite: self.is_favorite,
        }
    }
}

impl Recipe {
    /// The record that results from replacing every writable column with `input`.
    pub fn with_changes(&self, input: RecipeInput) -> Self {
        Self {
            id: self.id,
            user_id: self.user_id,
            title: input.title,
            source: input.source,
            ingredients: input.ingredients,
            instructions: input.instructions,
            notes: input.notes,
            is_favorite: input.is_favorite,
            created_at: self.created_at.clone(),
        }
    }
}

impl Record for Recipe {
    type Input = RecipeInput;

    const TABLE: &'static str = "recipes";
    const LABEL: &'static str = "Recipe";

    fn id(&self) -> i64 {
        self.id
    }

    fn owner(&self) -> Uuid {
        self.user_id
    }

    fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    fn set_favorite(&mut self, favorite: bool) {
        self.is_favorite = favorite;
    }

    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.source.to_lowercase().contains(needle)
    }

    fn changes(&self) -> RecipeInput {
        RecipeInput {
            title: self.title.clone(),
            source: self.source.clone(),
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.clone(),
            notes: self.notes.clone(),
            is_favorite: self.is_favorite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(title: &str, source: &str) -> Recipe {
        Recipe {
            id: 1,
            user_id: Uuid::nil(),
            title: title.to_string(),
            source: source.to_string(),
            ingredients: vec!["2 eggs".to_string()],
            instructions: "Whisk.".to_string(),
            notes: Some("Grandma's favorite".to_string()),
            is_favorite: false,
            created_at: None,
        }
    }

    #[test]
    fn test_matches_title_and_source() {
        let r = recipe("Beef Stroganoff", "YouTube");
        assert!(r.matches("stroganoff"));
        assert!(r.matches("youtube"));
        assert!(!r.matches("grandma"));
    }

    #[test]
    fn test_validate_requires_instructions() {
        let input = RecipeInput {
            title: "Pancakes".to_string(),
            instructions: " ".to_string(),
            ..Default::default()
        };
        assert!(matches!(input.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_normalized_cleans_ingredients() {
        let input = RecipeInput {
            title: "Pancakes".to_string(),
            source: " Family ".to_string(),
            ingredients: vec!["flour ".to_string(), "".to_string(), " milk".to_string()],
            instructions: "Mix and fry.".to_string(),
            notes: Some("".to_string()),
            is_favorite: false,
        }
        .normalized();
        assert_eq!(input.source, "Family");
        assert_eq!(input.ingredients, vec!["flour", "milk"]);
        assert_eq!(input.notes, None);
    }

    #[test]
    fn test_decode_rejects_missing_instructions() {
        let row = r#"{"id": 1, "user_id": "7f0c1a9e-3d1b-4c57-9a52-2b3f4c5d6e7f", "title": "Soup"}"#;
        assert!(serde_json::from_str::<Recipe>(row).is_err());
    }
}
