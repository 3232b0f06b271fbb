//! Cookbook model matching the backend `cookbooks` table.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{clean_lines, non_blank, wire};
use crate::errors::AppError;
use crate::store::Record;

/// A physical cookbook in the user's collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookbook {
    #[serde(deserialize_with = "wire::int_id")]
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        rename = "isFavorite",
        alias = "is_favorite",
        alias = "isfavorite",
        default,
        deserialize_with = "wire::null_as_false"
    )]
    pub is_favorite: bool,
    #[serde(
        rename = "favoriteRecipes",
        alias = "favorite_recipes",
        alias = "favoriterecipes",
        default,
        deserialize_with = "wire::null_as_empty"
    )]
    pub favorite_recipes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Writable cookbook columns; also the body of create and edit requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CookbookInput {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "isFavorite", default)]
    pub is_favorite: bool,
    #[serde(rename = "favoriteRecipes", default)]
    pub favorite_recipes: Vec<String>,
}

impl CookbookInput {
    /// Reject input with an empty title or author.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        if self.author.trim().is_empty() {
            return Err(AppError::Validation("Author is required".to_string()));
        }
        Ok(())
    }

    /// Drop blank optional fields and blank favorite-recipe lines.
    pub fn normalized(self) -> Self {
        Self {
            title: self.title,
            author: self.author,
            description: non_blank(self.description),
            location: non_blank(self.location),
            is_favorite: self.is_favorite,
            favorite_recipes: clean_lines(self.favorite_recipes),
        }
    }
}

impl Cookbook {
    /// The record that results from replacing every writable column with `input`.
    pub fn with_changes(&self, input: CookbookInput) -> Self {
        Self {
            id: self.id,
            user_id: self.user_id,
            title: input.title,
            author: input.author,
            description: input.description,
            location: input.location,
            is_favorite: input.is_favorite,
            favorite_recipes: input.favorite_recipes,
            created_at: self.created_at.clone(),
        }
    }
}

impl Record for Cookbook {
    type Input = CookbookInput;

    const TABLE: &'static str = "cookbooks";
    const LABEL: &'static str = "Cookbook";

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
        self.title.to_lowercase().contains(needle)
            || self
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }

    fn changes(&self) -> CookbookInput {
        CookbookInput {
            title: self.title.clone(),
            author: self.author.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            is_favorite: self.is_favorite,
            favorite_recipes: self.favorite_recipes.clone(),
        }
    }
}
