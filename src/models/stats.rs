//! Aggregate statistics shown on the home and profile pages.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_cookbooks: usize,
    pub favorite_cookbooks: usize,
    pub total_recipes: usize,
    pub favorite_recipes: usize,
}

impl UserStats {
    pub fn total_favorites(&self) -> usize {
        self.favorite_cookbooks + self.favorite_recipes
    }
}
