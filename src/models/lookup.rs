//! Normalized book metadata returned by the lookup adapter.

use serde::Serialize;

/// Title/author/description of a book, regardless of which catalog answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}
