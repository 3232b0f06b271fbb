//! Response shapes of the two catalogs and their normalization.

use std::collections::HashMap;

use serde::Deserialize;

use crate::models::BookMetadata;

const UNKNOWN_AUTHOR: &str = "Unknown";

/// Open Library keys its answer by the requested bibkey; a miss is `{}`.
pub(super) type OpenLibraryResponse = HashMap<String, OpenLibraryBook>;

#[derive(Debug, Deserialize)]
pub(super) struct OpenLibraryBook {
    title: String,
    #[serde(default)]
    authors: Vec<OpenLibraryAuthor>,
    #[serde(default)]
    notes: Option<OpenLibraryText>,
    #[serde(default)]
    excerpts: Vec<OpenLibraryExcerpt>,
    #[serde(default)]
    cover: Option<OpenLibraryCover>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryAuthor {
    name: String,
}

/// Open Library text fields are either a bare string or `{ "value": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OpenLibraryText {
    Plain(String),
    Typed { value: String },
}

impl OpenLibraryText {
    fn into_string(self) -> String {
        match self {
            OpenLibraryText::Plain(text) | OpenLibraryText::Typed { value: text } => text,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenLibraryExcerpt {
    text: String,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryCover {
    #[serde(default)]
    small: Option<String>,
    #[serde(default)]
    medium: Option<String>,
    #[serde(default)]
    large: Option<String>,
}

impl OpenLibraryBook {
    pub(super) fn into_metadata(self) -> BookMetadata {
        let author = if self.authors.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            self.authors
                .into_iter()
                .map(|a| a.name)
                .collect::<Vec<_>>()
                .join(", ")
        };

        let description = self
            .notes
            .map(OpenLibraryText::into_string)
            .filter(|n| !n.is_empty())
            .or_else(|| self.excerpts.into_iter().next().map(|e| e.text))
            .unwrap_or_default();

        let cover = self.cover.and_then(|c| c.medium.or(c.large).or(c.small));

        BookMetadata {
            title: self.title,
            author,
            description,
            cover,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct GoogleBooksResponse {
    #[serde(default)]
    items: Vec<GoogleVolume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleVolume {
    volume_info: GoogleVolumeInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleVolumeInfo {
    title: String,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image_links: Option<GoogleImageLinks>,
}

#[derive(Debug, Deserialize)]
struct GoogleImageLinks {
    #[serde(default)]
    thumbnail: Option<String>,
}

impl GoogleBooksResponse {
    /// First volume, if any.
    pub(super) fn into_metadata(self) -> Option<BookMetadata> {
        let info = self.items.into_iter().next()?.volume_info;
        let author = if info.authors.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            info.authors.join(", ")
        };

        Some(BookMetadata {
            title: info.title,
            author,
            description: info.description.unwrap_or_default(),
            cover: info.image_links.and_then(|l| l.thumbnail),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_open_library_typed_notes_and_cover_preference() {
        let book: OpenLibraryBook = serde_json::from_value(json!({
            "title": "The C Programming Language",
            "authors": [{ "name": "Brian W. Kernighan" }, { "name": "Dennis M. Ritchie" }],
            "notes": { "type": "/type/text", "value": "Includes index." },
            "cover": { "small": "s.jpg", "large": "l.jpg" }
        }))
        .unwrap();

        let meta = book.into_metadata();
        assert_eq!(meta.author, "Brian W. Kernighan, Dennis M. Ritchie");
        assert_eq!(meta.description, "Includes index.");
        assert_eq!(meta.cover.as_deref(), Some("l.jpg"));
    }

    #[test]
    fn test_open_library_falls_back_to_excerpt_and_unknown_author() {
        let book: OpenLibraryBook = serde_json::from_value(json!({
            "title": "Anonymous Recipes",
            "excerpts": [{ "text": "First excerpt" }, { "text": "Second" }]
        }))
        .unwrap();

        let meta = book.into_metadata();
        assert_eq!(meta.author, "Unknown");
        assert_eq!(meta.description, "First excerpt");
        assert_eq!(meta.cover, None);
    }

    #[test]
    fn test_google_books_empty_is_miss() {
        let body: GoogleBooksResponse = serde_json::from_value(json!({ "totalItems": 0 })).unwrap();
        assert!(body.into_metadata().is_none());
    }

    #[test]
    fn test_google_books_first_volume() {
        let body: GoogleBooksResponse = serde_json::from_value(json!({
            "items": [
                { "volumeInfo": {
                    "title": "Salt Fat Acid Heat",
                    "authors": ["Samin Nosrat"],
                    "imageLinks": { "thumbnail": "t.jpg" }
                } },
                { "volumeInfo": { "title": "Other" } }
            ]
        }))
        .unwrap();

        let meta = body.into_metadata().unwrap();
        assert_eq!(meta.title, "Salt Fat Acid Heat");
        assert_eq!(meta.author, "Samin Nosrat");
        assert_eq!(meta.description, "");
        assert_eq!(meta.cover.as_deref(), Some("t.jpg"));
    }
}
