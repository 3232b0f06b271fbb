//! Lookup adapter: ISBN to book metadata via chained public catalogs.
//!
//! Open Library is asked first and Google Books second. The first hit wins.

mod catalogs;
#[allow(dead_code)]
mod scanner;

use std::time::Duration;

use reqwest::Client;

use crate::errors::AppError;
use crate::models::BookMetadata;
use catalogs::{GoogleBooksResponse, OpenLibraryResponse};

pub struct LookupAdapter {
    http: Client,
    open_library_url: String,
    google_books_url: String,
}

impl LookupAdapter {
    pub fn new(
        open_library_url: &str,
        google_books_url: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            open_library_url: open_library_url.trim_end_matches('/').to_string(),
            google_books_url: google_books_url.trim_end_matches('/').to_string(),
        })
    }

    /// Metadata for `identifier`, or `None` on a miss.
    ///
    /// Transport and decode failures are logged and reported as a miss.
    pub async fn lookup(&self, identifier: &str) -> Option<BookMetadata> {
        match self.try_lookup(identifier).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!(identifier, "Error fetching book data: {}", e);
                None
            }
        }
    }

    /// Like [`lookup`](Self::lookup), but keeps failures apart from misses.
    pub async fn try_lookup(&self, identifier: &str) -> Result<Option<BookMetadata>, AppError> {
        let isbn = normalize_isbn(identifier);
        if isbn.is_empty() {
            return Err(AppError::Validation("ISBN is required".to_string()));
        }

        if let Some(found) = self.open_library(&isbn).await? {
            tracing::debug!(isbn = %isbn, "Open Library hit");
            return Ok(Some(found));
        }

        let found = self.google_books(&isbn).await?;
        if found.is_some() {
            tracing::debug!(isbn = %isbn, "Google Books hit");
        }
        Ok(found)
    }

    async fn open_library(&self, isbn: &str) -> Result<Option<BookMetadata>, AppError> {
        let bibkey = format!("ISBN:{}", isbn);
        let response = self
            .http
            .get(format!("{}/api/books", self.open_library_url))
            .query(&[
                ("bibkeys", bibkey.as_str()),
                ("format", "json"),
                ("jscmd", "data"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let mut body: OpenLibraryResponse = response.json().await?;
        Ok(body.remove(&bibkey).map(|entry| entry.into_metadata()))
    }

    async fn google_books(&self, isbn: &str) -> Result<Option<BookMetadata>, AppError> {
        let query = format!("isbn:{}", isbn);
        let response = self
            .http
            .get(format!("{}/books/v1/volumes", self.google_books_url))
            .query(&[("q", query.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: GoogleBooksResponse = response.json().await?;
        Ok(body.into_metadata())
    }
}

/// Strip whitespace and hyphens from a typed or scanned identifier.
pub fn normalize_isbn(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// 13 digits, or 9 digits followed by a digit or `X`.
pub fn is_plausible_isbn(identifier: &str) -> bool {
    let isbn = normalize_isbn(identifier);
    let bytes = isbn.as_bytes();
    match bytes.len() {
        13 => bytes.iter().all(u8::is_ascii_digit),
        10 => {
            bytes[..9].iter().all(u8::is_ascii_digit)
                && (bytes[9].is_ascii_digit() || bytes[9] == b'X' || bytes[9] == b'x')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_isbn() {
        assert_eq!(normalize_isbn(" 978-0-13-110362-7 "), "9780131103627");
    }

    #[test]
    fn test_plausible_isbn() {
        assert!(is_plausible_isbn("9780131103627"));
        assert!(is_plausible_isbn("0-13-110362-8"));
        assert!(is_plausible_isbn("080442957X"));
        assert!(!is_plausible_isbn("12345"));
        assert!(!is_plausible_isbn("97801311036ab"));
        assert!(!is_plausible_isbn("https://example.com"));
    }
}
