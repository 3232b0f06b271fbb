//! Configuration module for the cookbook archive.
//!
//! All configuration is loaded from environment variables with sensible defaults.
//! Only the backend URL and key are required.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted auth/database backend
    pub backend_url: String,
    /// Public (anon) API key sent with every backend request
    pub backend_key: String,
    /// Path to the SQLite file holding the persisted session
    pub session_db_path: PathBuf,
    /// Address to bind the app server to
    pub bind_addr: SocketAddr,
    /// Base URL of the primary book catalog
    pub open_library_url: String,
    /// Base URL of the secondary book catalog
    pub google_books_url: String,
    /// Timeout applied to every outbound HTTP request
    pub http_timeout: Duration,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let backend_url = required("COOKBOOK_BACKEND_URL")?;
        let backend_key = required("COOKBOOK_BACKEND_KEY")?;

        let session_db_path = env::var("COOKBOOK_SESSION_DB")
            .unwrap_or_else(|_| "./data/session.sqlite".to_string())
            .into();

        let bind_addr = env::var("COOKBOOK_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5173".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid COOKBOOK_BIND_ADDR: {}", e)))?;

        let open_library_url = env::var("COOKBOOK_OPEN_LIBRARY_URL")
            .unwrap_or_else(|_| "https://openlibrary.org".to_string());

        let google_books_url = env::var("COOKBOOK_GOOGLE_BOOKS_URL")
            .unwrap_or_else(|_| "https://www.googleapis.com".to_string());

        let timeout_secs: u64 = env::var("COOKBOOK_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid COOKBOOK_HTTP_TIMEOUT_SECS: {}", e)))?;

        let log_level = env::var("COOKBOOK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            backend_url: trim_trailing_slash(backend_url),
            backend_key,
            session_db_path,
            bind_addr,
            open_library_url: trim_trailing_slash(open_library_url),
            google_books_url: trim_trailing_slash(google_books_url),
            http_timeout: Duration::from_secs(timeout_secs),
            log_level,
        })
    }
}

fn required(key: &str) -> Result<String, AppError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!("{} must be set", key))),
    }
}

fn trim_trailing_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 8] = [
        "COOKBOOK_BACKEND_URL",
        "COOKBOOK_BACKEND_KEY",
        "COOKBOOK_SESSION_DB",
        "COOKBOOK_BIND_ADDR",
        "COOKBOOK_OPEN_LIBRARY_URL",
        "COOKBOOK_GOOGLE_BOOKS_URL",
        "COOKBOOK_HTTP_TIMEOUT_SECS",
        "COOKBOOK_LOG_LEVEL",
    ];

    // Environment is process-global, so both cases live in one test.
    #[test]
    fn test_config_from_env() {
        for key in KEYS {
            env::remove_var(key);
        }

        let missing = Config::from_env();
        assert!(matches!(missing, Err(AppError::Config(_))));

        env::set_var("COOKBOOK_BACKEND_URL", "https://example.supabase.co/");
        env::set_var("COOKBOOK_BACKEND_KEY", "anon-key");

        let config = Config::from_env().unwrap();

        assert_eq!(config.backend_url, "https://example.supabase.co");
        assert_eq!(config.backend_key, "anon-key");
        assert_eq!(config.session_db_path, PathBuf::from("./data/session.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:5173");
        assert_eq!(config.open_library_url, "https://openlibrary.org");
        assert_eq!(config.google_books_url, "https://www.googleapis.com");
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.log_level, "info");

        env::remove_var("COOKBOOK_BACKEND_URL");
        env::remove_var("COOKBOOK_BACKEND_KEY");
    }
}
