//! Data models for the cookbook archive.
//!
//! Row types mirror the backend tables exactly; decoding is strict apart from the
//! normalizations in [`wire`].

mod cookbook;
mod lookup;
mod recipe;
mod session;
mod stats;
pub mod wire;

pub use cookbook::*;
pub use lookup::*;
pub use recipe::*;
pub use session::*;
pub use stats::*;

/// Trim every entry of a one-per-line list and drop the blank ones.
pub fn clean_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Empty or whitespace-only optional text collapses to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_lines_drops_blank_entries() {
        let lines = vec![
            " Coq au Vin ".to_string(),
            "".to_string(),
            "   ".to_string(),
            "Ratatouille".to_string(),
        ];
        assert_eq!(clean_lines(lines), vec!["Coq au Vin", "Ratatouille"]);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some("Shelf".to_string())), Some("Shelf".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
