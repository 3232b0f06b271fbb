//! Local list patches applied after a successful remote write.

use super::Record;

/// New rows go first: the list is newest-first.
pub(super) fn prepend<R: Record>(items: &mut Vec<R>, row: R) {
    items.insert(0, row);
}

/// Replace the entry with `id`, keeping its position.
pub(super) fn replace<R: Record>(items: &mut [R], id: i64, row: R) {
    if let Some(slot) = items.iter_mut().find(|r| r.id() == id) {
        *slot = row;
    }
}

pub(super) fn remove<R: Record>(items: &mut Vec<R>, id: i64) {
    items.retain(|r| r.id() != id);
}

pub(super) fn set_favorite<R: Record>(items: &mut [R], id: i64, favorite: bool) {
    if let Some(item) = items.iter_mut().find(|r| r.id() == id) {
        item.set_favorite(favorite);
    }
}

pub(super) fn filter<R: Record>(items: &[R], term: &str) -> Vec<R> {
    let needle = term.trim().to_lowercase();
    items
        .iter()
        .filter(|r| needle.is_empty() || r.matches(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cookbook, Recipe};
    use uuid::Uuid;

    fn book(id: i64, title: &str, description: Option<&str>) -> Cookbook {
        Cookbook {
            id,
            user_id: Uuid::nil(),
            title: title.to_string(),
            author: "Author".to_string(),
            description: description.map(str::to_string),
            location: None,
            is_favorite: false,
            favorite_recipes: Vec::new(),
            created_at: None,
        }
    }

    fn recipe(id: i64, title: &str, source: &str) -> Recipe {
        Recipe {
            id,
            user_id: Uuid::nil(),
            title: title.to_string(),
            source: source.to_string(),
            ingredients: Vec::new(),
            instructions: "Cook.".to_string(),
            notes: None,
            is_favorite: false,
            created_at: None,
        }
    }

    #[test]
    fn test_prepend_puts_new_row_first() {
        let mut items = vec![book(1, "Old", None)];
        prepend(&mut items, book(2, "New", None));
        assert_eq!(items.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut items = vec![book(3, "C", None), book(2, "B", None), book(1, "A", None)];
        replace(&mut items, 2, book(2, "B2", None));
        assert_eq!(items[1].title, "B2");
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_remove_absent_id_is_noop() {
        let mut items = vec![book(1, "A", None), book(2, "B", None)];
        let before = items.clone();
        remove(&mut items, 99);
        assert_eq!(items, before);

        remove(&mut items, 1);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 2);
    }

    #[test]
    fn test_set_favorite_only_touches_target() {
        let mut items = vec![book(1, "A", None), book(2, "B", None)];
        set_favorite(&mut items, 2, true);
        assert!(!items[0].is_favorite);
        assert!(items[1].is_favorite);
    }

    #[test]
    fn test_filter_cookbooks_by_title_or_description() {
        let items = vec![
            book(1, "The Joy of Cooking", Some("A classic")),
            book(2, "Mastering the Art", Some("FRENCH cuisine")),
            book(3, "Plenty", None),
        ];
        let hits: Vec<i64> = filter(&items, "French").iter().map(|b| b.id).collect();
        assert_eq!(hits, vec![2]);
        let hits: Vec<i64> = filter(&items, "JOY").iter().map(|b| b.id).collect();
        assert_eq!(hits, vec![1]);
        assert_eq!(filter(&items, "").len(), 3);
    }

    #[test]
    fn test_filter_recipes_by_title_or_source() {
        let items = vec![
            recipe(1, "Pancakes", "Family"),
            recipe(2, "Ramen", "YouTube"),
        ];
        let hits: Vec<i64> = filter(&items, "youtube").iter().map(|r| r.id).collect();
        assert_eq!(hits, vec![2]);
        let hits: Vec<i64> = filter(&items, "cake").iter().map(|r| r.id).collect();
        assert_eq!(hits, vec![1]);
    }
}
