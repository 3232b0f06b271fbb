//! Deserialization helpers for backend rows.
//!
//! The backend is loose about a few columns; everything else is decoded strictly.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Int(i64),
    Text(String),
}

/// Accept an integer id or a numeric string and normalize to `i64`.
pub fn int_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match IdRepr::deserialize(deserializer)? {
        IdRepr::Int(id) => Ok(id),
        IdRepr::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("id {:?} is not an integer", text))),
    }
}

/// A nullable boolean column; `null` reads as `false`.
pub fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// A nullable array column; `null` reads as empty.
pub fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct LooseRow {
        #[serde(deserialize_with = "int_id")]
        id: i64,
        #[serde(default, deserialize_with = "null_as_false")]
        flag: bool,
        #[serde(default, deserialize_with = "null_as_empty")]
        items: Vec<String>,
    }

    #[test]
    fn test_string_id_is_normalized() {
        let row: LooseRow = serde_json::from_str(r#"{"id": "42"}"#).unwrap();
        assert_eq!(row.id, 42);
    }

    #[test]
    fn test_non_numeric_id_is_rejected() {
        let result: Result<LooseRow, _> = serde_json::from_str(r#"{"id": "abc"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_nulls_fall_back() {
        let row: LooseRow = serde_json::from_str(r#"{"id": 7, "flag": null, "items": null}"#).unwrap();
        assert_eq!(row.id, 7);
        assert!(!row.flag);
        assert!(row.items.is_empty());
    }
}
