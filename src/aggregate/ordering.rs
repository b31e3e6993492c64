//! Numeric ordering of `<label>_<index>` member names.

use crate::config::LayoutConfig;
use crate::error::{LcmvError, Result};

/// How the numeric index is pulled out of a member name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Separator between name tokens.
    pub separator: String,
    /// Zero-based token holding the index.
    pub position: usize,
}

impl Default for SortKey {
    fn default() -> Self {
        Self {
            separator: "_".to_string(),
            position: 1,
        }
    }
}

impl From<&LayoutConfig> for SortKey {
    fn from(layout: &LayoutConfig) -> Self {
        Self {
            separator: layout.key_separator.clone(),
            position: layout.key_position,
        }
    }
}

impl SortKey {
    /// Extract the numeric index from `name`.
    pub fn extract(&self, name: &str) -> Result<i64> {
        let token = name
            .split(self.separator.as_str())
            .nth(self.position)
            .ok_or_else(|| LcmvError::InvalidMemberName {
                name: name.to_string(),
                reason: format!(
                    "expected at least {} '{}'-separated tokens",
                    self.position + 1,
                    self.separator
                ),
            })?;

        token
            .trim()
            .parse::<i64>()
            .map_err(|e| LcmvError::InvalidMemberName {
                name: name.to_string(),
                reason: format!("index token '{}' is not an integer ({})", token, e),
            })
    }

    /// Sort `names` ascending by index.
    ///
    /// Every key is extracted before sorting; the first invalid name aborts.
    /// Names with equal indices keep their input order.
    pub fn order(&self, names: Vec<String>) -> Result<Vec<String>> {
        let mut keyed = names
            .into_iter()
            .map(|name| self.extract(&name).map(|key| (key, name)))
            .collect::<Result<Vec<_>>>()?;

        keyed.sort_by_key(|(key, _)| *key);
        Ok(keyed.into_iter().map(|(_, name)| name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_default() {
        let key = SortKey::default();
        assert_eq!(key.extract("pos_0").unwrap(), 0);
        assert_eq!(key.extract("pos_42").unwrap(), 42);
        assert_eq!(key.extract("pos_7_extra").unwrap(), 7);
        assert_eq!(key.extract("pos_-3").unwrap(), -3);
    }

    #[test]
    fn test_extract_allows_surrounding_whitespace() {
        let key = SortKey::default();
        assert_eq!(key.extract("pos_ 3").unwrap(), 3);
        assert_eq!(key.extract("pos_12 ").unwrap(), 12);
        assert!(key.extract("pos_ ").is_err());
    }

    #[test]
    fn test_extract_missing_token() {
        let key = SortKey::default();
        let err = key.extract("position").unwrap_err();
        assert!(matches!(err, LcmvError::InvalidMemberName { .. }));
    }

    #[test]
    fn test_extract_non_integer() {
        let key = SortKey::default();
        assert!(key.extract("pos_x").is_err());
        assert!(key.extract("pos_").is_err());
        assert!(key.extract("pos_1.5").is_err());
    }

    #[test]
    fn test_order_is_numeric_not_insertion() {
        let key = SortKey::default();
        let ordered = key.order(names(&["pos_0", "pos_2", "pos_1"])).unwrap();
        assert_eq!(ordered, names(&["pos_0", "pos_1", "pos_2"]));
    }

    #[test]
    fn test_order_is_numeric_not_lexical() {
        let key = SortKey::default();
        let ordered = key
            .order(names(&["sp_1", "sp_10", "sp_2", "sp_0"]))
            .unwrap();
        assert_eq!(ordered, names(&["sp_0", "sp_1", "sp_2", "sp_10"]));
    }

    #[test]
    fn test_order_ties_are_stable() {
        let key = SortKey::default();
        let ordered = key.order(names(&["b_1", "a_1", "c_0"])).unwrap();
        assert_eq!(ordered, names(&["c_0", "b_1", "a_1"]));
    }

    #[test]
    fn test_order_fails_on_any_invalid_name() {
        let key = SortKey::default();
        assert!(key.order(names(&["pos_0", "notes", "pos_1"])).is_err());
    }

    #[test]
    fn test_custom_separator_and_position() {
        let key = SortKey {
            separator: "-".to_string(),
            position: 2,
        };
        let ordered = key.order(names(&["a-b-3", "a-b-1"])).unwrap();
        assert_eq!(ordered, names(&["a-b-1", "a-b-3"]));
    }

    #[test]
    fn test_from_layout() {
        let key = SortKey::from(&LayoutConfig::default());
        assert_eq!(key, SortKey::default());
    }
}
