use serde::{Deserialize, Serialize};
use tracing::warn;

/// Maximum number of cities kept in the history.
pub const MAX_RECENT: usize = 6;

/// Most-recent-first list of searched cities, unique ignoring case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentSearches(Vec<String>);

impl RecentSearches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the persisted JSON array. Corrupt input yields an empty list.
    pub fn from_stored(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::default();
        };

        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(cities) => {
                // Replay oldest first so the stored order is kept and the rules still hold.
                let mut recent = Self::default();
                for city in cities.iter().rev() {
                    recent.record(city);
                }
                recent
            }
            Err(e) => {
                warn!("Ignoring unreadable recent searches: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_stored(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }

    /// Move `city` to the front, dropping any entry equal to it ignoring case.
    pub fn record(&mut self, city: &str) {
        if city.is_empty() {
            return;
        }
        let lowered = city.to_lowercase();
        self.0.retain(|existing| existing.to_lowercase() != lowered);
        self.0.insert(0, city.to_owned());
        self.0.truncate(MAX_RECENT);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorded(cities: &[&str]) -> RecentSearches {
        let mut recent = RecentSearches::new();
        for city in cities {
            recent.record(city);
        }
        recent
    }

    #[test]
    fn case_variant_replaces_and_moves_to_front() {
        let recent = recorded(&["Tokyo", "London", "tokyo"]);
        assert_eq!(recent.as_slice(), ["tokyo", "London"]);
    }

    #[test]
    fn list_is_capped_at_six() {
        let recent = recorded(&["A", "B", "C", "D", "E", "F", "G", "H"]);

        assert_eq!(recent.len(), MAX_RECENT);
        assert_eq!(recent.as_slice(), ["H", "G", "F", "E", "D", "C"]);
    }

    #[test]
    fn no_case_insensitive_duplicates_for_long_sequences() {
        let cities = ["Paris", "PARIS", "Rome", "rome", "Oslo", "paris", "Lima", "Kyiv", "ROME"];
        let recent = recorded(&cities);

        let mut lowered: Vec<String> = recent.iter().map(str::to_lowercase).collect();
        lowered.sort();
        lowered.dedup();

        assert_eq!(lowered.len(), recent.len());
        assert!(recent.len() <= MAX_RECENT);
        assert_eq!(recent.iter().next(), Some("ROME"));
    }

    #[test]
    fn stored_form_is_a_plain_json_array() {
        let recent = recorded(&["Tokyo", "London"]);
        assert_eq!(recent.to_stored(), r#"["London","Tokyo"]"#);

        let decoded = RecentSearches::from_stored(Some(&recent.to_stored()));
        assert_eq!(decoded, recent);
    }

    #[test]
    fn corrupt_or_missing_storage_is_empty() {
        assert!(RecentSearches::from_stored(None).is_empty());
        assert!(RecentSearches::from_stored(Some("not json")).is_empty());
        assert!(RecentSearches::from_stored(Some(r#"{"city":"Oslo"}"#)).is_empty());
    }

    #[test]
    fn oversized_storage_is_normalised_on_load() {
        let stored = r#"["a","b","A","c","d","e","f","g"]"#;
        let recent = RecentSearches::from_stored(Some(stored));

        assert_eq!(recent.as_slice(), ["a", "b", "c", "d", "e", "f"]);
    }
}
