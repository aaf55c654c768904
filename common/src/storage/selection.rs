use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-document inclusion flags. Absent ids count as selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState {
    flags: BTreeMap<String, bool>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks new ids as selected. Existing flags are left alone.
    pub fn initialize<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.flags.entry(id.to_string()).or_insert(true);
        }
    }

    pub fn toggle(&mut self, id: &str) {
        let next = !self.is_selected(id);
        self.flags.insert(id.to_string(), next);
    }

    pub fn set(&mut self, id: &str, selected: bool) {
        self.flags.insert(id.to_string(), selected);
    }

    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.set(id, true);
        }
    }

    pub fn clear_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.set(id, false);
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.flags.get(id).copied().unwrap_or(true)
    }

    pub fn is_tracked(&self, id: &str) -> bool {
        self.flags.contains_key(id)
    }

    pub fn tracked_len(&self) -> usize {
        self.flags.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_default_to_selected() {
        let mut selection = SelectionState::new();
        assert!(selection.is_selected("never-seen"));

        selection.initialize(["1", "2"]);
        assert!(selection.is_tracked("1"));
        assert!(selection.is_selected("1"));
        assert!(selection.is_selected("2"));
    }

    #[test]
    fn toggling_twice_restores_state() {
        let mut selection = SelectionState::new();
        selection.initialize(["1"]);

        selection.toggle("1");
        assert!(!selection.is_selected("1"));
        selection.toggle("1");
        assert!(selection.is_selected("1"));
    }

    #[test]
    fn initialize_preserves_existing_choice() {
        let mut selection = SelectionState::new();
        selection.initialize(["1", "2"]);
        selection.toggle("1");

        selection.initialize(["1", "2", "3"]);
        assert!(!selection.is_selected("1"));
        assert!(selection.is_selected("3"));
        assert_eq!(selection.tracked_len(), 3);
    }

    #[test]
    fn bulk_operations_only_touch_the_given_subset() {
        let mut selection = SelectionState::new();
        selection.initialize(["1", "2", "3", "4"]);
        selection.toggle("4");

        selection.clear_all(["1", "2"]);
        assert!(!selection.is_selected("1"));
        assert!(!selection.is_selected("2"));
        assert!(selection.is_selected("3"));
        assert!(!selection.is_selected("4"));

        selection.select_all(["2"]);
        assert!(!selection.is_selected("1"));
        assert!(selection.is_selected("2"));
        assert!(!selection.is_selected("4"));
    }

    #[test]
    fn serializes_as_a_plain_map() {
        let mut selection = SelectionState::new();
        selection.initialize(["1"]);
        selection.toggle("1");

        let json = serde_json::to_string(&selection).expect("serialize");
        assert_eq!(json, r#"{"1":false}"#);
        let back: SelectionState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, selection);
    }
}
