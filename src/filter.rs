use std::collections::BTreeSet;

use crate::types::Pokemon;

/// Client-side row filter: name substring plus allowed type tags.
///
/// Both parts are case-insensitive. An empty `types` set places no
/// restriction on types; a non-empty one keeps rows carrying at least one
/// of the listed types.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    text: String,
    types: BTreeSet<String>,
}

impl RowFilter {
    pub fn new(text: &str, types: impl IntoIterator<Item = String>) -> Self {
        let mut f = Self::default();
        f.set_text(text);
        f.set_types(types);
        f
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    pub fn push_char(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn pop_char(&mut self) {
        self.text.pop();
    }

    pub fn clear_text(&mut self) {
        self.text.clear();
    }

    pub fn types(&self) -> &BTreeSet<String> {
        &self.types
    }

    pub fn set_types(&mut self, types: impl IntoIterator<Item = String>) {
        self.types = types
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.types.contains(&name.to_lowercase())
    }

    /// Add `name` if absent, remove it otherwise. Returns true if now selected.
    pub fn toggle_type(&mut self, name: &str) -> bool {
        let key = name.to_lowercase();
        if self.types.remove(&key) {
            false
        } else {
            self.types.insert(key);
            true
        }
    }

    pub fn clear_types(&mut self) {
        self.types.clear();
    }

    pub fn clear(&mut self) {
        self.clear_text();
        self.clear_types();
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.types.is_empty()
    }

    pub fn matches(&self, p: &Pokemon) -> bool {
        if self.is_empty() {
            return true;
        }
        if !self.text.is_empty() && !p.name.to_lowercase().contains(&self.text.to_lowercase()) {
            return false;
        }
        self.types.is_empty() || p.types.iter().any(|t| self.types.contains(&t.to_lowercase()))
    }

    /// Order-preserving scan: text first, then types.
    pub fn apply<'a>(&self, rows: &'a [Pokemon]) -> Vec<&'a Pokemon> {
        if self.is_empty() {
            return rows.iter().collect();
        }
        let needle = self.text.to_lowercase();
        let by_name = rows
            .iter()
            .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle));
        if self.types.is_empty() {
            by_name.collect()
        } else {
            by_name
                .filter(|p| p.types.iter().any(|t| self.types.contains(&t.to_lowercase())))
                .collect()
        }
    }
}

/// One-shot form of [`RowFilter::apply`].
pub fn filter_rows<'a>(rows: &'a [Pokemon], text: &str, types: &[String]) -> Vec<&'a Pokemon> {
    RowFilter::new(text, types.iter().cloned()).apply(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pokemon;

    fn mon(id: u32, name: &str, types: &[&str]) -> Pokemon {
        Pokemon {
            id,
            name: name.into(),
            image: None,
            types: types.iter().map(|t| t.to_string()).collect(),
            stats: vec![],
        }
    }

    fn page() -> Vec<Pokemon> {
        vec![
            mon(1, "bulbasaur", &["grass", "poison"]),
            mon(4, "charmander", &["fire"]),
            mon(6, "charizard", &["fire", "flying"]),
            mon(7, "squirtle", &["water"]),
        ]
    }

    fn ids(rows: &[&Pokemon]) -> Vec<u32> {
        rows.iter().map(|p| p.id).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let rows = page();
        assert_eq!(ids(&RowFilter::default().apply(&rows)), vec![1, 4, 6, 7]);
    }

    #[test]
    fn name_match_is_case_insensitive_substring() {
        let rows = page();
        assert_eq!(ids(&filter_rows(&rows, "CHAR", &[])), vec![4, 6]);
        assert_eq!(ids(&filter_rows(&rows, "saur", &[])), vec![1]);
        assert!(filter_rows(&rows, "pikachu", &[]).is_empty());
    }

    #[test]
    fn any_selected_type_matches() {
        let rows = page();
        let types = vec!["flying".to_string(), "water".to_string()];
        assert_eq!(ids(&filter_rows(&rows, "", &types)), vec![6, 7]);
    }

    #[test]
    fn text_and_types_combine() {
        let rows = page();
        let types = vec!["Fire".to_string()];
        assert_eq!(ids(&filter_rows(&rows, "zard", &types)), vec![6]);
        assert!(filter_rows(&rows, "squirt", &types).is_empty());
    }

    #[test]
    fn toggle_type_round_trips() {
        let mut f = RowFilter::default();
        assert!(f.toggle_type("Grass"));
        assert!(f.has_type("grass"));
        assert!(!f.toggle_type("grass"));
        assert!(f.is_empty());
    }

    #[test]
    fn matches_agrees_with_apply() {
        let rows = page();
        let f = RowFilter::new("a", ["fire".to_string()]);
        let via_matches: Vec<u32> = rows.iter().filter(|p| f.matches(p)).map(|p| p.id).collect();
        assert_eq!(via_matches, ids(&f.apply(&rows)));
    }

    #[test]
    fn blank_type_names_are_ignored() {
        let f = RowFilter::new("", [" ".to_string(), "".to_string()]);
        assert!(f.is_empty());
    }
}
