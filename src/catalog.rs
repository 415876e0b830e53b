//! In-memory catalog built once at startup from the registry snapshot.

use crate::category::{self, Category};
use crate::entry::AppEntry;
use crate::registry;
use std::collections::{BTreeMap, HashMap};

/// Name of the synthetic category listing every entry.
pub const ALL_APPLICATIONS: &str = "All Applications";
/// Icon for the synthetic "All Applications" row.
pub const ALL_APPLICATIONS_ICON: &str = "applications-other";

/// Read-only view over the discovered entries.
///
/// Entries are addressed by index; indices stay valid for the lifetime of
/// the catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<AppEntry>,
    categories: BTreeMap<Category, Vec<usize>>,
    by_key: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog.  `entries` are re-sorted into canonical name order.
    pub fn new(mut entries: Vec<AppEntry>) -> Self {
        registry::sort_by_name(&mut entries);
        let categories = category::classify(&entries);
        let by_key = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.key(), i))
            .collect();
        Self {
            entries,
            categories,
            by_key,
        }
    }

    pub fn entries(&self) -> &[AppEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&AppEntry> {
        self.entries.get(index)
    }

    /// Index of the entry with this id (case-insensitive).
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_key.get(&id.to_lowercase()).copied()
    }

    /// Non-empty categories in display order.
    pub fn categories(&self) -> impl Iterator<Item = (Category, &[usize])> {
        self.categories.iter().map(|(c, m)| (*c, m.as_slice()))
    }

    /// Every entry index, in canonical order.
    pub fn all_indices(&self) -> Vec<usize> {
        (0..self.entries.len()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str, tags: &[&str]) -> AppEntry {
        AppEntry {
            categories: tags.iter().map(|t| t.to_string()).collect(),
            ..AppEntry::new(id, name)
        }
    }

    #[test]
    fn entries_are_sorted_and_indexed() {
        let catalog = Catalog::new(vec![
            entry("b.desktop", "beta", &[]),
            entry("A.desktop", "Alpha", &["Game"]),
        ]);
        assert_eq!(catalog.get(0).map(|e| e.name.as_str()), Some("Alpha"));
        assert_eq!(catalog.index_of("a.desktop"), Some(0));
        assert_eq!(catalog.index_of("B.DESKTOP"), Some(1));
        assert_eq!(catalog.index_of("missing.desktop"), None);
    }

    #[test]
    fn categories_follow_sorted_entries() {
        let catalog = Catalog::new(vec![
            entry("z.desktop", "Zork", &["Game"]),
            entry("a.desktop", "Asteroids", &["Game"]),
            entry("o.desktop", "Other thing", &[]),
        ]);
        let cats: Vec<(Category, Vec<usize>)> = catalog
            .categories()
            .map(|(c, m)| (c, m.to_vec()))
            .collect();
        assert_eq!(
            cats,
            vec![(Category::Games, vec![0, 2]), (Category::Other, vec![1])]
        );
        assert_eq!(catalog.all_indices(), vec![0, 1, 2]);
    }
}
