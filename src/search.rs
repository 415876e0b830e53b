//! Tiered, case-insensitive search over the catalog.
//!
//! Results come in three disjoint tiers, concatenated in this order:
//!
//! 1. the display name equals the query,
//! 2. the display name contains the query,
//! 3. description, keywords or generic name contain the query.
//!
//! Within a tier the input order is preserved, so a name-sorted corpus
//! gives name-sorted tiers.

use crate::entry::AppEntry;

/// How many results a frontend shows.
pub const MAX_RESULTS: usize = 20;

/// Indices into `entries` matching `query`, best tier first.
///
/// An empty query matches nothing; callers treat it as "leave search"
/// rather than "show everything".  Whitespace is matched literally.
pub fn search(query: &str, entries: &[AppEntry]) -> Vec<usize> {
    if query.is_empty() {
        return Vec::new();
    }
    let query = query.to_lowercase();

    let mut exact = Vec::new();
    let mut in_name = Vec::new();
    let mut in_details = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let name = entry.name.to_lowercase();
        if name == query {
            exact.push(index);
        } else if name.contains(&query) {
            in_name.push(index);
        } else if entry.secondary_text().contains(&query) {
            in_details.push(index);
        }
    }

    exact.extend(in_name);
    exact.extend(in_details);
    exact
}

/// [`search`], truncated to `limit` results.
pub fn search_limited(query: &str, entries: &[AppEntry], limit: usize) -> Vec<usize> {
    let mut results = search(query, entries);
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(entries: &'a [AppEntry], hits: &[usize]) -> Vec<&'a str> {
        hits.iter().map(|&i| entries[i].name.as_str()).collect()
    }

    #[test]
    fn tiers_are_concatenated_in_order() {
        let entries = vec![
            AppEntry {
                description: "Surf the web, fire up tabs".into(),
                ..AppEntry::new("browser.desktop", "Browser")
            },
            AppEntry::new("fire.desktop", "Fire"),
            AppEntry::new("firefox.desktop", "Firefox"),
        ];
        let hits = search("Fire", &entries);
        assert_eq!(names(&entries, &hits), vec!["Fire", "Firefox", "Browser"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let entries = vec![AppEntry::new("gimp.desktop", "GIMP")];
        assert_eq!(search("gimp", &entries), vec![0]);
        assert_eq!(search("GiM", &entries), vec![0]);
    }

    #[test]
    fn keywords_and_generic_name_are_searched() {
        let entries = vec![
            AppEntry {
                keywords: vec!["Spreadsheet".into()],
                ..AppEntry::new("calc.desktop", "Calc")
            },
            AppEntry {
                generic_name: "Terminal Emulator".into(),
                ..AppEntry::new("kitty.desktop", "kitty")
            },
        ];
        assert_eq!(search("spread", &entries), vec![0]);
        assert_eq!(search("emulator", &entries), vec![1]);
    }

    #[test]
    fn tier_order_preserves_input_order() {
        let entries = vec![
            AppEntry::new("a.desktop", "Alpha Note"),
            AppEntry::new("b.desktop", "Beta Note"),
            AppEntry::new("c.desktop", "Note"),
        ];
        let hits = search("note", &entries);
        assert_eq!(names(&entries, &hits), vec!["Note", "Alpha Note", "Beta Note"]);
    }

    #[test]
    fn entries_appear_in_at_most_one_tier() {
        let entries = vec![AppEntry {
            description: "fire".into(),
            ..AppEntry::new("fire.desktop", "Fire")
        }];
        assert_eq!(search("fire", &entries), vec![0]);
    }

    #[test]
    fn empty_query_matches_nothing() {
        let entries = vec![AppEntry::new("a.desktop", "A")];
        assert!(search("", &entries).is_empty());
    }

    #[test]
    fn whitespace_is_part_of_the_query() {
        let entries = vec![
            AppEntry::new("gimp.desktop", "Gimp"),
            AppEntry::new("gedit.desktop", "Text Editor"),
        ];
        // The name hit ranks first; the joined detail text always holds
        // separators, so every entry matches in the last tier.
        assert_eq!(search(" ", &entries), vec![1, 0]);
        assert!(search("gimp ", &entries).is_empty());
    }

    #[test]
    fn results_are_truncated() {
        let entries: Vec<AppEntry> = (0..25)
            .map(|i| AppEntry::new(format!("tool{}.desktop", i), format!("Tool {:02}", i)))
            .collect();
        assert_eq!(search("tool", &entries).len(), 25);
        let limited = search_limited("tool", &entries, MAX_RESULTS);
        assert_eq!(limited.len(), MAX_RESULTS);
        assert_eq!(limited[0], 0);
    }
}
