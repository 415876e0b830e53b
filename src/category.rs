//! Display categories and the rule table that assigns them.

use crate::entry::AppEntry;
use std::collections::BTreeMap;
use std::fmt;

/// A display category.
///
/// Variants are declared in alphabetical order of their display names, so
/// the derived `Ord` (and therefore `BTreeMap` iteration) matches the
/// order the categories view lists them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Accessories,
    Development,
    Education,
    Games,
    Graphics,
    Internet,
    Multimedia,
    Office,
    Other,
    Science,
    Settings,
    SystemTools,
}

/// Raw taxonomy tag → display category.  An entry's tags are tried in
/// their own order against this table; the first hit wins.
const RULES: &[(&str, Category)] = &[
    ("AudioVideo", Category::Multimedia),
    ("Audio", Category::Multimedia),
    ("Video", Category::Multimedia),
    ("Development", Category::Development),
    ("Education", Category::Education),
    ("Game", Category::Games),
    ("Graphics", Category::Graphics),
    ("Network", Category::Internet),
    ("Office", Category::Office),
    ("Science", Category::Science),
    ("Settings", Category::Settings),
    ("System", Category::SystemTools),
    ("Utility", Category::Accessories),
];

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::Accessories => "Accessories",
            Category::Development => "Development",
            Category::Education => "Education",
            Category::Games => "Games",
            Category::Graphics => "Graphics",
            Category::Internet => "Internet",
            Category::Multimedia => "Multimedia",
            Category::Office => "Office",
            Category::Other => "Other",
            Category::Science => "Science",
            Category::Settings => "Settings",
            Category::SystemTools => "System Tools",
        }
    }

    /// Themed icon name for the category row.
    pub fn icon_name(self) -> &'static str {
        match self {
            Category::Accessories => "applications-accessories",
            Category::Development => "applications-development",
            Category::Education | Category::Science => "applications-science",
            Category::Games => "applications-games",
            Category::Graphics => "applications-graphics",
            Category::Internet => "applications-internet",
            Category::Multimedia => "applications-multimedia",
            Category::Office => "applications-office",
            Category::Other => "applications-other",
            Category::Settings => "preferences-system",
            Category::SystemTools => "applications-system",
        }
    }

    /// Look up a single raw tag in the rule table.
    pub fn from_tag(tag: &str) -> Option<Self> {
        RULES
            .iter()
            .find(|(raw, _)| *raw == tag)
            .map(|(_, category)| *category)
    }

    /// The category for an entry: first raw tag with a rule, else `Other`.
    pub fn of(entry: &AppEntry) -> Self {
        entry
            .categories
            .iter()
            .find_map(|tag| Self::from_tag(tag.trim()))
            .unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Group entries by category.
///
/// Values are indices into `entries`, in the slice's order, so a
/// name-sorted slice gives name-sorted members.  Categories with no
/// members are absent.
pub fn classify(entries: &[AppEntry]) -> BTreeMap<Category, Vec<usize>> {
    let mut map: BTreeMap<Category, Vec<usize>> = BTreeMap::new();
    for (index, entry) in entries.iter().enumerate() {
        map.entry(Category::of(entry)).or_default().push(index);
    }
    map
}
