//! The application record shared by every other module.
//!
//! An [`AppEntry`] is built once by the [`registry`](crate::registry) and
//! never mutated afterwards.

use std::path::PathBuf;

/// Opaque icon reference handed to the frontend.
///
/// The core never looks inside; the toolkit decides how to rasterize it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconRef {
    /// A name to look up in the current icon theme.
    Themed(String),
    /// An absolute path to an image file.
    File(PathBuf),
}

impl IconRef {
    /// Interpret a raw `Icon=` value.  Empty values yield `None`.
    pub fn from_raw(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else if raw.starts_with('/') {
            Some(IconRef::File(PathBuf::from(raw)))
        } else {
            Some(IconRef::Themed(raw.to_string()))
        }
    }
}

/// One discovered, launchable application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    /// Source identifier, the descriptor's file name (`firefox.desktop`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// `Comment=`; empty when absent.
    pub description: String,
    /// `GenericName=`; empty when absent.
    pub generic_name: String,
    pub keywords: Vec<String>,
    /// Raw taxonomy tags in their original order.
    pub categories: Vec<String>,
    pub icon: Option<IconRef>,
    /// Path of the descriptor file this entry came from.
    pub path: PathBuf,
    /// `Exec=` line, field codes still present.
    pub exec: Option<String>,
    /// `Path=`: working directory for the launched process.
    pub working_dir: Option<PathBuf>,
    /// Priority of the source location that produced this entry.
    pub priority: u8,
}

impl AppEntry {
    /// A minimal entry, used by tests and by callers that fill in the rest
    /// with struct-update syntax.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            generic_name: String::new(),
            keywords: Vec::new(),
            categories: Vec::new(),
            icon: None,
            path: PathBuf::new(),
            exec: None,
            working_dir: None,
            priority: 0,
        }
    }

    /// Case-insensitive deduplication key.
    pub fn key(&self) -> String {
        self.id.to_lowercase()
    }

    /// Lower-cased description, keywords and generic name joined by spaces.
    ///
    /// This is the haystack for the third search tier.
    pub fn secondary_text(&self) -> String {
        [
            self.description.to_lowercase(),
            self.keywords.join(" ").to_lowercase(),
            self.generic_name.to_lowercase(),
        ]
        .join(" ")
    }

    /// Tooltip shown by frontends: name, plus description when present.
    pub fn tooltip(&self) -> String {
        if self.description.is_empty() {
            self.name.clone()
        } else {
            format!("{}\n{}", self.name, self.description)
        }
    }
}
