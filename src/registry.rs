//! Application discovery.
//!
//! The registry scans a priority-ordered list of directories for `.desktop`
//! files, keeps one entry per (case-insensitive) id, and returns the
//! survivors sorted by display name.
//!
//! A directory that does not exist or cannot be read simply contributes no
//! entries; a file that fails to parse is skipped.

use crate::desktop::{self, Locale};
use crate::entry::AppEntry;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A directory to scan and the priority of the entries it yields.
///
/// Higher priority wins when two locations define the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub path: PathBuf,
    pub priority: u8,
}

impl SourceLocation {
    pub fn new(path: impl Into<PathBuf>, priority: u8) -> Self {
        Self {
            path: path.into(),
            priority,
        }
    }
}

/// The built-in scan list, highest priority first:
///
/// 1. `$XDG_DATA_HOME/applications` (default `~/.local/share/applications`)
/// 2. `~/.local/share/flatpak/exports/share/applications`
/// 3. `/usr/share/applications`
/// 4. `/var/lib/flatpak/exports/share/applications`
pub fn default_sources() -> Vec<SourceLocation> {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    let data_home = std::env::var("XDG_DATA_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| format!("{}/.local/share", home));

    vec![
        SourceLocation::new(format!("{}/applications", data_home), 4),
        SourceLocation::new(
            format!("{}/.local/share/flatpak/exports/share/applications", home),
            3,
        ),
        SourceLocation::new("/usr/share/applications", 2),
        SourceLocation::new("/var/lib/flatpak/exports/share/applications", 1),
    ]
}

/// Scan the default locations.
pub fn load() -> Vec<AppEntry> {
    load_from(&default_sources(), &Locale::from_env())
}

/// Scan `sources` in the given order.
///
/// Deduplication: a later entry replaces an earlier one with the same key
/// when its priority is greater than or equal to the earlier one's.  With a
/// stable scan order (sources as given, files sorted by name) the result
/// is deterministic.
pub fn load_from(sources: &[SourceLocation], locale: &Locale) -> Vec<AppEntry> {
    let mut by_key: HashMap<String, AppEntry> = HashMap::new();

    for source in sources {
        for path in descriptor_files(&source.path) {
            match desktop::load_entry(&path, source.priority, locale) {
                Ok(entry) => {
                    let key = entry.key();
                    let replace = by_key
                        .get(&key)
                        .map_or(true, |existing| existing.priority <= entry.priority);
                    if replace {
                        by_key.insert(key, entry);
                    } else {
                        debug!("{}: shadowed by higher-priority entry", path.display());
                    }
                }
                Err(e) => debug!("skipping {}: {}", path.display(), e),
            }
        }
    }

    let mut entries: Vec<AppEntry> = by_key.into_values().collect();
    sort_by_name(&mut entries);
    info!(
        "discovered {} application(s) in {} location(s)",
        entries.len(),
        sources.len()
    );
    entries
}

/// Canonical ordering: case-insensitive display name, then id so equal
/// names still sort deterministically.
pub fn sort_by_name(entries: &mut [AppEntry]) {
    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.key().cmp(&b.key()))
    });
}

/// `*.desktop` files directly inside `dir`, sorted by file name.
fn descriptor_files(dir: &Path) -> Vec<PathBuf> {
    let read = match std::fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) => {
            debug!("cannot read {}: {}", dir.display(), e);
            return Vec::new();
        }
    };
    let mut files: Vec<PathBuf> = read
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "desktop"))
        .collect();
    files.sort();
    files
}
