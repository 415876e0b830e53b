//! Persistent, ordered favorites.
//!
//! The file is a pretty-printed JSON array of entry ids:
//!
//! ```json
//! [
//!   "org.mozilla.firefox.desktop",
//!   "org.gnome.Terminal.desktop"
//! ]
//! ```
//!
//! Reading never fails: a missing or corrupt file is an empty list.
//! Writes go to a sibling temp file that is then renamed over the target.

use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Errors from writing the favorites file.
#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read the persisted list.  Missing file, unreadable file, or anything
/// other than a JSON array of strings yields an empty list.
pub fn load(path: &Path) -> Vec<String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            debug!("no favorites at {} ({})", path.display(), e);
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<String>>(&contents) {
        Ok(ids) => ids,
        Err(e) => {
            warn!("ignoring corrupt favorites file {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Persist the full list, creating parent directories as needed.
pub fn save(path: &Path, ids: &[String]) -> Result<(), FavoritesError> {
    let io_err = |source| FavoritesError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_string_pretty(ids)?;
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    std::fs::write(&tmp, json).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

/// The in-memory favorites list bound to its file.
///
/// Every mutation writes the whole list back.  The in-memory state is
/// updated even when the write fails, so the UI stays consistent with
/// what the user just did.
#[derive(Debug, Clone)]
pub struct Favorites {
    path: PathBuf,
    ids: Vec<String>,
}

impl Favorites {
    /// Load from `path` (never fails, see [`load`]).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let ids = load(&path);
        Self { path, ids }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ids in display order, including ones no longer installed.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Ids compare case-insensitively, like registry keys.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|f| same_id(f, id))
    }

    /// Remove `id` if present, otherwise append it.  Returns whether `id`
    /// is a favorite afterwards.
    pub fn toggle(&mut self, id: &str) -> Result<bool, FavoritesError> {
        let now_favorite = match self.ids.iter().position(|f| same_id(f, id)) {
            Some(pos) => {
                self.ids.remove(pos);
                false
            }
            None => {
                self.ids.push(id.to_string());
                true
            }
        };
        self.save()?;
        Ok(now_favorite)
    }

    /// Replace the whole list (after a drag reorder).
    pub fn replace(&mut self, ids: Vec<String>) -> Result<(), FavoritesError> {
        self.ids = ids;
        self.save()
    }

    pub fn save(&self) -> Result<(), FavoritesError> {
        save(&self.path, &self.ids)
    }
}

fn same_id(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
