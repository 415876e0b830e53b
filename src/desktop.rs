//! Freedesktop `.desktop` descriptor parsing.
//!
//! Only the `[Desktop Entry]` group is read.  Anything that makes a file
//! unsuitable for the launcher (hidden, not an application, no name, …) is
//! reported as a [`DesktopParseError`] so the registry can skip it.

use crate::entry::{AppEntry, IconRef};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const MAIN_GROUP: &str = "[Desktop Entry]";

/// Why a descriptor was rejected.
#[derive(Debug, thiserror::Error)]
pub enum DesktopParseError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("no [Desktop Entry] group")]
    MissingGroup,
    #[error("not an application (Type={0})")]
    NotApplication(String),
    #[error("marked Hidden")]
    Hidden,
    #[error("marked NoDisplay")]
    NoDisplay,
    #[error("missing Name")]
    MissingName,
    #[error("TryExec target {0:?} not installed")]
    NotInstalled(String),
}

/// Locale candidates used to pick `Key[locale]` variants, most specific
/// first (`de_DE`, then `de`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locale {
    candidates: Vec<String>,
}

impl Locale {
    /// Build from a POSIX locale string such as `de_DE.UTF-8@euro`.
    pub fn parse(raw: &str) -> Self {
        let base = raw
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .trim();
        if base.is_empty() || base == "C" || base == "POSIX" {
            return Self::default();
        }
        let mut candidates = vec![base.to_string()];
        if let Some((lang, _country)) = base.split_once('_') {
            candidates.push(lang.to_string());
        }
        Self { candidates }
    }

    /// Read `LC_ALL`, `LC_MESSAGES` and `LANG`, in that order.
    pub fn from_env() -> Self {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty())
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

/// The parsed, already-validated content of one descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub name: String,
    pub generic_name: String,
    pub comment: String,
    pub icon: Option<IconRef>,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    pub exec: Option<String>,
    pub try_exec: Option<String>,
    pub working_dir: Option<PathBuf>,
}

impl Descriptor {
    /// Parse descriptor text.
    pub fn parse(content: &str, locale: &Locale) -> Result<Self, DesktopParseError> {
        let group = read_main_group(content).ok_or(DesktopParseError::MissingGroup)?;

        let kind = group.get("Type").map(String::as_str).unwrap_or_default();
        if kind != "Application" {
            return Err(DesktopParseError::NotApplication(kind.to_string()));
        }
        if is_true(group.get("Hidden")) {
            return Err(DesktopParseError::Hidden);
        }
        if is_true(group.get("NoDisplay")) {
            return Err(DesktopParseError::NoDisplay);
        }

        let localized = |key: &str| -> Option<String> {
            locale
                .candidates
                .iter()
                .find_map(|c| group.get(&format!("{}[{}]", key, c)))
                .or_else(|| group.get(key))
                .map(|v| unescape(v))
        };

        let name = localized("Name")
            .filter(|n| !n.trim().is_empty())
            .ok_or(DesktopParseError::MissingName)?;

        Ok(Self {
            name,
            generic_name: localized("GenericName").unwrap_or_default(),
            comment: localized("Comment").unwrap_or_default(),
            icon: group.get("Icon").and_then(|v| IconRef::from_raw(&unescape(v))),
            categories: split_list(group.get("Categories").map(String::as_str)),
            keywords: split_list(localized("Keywords").as_deref()),
            exec: non_empty(group.get("Exec")),
            try_exec: non_empty(group.get("TryExec")),
            working_dir: non_empty(group.get("Path")).map(PathBuf::from),
        })
    }

    /// Whether the `TryExec` target (if any) exists.
    pub fn is_installed(&self) -> bool {
        self.try_exec.as_deref().map_or(true, program_exists)
    }

    /// Turn the descriptor into a registry entry.
    pub fn into_entry(self, id: String, path: PathBuf, priority: u8) -> AppEntry {
        AppEntry {
            id,
            name: self.name,
            description: self.comment,
            generic_name: self.generic_name,
            keywords: self.keywords,
            categories: self.categories,
            icon: self.icon,
            path,
            exec: self.exec,
            working_dir: self.working_dir,
            priority,
        }
    }
}

/// Read, parse and validate the descriptor at `path`.
///
/// The entry id is the file name.
pub fn load_entry(path: &Path, priority: u8, locale: &Locale) -> Result<AppEntry, DesktopParseError> {
    let content = std::fs::read_to_string(path)?;
    let descriptor = Descriptor::parse(&content, locale)?;
    if !descriptor.is_installed() {
        return Err(DesktopParseError::NotInstalled(
            descriptor.try_exec.unwrap_or_default(),
        ));
    }
    let id = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(descriptor.into_entry(id, path.to_path_buf(), priority))
}

//  Helpers

/// Collect the key/value pairs of the `[Desktop Entry]` group.  The first
/// occurrence of a key wins.
fn read_main_group(content: &str) -> Option<HashMap<String, String>> {
    let mut in_main = false;
    let mut seen_main = false;
    let mut group = HashMap::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed.starts_with('[') {
            in_main = trimmed == MAIN_GROUP;
            seen_main |= in_main;
            continue;
        }
        if !in_main {
            continue;
        }
        if let Some((key, value)) = trimmed.split_once('=') {
            group
                .entry(key.trim().to_string())
                .or_insert_with(|| value.trim().to_string());
        }
    }

    seen_main.then_some(group)
}

fn is_true(value: Option<&String>) -> bool {
    value.is_some_and(|v| v.trim() == "true")
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|v| unescape(v)).filter(|v| !v.trim().is_empty())
}

/// Split a `;`-separated list, dropping empty items.
fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Decode `\s`, `\n`, `\t`, `\r` and `\\`.  Unknown escapes are kept as-is.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Absolute paths are checked directly; bare names are searched on `PATH`.
fn program_exists(program: &str) -> bool {
    let program = program.trim();
    if program.contains('/') {
        return Path::new(program).is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
