//! Core traits that decouple the launcher from any specific widget toolkit
//! or process-spawning mechanism.
//!
//! The [`Navigator`](crate::navigator::Navigator) only depends on these
//! abstractions.  The GTK frontend, the terminal frontend and the test
//! harnesses each provide their own implementations.

use crate::entry::{AppEntry, IconRef};

/// What one row of the list shows.
///
/// Rows carry display data only; the navigator keeps the matching domain
/// record and resolves activations by row index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowModel {
    /// A category that opens its member list.
    Category {
        label: String,
        icon_name: &'static str,
        count: usize,
    },
    /// A launchable application.
    App {
        label: String,
        tooltip: String,
        icon: Option<IconRef>,
        favorite: bool,
        /// Whether the row takes part in drag reordering.
        draggable: bool,
    },
}

impl RowModel {
    /// Row for an application entry.
    pub fn app(entry: &AppEntry, favorite: bool, draggable: bool) -> Self {
        RowModel::App {
            label: entry.name.clone(),
            tooltip: entry.tooltip(),
            icon: entry.icon.clone(),
            favorite,
            draggable,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RowModel::Category { label, .. } | RowModel::App { label, .. } => label,
        }
    }
}

/// The single control shown beneath the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavControl {
    /// "All Applications", moves forward into the categories view.
    AllApplications,
    /// "Back", returns to the enclosing view.
    Back,
}

impl NavControl {
    pub fn label(self) -> &'static str {
        match self {
            NavControl::AllApplications => "All Applications",
            NavControl::Back => "Back",
        }
    }

    pub fn icon_name(self) -> &'static str {
        match self {
            NavControl::AllApplications => "folder",
            NavControl::Back => "go-previous",
        }
    }

    /// Forward controls get a trailing arrow.
    pub fn is_forward(self) -> bool {
        matches!(self, NavControl::AllApplications)
    }
}

/// Abstraction over the list widget and the window that hosts it.
///
/// All calls happen on the event-loop thread.
pub trait ListView {
    /// Replace every row.
    fn set_rows(&mut self, rows: &[RowModel]);

    /// Select the row at `index`, or clear the selection.
    fn select(&mut self, index: Option<usize>);

    /// Move the row at `from` so that it ends up at `to`.
    fn move_row(&mut self, from: usize, to: usize);

    /// Show `control` beneath the list.
    fn set_nav_control(&mut self, control: NavControl);

    /// Empty the search box.
    fn clear_query(&mut self);

    /// Close the window.  Terminal: no further calls will be made.
    fn close(&mut self);
}

/// Abstraction over starting external processes.
///
/// Implementations must not wait for the child: the launcher exits right
/// after a successful launch.
pub trait Spawner {
    /// The error type produced by this spawner.
    type Error: std::error::Error + 'static;

    /// Start `entry` through its own launch handle, with no arguments.
    fn spawn_entry(&self, entry: &AppEntry) -> Result<(), Self::Error>;

    /// Start `argv[0]` with the remaining arguments, detached.
    fn spawn(&self, argv: &[String]) -> Result<(), Self::Error>;
}
