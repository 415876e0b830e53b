//! **launchpop**, a small popup application launcher.
//!
//! The launcher opens on the user's favorites, can drill down into
//! categories of every installed application, and searches the whole
//! catalog as you type.  Picking an entry launches it and closes the popup;
//! losing focus closes it after a short delay.
//!
//! # Architecture
//!
//! Discovery ([`registry`], [`desktop`]) produces [`entry::AppEntry`]s,
//! which a [`catalog::Catalog`] sorts and classifies once at startup.  The
//! [`navigator::Navigator`] state machine owns the catalog, the
//! [`favorites`] store and the view stack.  It is decoupled from the
//! outside world by two traits:
//!
//! * [`traits::ListView`] abstracts the list widget and its window, so the
//!   navigation logic is not coupled to any toolkit.
//! * [`traits::Spawner`] abstracts process creation, so launching can be
//!   tested without starting anything.
//!
//! Concrete implementations live in [`frontend`] (GTK4 and terminal) and
//! [`launch`] (detached child processes).

pub mod catalog;
pub mod category;
pub mod close_timer;
pub mod config;
pub mod desktop;
pub mod entry;
pub mod favorites;
pub mod frontend;
pub mod instance;
pub mod launch;
pub mod navigator;
pub mod registry;
pub mod search;
pub mod traits;
