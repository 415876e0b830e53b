//! Frontends that drive a [`Navigator`](crate::navigator::Navigator).
//!
//! With the `frontend-gtk` feature, [`gtk::run_main_loop`] takes over the
//! main thread and runs the popup window through the GLib main loop.  The
//! [`terminal`] frontend is always available and reads commands from
//! standard input.

#[cfg(feature = "frontend-gtk")]
pub mod gtk;
pub mod terminal;
