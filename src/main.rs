//! Entry point for the **launchpop** popup.
//!
//! Takes the single-instance lock (a second invocation closes the running
//! popup instead), scans the application directories and hands the
//! catalog to a frontend.
//!
//! When the `frontend-gtk` feature is enabled the main thread runs the
//! GLib main loop.  Without the feature, or with `--terminal`, a
//! line-oriented frontend reads commands from standard input.

use launchpop::catalog::Catalog;
use launchpop::config::{config_dir, Config};
use launchpop::desktop::Locale;
use launchpop::favorites::Favorites;
use launchpop::frontend::terminal::{self, TerminalView};
use launchpop::instance::{self, Acquired};
use launchpop::launch::SystemSpawner;
use launchpop::navigator::Navigator;
use launchpop::registry;
use log::{debug, error, info, warn};

/// `$XDG_CONFIG_HOME/launchpop/config.json`, or the built-in defaults when
/// it is missing or invalid.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    if !path.exists() {
        debug!("{} not found, using defaults", path.display());
        return Config::default();
    }
    Config::load(&path).unwrap_or_else(|e| {
        warn!("ignoring {}: {}", path.display(), e);
        Config::default()
    })
}

/// Resolve the CSS stylesheet path.
#[cfg(feature = "frontend-gtk")]
fn css_path() -> std::path::PathBuf {
    config_dir().join("style.css")
}

fn load_catalog(config: &Config) -> Catalog {
    let entries = registry::load_from(&config.sources(), &Locale::from_env());
    Catalog::new(entries)
}

//  Main

fn main() {
    env_logger::init();

    let mut list = false;
    let mut force_terminal = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--list" => list = true,
            "--terminal" => force_terminal = true,
            other => warn!("ignoring unknown argument {:?}", other),
        }
    }

    let config = load_config();

    if list {
        for entry in load_catalog(&config).entries() {
            println!("{}", terminal::list_line(entry));
        }
        return;
    }

    let lock = match instance::acquire(&config.lock_file) {
        Ok(Acquired::Locked(lock)) => Some(lock),
        Ok(Acquired::ReplacedExisting(pid)) => {
            info!("closed the running launcher (pid {})", pid);
            return;
        }
        Err(e) => {
            warn!("running without single-instance lock: {}", e);
            None
        }
    };

    let catalog = load_catalog(&config);
    let favorites = Favorites::open(&config.favorites_file);
    info!(
        "{} applications, favorites at {}",
        catalog.len(),
        favorites.path().display()
    );

    run_frontend(catalog, favorites, &config, force_terminal);

    drop(lock);
}

//  Frontends

#[cfg(feature = "frontend-gtk")]
fn run_frontend(catalog: Catalog, favorites: Favorites, config: &Config, force_terminal: bool) {
    if force_terminal {
        run_terminal(catalog, favorites, config);
        return;
    }
    launchpop::frontend::gtk::run_main_loop(
        catalog,
        favorites,
        config.navigator_options(),
        &config.window,
        Some(css_path()),
    );
}

#[cfg(not(feature = "frontend-gtk"))]
fn run_frontend(catalog: Catalog, favorites: Favorites, config: &Config, _force_terminal: bool) {
    run_terminal(catalog, favorites, config);
}

fn run_terminal(catalog: Catalog, favorites: Favorites, config: &Config) {
    let view = TerminalView::new(std::io::stdout());
    let mut navigator = Navigator::new(
        catalog,
        favorites,
        view,
        SystemSpawner,
        config.navigator_options(),
    );
    if let Err(e) = terminal::run(&mut navigator, std::io::stdin().lock()) {
        error!("terminal frontend: {}", e);
    }
}
