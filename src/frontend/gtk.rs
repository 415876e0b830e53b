//! GTK4 popup that runs on the **main thread**.
//!
//! # Widget tree
//!
//! ```text
//! window                        (layer-shell when available, undecorated)
//! └ .launcher                   (vertical box)
//!     ├ GtkScrolledWindow
//!     │   └ GtkListBox
//!     │       ├ .category-row
//!     │       └ .app-row[.draggable]
//!     │           └ icon, label, .star button
//!     ├ .menu-separator
//!     ├ .nav-button             ("All Applications" / "Back")
//!     ├ .menu-separator
//!     └ GtkSearchEntry
//! ```
//!
//! Widget signals only push [`Event`]s into a channel.  A 16 ms GLib
//! timeout drains the channel into the [`Navigator`], advances its close
//! timer and quits the main loop once the navigator has closed.

use crate::catalog::Catalog;
use crate::config::WindowConfig;
use crate::entry::IconRef;
use crate::favorites::Favorites;
use crate::launch::SystemSpawner;
use crate::navigator::{Event, Navigator, NavigatorOptions};
use crate::traits::{ListView, NavControl, RowModel};
use gtk4::prelude::*;
use gtk4::{gdk, glib, pango};
use gtk4_layer_shell::LayerShell;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

const ICON_SIZE: i32 = 24;
const FALLBACK_ICON: &str = "application-x-executable";

//  Default CSS

const DEFAULT_CSS: &str = r#"
.launcher label {
    color: white;
    text-shadow:
        0px 1px 2px rgba(0, 0, 0, 0.9),
        0px 1px 4px rgba(0, 0, 0, 0.6);
}

.launcher scrollbar {
    opacity: 0;
}

.menu-separator {
    background: rgba(255, 255, 255, 0.2);
    min-height: 1px;
    margin: 2px 0;
}

.launcher-row {
    margin: 3px 5px;
}

.category-row .launcher-row {
    min-height: 28px;
}

.app-row.draggable {
    cursor: grab;
}

.star {
    padding: 0 4px;
    min-height: 0;
}

.nav-button {
    border-radius: 0;
}
"#;

fn send(tx: &mpsc::Sender<Event>, event: Event) {
    if tx.send(event).is_err() {
        debug!("event loop gone, dropping event");
    }
}

/// Index of `row` in its list, if it is still in one.
fn row_index(row: &gtk4::ListBoxRow) -> Option<usize> {
    usize::try_from(row.index()).ok()
}

//  ListView over a GtkListBox

struct GtkListView {
    window: gtk4::Window,
    listbox: gtk4::ListBox,
    entry: gtk4::SearchEntry,
    nav_icon: gtk4::Image,
    nav_label: gtk4::Label,
    nav_arrow: gtk4::Image,
    tx: mpsc::Sender<Event>,
}

impl GtkListView {
    fn build_row(&self, model: &RowModel) -> gtk4::ListBoxRow {
        let row = gtk4::ListBoxRow::new();
        let hbox = gtk4::Box::new(gtk4::Orientation::Horizontal, 10);
        hbox.add_css_class("launcher-row");

        match model {
            RowModel::Category {
                label,
                icon_name,
                count,
            } => {
                row.add_css_class("category-row");
                let icon = gtk4::Image::from_icon_name(icon_name);
                icon.set_pixel_size(ICON_SIZE);
                hbox.append(&icon);
                hbox.append(&row_label(label));
                let count = gtk4::Label::new(Some(&count.to_string()));
                count.add_css_class("dim-label");
                hbox.append(&count);
                hbox.append(&gtk4::Image::from_icon_name("pan-end-symbolic"));
            }
            RowModel::App {
                label,
                tooltip,
                icon,
                favorite,
                draggable,
            } => {
                row.add_css_class("app-row");
                if *draggable {
                    row.add_css_class("draggable");
                }
                row.set_tooltip_text(Some(tooltip));
                hbox.append(&app_icon(icon.as_ref()));
                hbox.append(&row_label(label));
                hbox.append(&self.star_button(&row, *favorite));
            }
        }

        row.set_child(Some(&hbox));
        row
    }

    /// The row's position is read at click time, so the button keeps
    /// working after the row is dragged elsewhere.
    fn star_button(&self, row: &gtk4::ListBoxRow, favorite: bool) -> gtk4::Button {
        let (icon, tooltip) = if favorite {
            ("starred", "Remove from favorites")
        } else {
            ("non-starred", "Add to favorites")
        };
        let star = gtk4::Button::from_icon_name(icon);
        star.add_css_class("flat");
        star.add_css_class("star");
        star.set_tooltip_text(Some(tooltip));
        star.set_focus_on_click(false);

        let tx = self.tx.clone();
        let weak_row = row.downgrade();
        star.connect_clicked(move |_| {
            if let Some(index) = weak_row.upgrade().as_ref().and_then(row_index) {
                send(&tx, Event::ToggleFavorite(index));
            }
        });
        star
    }
}

impl ListView for GtkListView {
    fn set_rows(&mut self, rows: &[RowModel]) {
        while let Some(child) = self.listbox.first_child() {
            self.listbox.remove(&child);
        }
        for model in rows {
            let row = self.build_row(model);
            self.listbox.append(&row);
        }
    }

    fn select(&mut self, index: Option<usize>) {
        match index.and_then(|i| self.listbox.row_at_index(i as i32)) {
            Some(row) => self.listbox.select_row(Some(&row)),
            None => self.listbox.unselect_all(),
        }
    }

    fn move_row(&mut self, from: usize, to: usize) {
        if let Some(row) = self.listbox.row_at_index(from as i32) {
            self.listbox.remove(&row);
            self.listbox.insert(&row, to as i32);
        }
    }

    fn set_nav_control(&mut self, control: NavControl) {
        self.nav_icon.set_icon_name(Some(control.icon_name()));
        self.nav_label.set_text(control.label());
        self.nav_arrow.set_visible(control.is_forward());
    }

    fn clear_query(&mut self) {
        self.entry.set_text("");
    }

    fn close(&mut self) {
        self.window.set_visible(false);
    }
}

fn row_label(text: &str) -> gtk4::Label {
    let label = gtk4::Label::new(Some(text));
    label.set_xalign(0.0);
    label.set_hexpand(true);
    label.set_ellipsize(pango::EllipsizeMode::End);
    label
}

fn app_icon(icon: Option<&IconRef>) -> gtk4::Image {
    let image = match icon {
        Some(IconRef::File(path)) if path.is_file() => gtk4::Image::from_file(path),
        Some(IconRef::Themed(name)) if theme_has_icon(name) => gtk4::Image::from_icon_name(name),
        _ => gtk4::Image::from_icon_name(FALLBACK_ICON),
    };
    image.set_pixel_size(ICON_SIZE);
    image
}

fn theme_has_icon(name: &str) -> bool {
    gdk::Display::default()
        .map(|display| gtk4::IconTheme::for_display(&display).has_icon(name))
        .unwrap_or(false)
}

//  Public API

/// Build the popup and run the GLib main loop on the **current** (main)
/// thread until the navigator closes or a termination signal arrives.
pub fn run_main_loop(
    catalog: Catalog,
    favorites: Favorites,
    options: NavigatorOptions,
    window_config: &WindowConfig,
    css_path: Option<PathBuf>,
) {
    gtk4::init().expect("failed to initialise GTK4");
    info!("GTK4 initialised on main thread");

    load_css(css_path.as_deref());

    //  Window
    let window = gtk4::Window::new();
    if window_config.layer_shell && gtk4_layer_shell::is_supported() {
        window.init_layer_shell();
        window.set_layer(gtk4_layer_shell::Layer::Top);
        window.set_namespace("launchpop");
        window.set_keyboard_mode(gtk4_layer_shell::KeyboardMode::OnDemand);
        info!("using layer shell");
    } else {
        window.set_title(Some("Applications"));
    }
    window.set_decorated(false);
    window.set_default_size(window_config.width, window_config.height);

    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    container.add_css_class("launcher");
    window.set_child(Some(&container));

    let listbox = gtk4::ListBox::new();
    listbox.set_selection_mode(gtk4::SelectionMode::Single);
    let scrolled = gtk4::ScrolledWindow::new();
    scrolled.set_policy(gtk4::PolicyType::Never, gtk4::PolicyType::Automatic);
    scrolled.set_vexpand(true);
    scrolled.set_child(Some(&listbox));
    container.append(&scrolled);

    container.append(&separator());

    let nav_icon = gtk4::Image::new();
    nav_icon.set_pixel_size(ICON_SIZE);
    let nav_label = row_label("");
    let nav_arrow = gtk4::Image::from_icon_name("pan-end-symbolic");
    let nav_box = gtk4::Box::new(gtk4::Orientation::Horizontal, 10);
    nav_box.add_css_class("launcher-row");
    nav_box.append(&nav_icon);
    nav_box.append(&nav_label);
    nav_box.append(&nav_arrow);
    let nav_button = gtk4::Button::new();
    nav_button.add_css_class("flat");
    nav_button.add_css_class("nav-button");
    nav_button.set_child(Some(&nav_box));
    container.append(&nav_button);

    container.append(&separator());

    let entry = gtk4::SearchEntry::new();
    entry.set_margin_start(5);
    entry.set_margin_end(5);
    entry.set_margin_top(5);
    entry.set_margin_bottom(5);
    entry.set_key_capture_widget(Some(&window));
    container.append(&entry);

    //  Signals
    let (tx, rx) = mpsc::channel::<Event>();
    connect_signals(&window, &listbox, &entry, &nav_button, &tx);

    //  Navigator
    let view = GtkListView {
        window: window.clone(),
        listbox,
        entry: entry.clone(),
        nav_icon,
        nav_label,
        nav_arrow,
        tx,
    };
    let mut navigator = Navigator::new(catalog, favorites, view, SystemSpawner, options);
    info!(
        "{} applications, {} favorites",
        navigator.catalog().len(),
        navigator.favorites().ids().len()
    );

    window.present();
    entry.grab_focus();

    let main_loop = glib::MainLoop::new(None, false);

    for signum in [libc::SIGTERM, libc::SIGINT] {
        let main_loop = main_loop.clone();
        glib::unix_signal_add_local(signum, move || {
            info!("received signal {}, quitting", signum);
            main_loop.quit();
            glib::ControlFlow::Break
        });
    }

    {
        let main_loop = main_loop.clone();
        window.connect_close_request(move |_| {
            main_loop.quit();
            glib::Propagation::Proceed
        });
    }

    //  Main event loop (~60 fps)
    {
        let main_loop = main_loop.clone();
        glib::timeout_add_local(Duration::from_millis(16), move || {
            while let Ok(event) = rx.try_recv() {
                debug!("event: {:?}", event);
                if let Err(e) = navigator.handle(event) {
                    error!("{}", e);
                }
            }
            navigator.tick(Instant::now());

            if navigator.is_closed() {
                info!("launcher closed");
                main_loop.quit();
                return glib::ControlFlow::Break;
            }
            glib::ControlFlow::Continue
        });
    }

    info!("entering GLib main loop");
    main_loop.run();
    info!("GLib main loop exited");
}

fn separator() -> gtk4::Separator {
    let separator = gtk4::Separator::new(gtk4::Orientation::Horizontal);
    separator.add_css_class("menu-separator");
    separator
}

fn connect_signals(
    window: &gtk4::Window,
    listbox: &gtk4::ListBox,
    entry: &gtk4::SearchEntry,
    nav_button: &gtk4::Button,
    tx: &mpsc::Sender<Event>,
) {
    let tx_query = tx.clone();
    entry.connect_search_changed(move |entry| {
        send(&tx_query, Event::QueryChanged(entry.text().to_string()));
    });

    let tx_enter = tx.clone();
    entry.connect_activate(move |_| send(&tx_enter, Event::ActivateQuery));

    let tx_nav = tx.clone();
    nav_button.connect_clicked(move |_| send(&tx_nav, Event::ActivateNavControl));

    let tx_activate = tx.clone();
    listbox.connect_row_activated(move |_, row| {
        if let Some(index) = row_index(row) {
            send(&tx_activate, Event::ActivateRow(index));
        }
    });

    let tx_select = tx.clone();
    listbox.connect_row_selected(move |_, row| {
        send(&tx_select, Event::RowSelected(row.and_then(row_index)));
    });

    // Hovering selects, so Enter in the search box acts on what the
    // pointer is over.
    let hover = gtk4::EventControllerMotion::new();
    let weak_list = listbox.downgrade();
    hover.connect_motion(move |_, _x, y| {
        let Some(listbox) = weak_list.upgrade() else {
            return;
        };
        if let Some(row) = listbox.row_at_y(y as i32) {
            if !row.is_selected() {
                listbox.select_row(Some(&row));
            }
        }
    });
    listbox.add_controller(hover);

    //  Drag reordering
    let drag = gtk4::GestureDrag::new();
    {
        let tx = tx.clone();
        let weak_list = listbox.downgrade();
        drag.connect_drag_begin(move |_, _x, y| {
            let index = weak_list
                .upgrade()
                .and_then(|l| l.row_at_y(y as i32))
                .as_ref()
                .and_then(row_index);
            if let Some(index) = index {
                send(&tx, Event::DragBegin(index));
            }
        });
    }
    {
        let tx = tx.clone();
        let weak_list = listbox.downgrade();
        drag.connect_drag_update(move |gesture, _dx, dy| {
            let Some((_, start_y)) = gesture.start_point() else {
                return;
            };
            let index = weak_list
                .upgrade()
                .and_then(|l| l.row_at_y((start_y + dy) as i32))
                .as_ref()
                .and_then(row_index);
            if let Some(index) = index {
                send(&tx, Event::DragMotion(index));
            }
        });
    }
    {
        let tx = tx.clone();
        drag.connect_drag_end(move |_, _, _| send(&tx, Event::DragEnd));
    }
    listbox.add_controller(drag);

    //  Keyboard
    let keys = gtk4::EventControllerKey::new();
    keys.set_propagation_phase(gtk4::PropagationPhase::Capture);
    {
        let tx = tx.clone();
        let weak_list = listbox.downgrade();
        keys.connect_key_pressed(move |_, key, _, _| match key {
            gdk::Key::Escape => {
                send(&tx, Event::Escape);
                glib::Propagation::Stop
            }
            gdk::Key::Up | gdk::Key::Down => {
                let Some(listbox) = weak_list.upgrade() else {
                    return glib::Propagation::Proceed;
                };
                if listbox.focus_child().is_some() {
                    return glib::Propagation::Proceed;
                }
                // Move focus from the search box into the list.
                if let Some(row) = listbox.selected_row().or_else(|| listbox.row_at_index(0)) {
                    row.grab_focus();
                }
                glib::Propagation::Stop
            }
            _ => glib::Propagation::Proceed,
        });
    }
    window.add_controller(keys);

    //  Focus
    let tx_focus = tx.clone();
    window.connect_is_active_notify(move |window| {
        let event = if window.is_active() {
            Event::FocusIn
        } else {
            Event::FocusOut
        };
        send(&tx_focus, event);
    });
}

//  CSS loading

/// Install the user stylesheet, or [`DEFAULT_CSS`] when there is none.
fn load_css(css_path: Option<&Path>) {
    let user_css = css_path
        .filter(|p| p.is_file())
        .and_then(|p| match std::fs::read_to_string(p) {
            Ok(css) => {
                info!("stylesheet {}", p.display());
                Some(css)
            }
            Err(e) => {
                warn!("cannot read stylesheet {}: {}", p.display(), e);
                None
            }
        });

    let provider = gtk4::CssProvider::new();
    #[allow(deprecated)]
    provider.load_from_data(user_css.as_deref().unwrap_or(DEFAULT_CSS));

    let Some(display) = gdk::Display::default() else {
        warn!("no display to style");
        return;
    };
    gtk4::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
