//! The launcher's state machine.
//!
//! [`Navigator`] owns the catalog, the favorites store and the view stack,
//! and turns frontend [`Event`]s into [`ListView`] updates and launches.
//!
//! Views form a stack whose depth is 1 (favorites), 2 (categories) or 3
//! (one category's members).  A non-empty search query overlays whatever
//! is on top of the stack without changing it; clearing the query
//! re-renders the top frame.

use crate::catalog::{Catalog, ALL_APPLICATIONS, ALL_APPLICATIONS_ICON};
use crate::close_timer::{CloseTimer, DEFAULT_CLOSE_DELAY};
use crate::favorites::{Favorites, FavoritesError};
use crate::launch::{self, LaunchError, LaunchOptions};
use crate::search::{self, MAX_RESULTS};
use crate::traits::{ListView, NavControl, RowModel, Spawner};
use log::{debug, info};
use std::time::{Duration, Instant};

/// Errors surfaced by [`Navigator::handle`].
///
/// None of them close the window; the event loop logs them and carries on.
#[derive(Debug, thiserror::Error)]
pub enum NavigatorError {
    #[error("favorites: {0}")]
    Favorites(#[from] FavoritesError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// Input from a frontend.  Row indices refer to the rows most recently
/// passed to [`ListView::set_rows`] (after any [`ListView::move_row`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The search text changed.
    QueryChanged(String),
    /// A row was clicked or activated with the keyboard.
    ActivateRow(usize),
    /// The control beneath the list was clicked.
    ActivateNavControl,
    /// Enter was pressed in the search box.
    ActivateQuery,
    /// Escape was pressed.
    Escape,
    /// The selection moved (keyboard or hover).
    RowSelected(Option<usize>),
    /// The star on a row was clicked.
    ToggleFavorite(usize),
    /// Pointer pressed on a row.
    DragBegin(usize),
    /// Pointer moved over a row while pressed.
    DragMotion(usize),
    /// Pointer released.
    DragEnd,
    FocusOut,
    FocusIn,
}

/// One frame of the view stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Favorites,
    Categories,
    CategoryContents { name: String, members: Vec<usize> },
}

/// A rendered row, resolved back to the catalog on activation.
#[derive(Debug, Clone)]
enum Row {
    Category {
        name: String,
        icon_name: &'static str,
        members: Vec<usize>,
    },
    App(usize),
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    row: usize,
    moved: bool,
}

/// Tunables for the navigator.
#[derive(Debug, Clone)]
pub struct NavigatorOptions {
    pub max_results: usize,
    pub close_delay: Duration,
    pub launch: LaunchOptions,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULTS,
            close_delay: DEFAULT_CLOSE_DELAY,
            launch: LaunchOptions::default(),
        }
    }
}

/// Drives a [`ListView`] from catalog, favorites and user input.
///
/// Generic over the view and the process spawner, so the same logic runs
/// under GTK, in a terminal and in tests.
///
/// ```ignore
/// let mut nav = Navigator::new(catalog, favorites, view, SystemSpawner, options);
/// nav.handle(Event::QueryChanged("fire".into()))?;
/// nav.handle(Event::ActivateQuery)?;
/// ```
pub struct Navigator<V: ListView, S: Spawner> {
    catalog: Catalog,
    favorites: Favorites,
    view: V,
    spawner: S,
    options: NavigatorOptions,
    stack: Vec<View>,
    query: String,
    rows: Vec<Row>,
    selected: Option<usize>,
    drag: Option<Drag>,
    /// Row a moving drag was released on.  GTK reports the release as an
    /// activation of that row; it is dropped until the next tick.
    dropped_row: Option<usize>,
    close_timer: CloseTimer,
    closed: bool,
}

impl<V: ListView, S: Spawner> Navigator<V, S> {
    /// Create the navigator and render the favorites view.
    pub fn new(
        catalog: Catalog,
        favorites: Favorites,
        view: V,
        spawner: S,
        options: NavigatorOptions,
    ) -> Self {
        let close_timer = CloseTimer::new(options.close_delay);
        let mut nav = Self {
            catalog,
            favorites,
            view,
            spawner,
            options,
            stack: vec![View::Favorites],
            query: String::new(),
            rows: Vec::new(),
            selected: None,
            drag: None,
            dropped_row: None,
            close_timer,
            closed: false,
        };
        nav.render_top();
        nav
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn top(&self) -> &View {
        // The stack never drops below the favorites frame.
        &self.stack[self.stack.len() - 1]
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_searching(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Process one event.  Events after close are ignored.
    pub fn handle(&mut self, event: Event) -> Result<(), NavigatorError> {
        if self.closed {
            debug!("ignoring {:?} after close", event);
            return Ok(());
        }
        // Selection, focus and pointer noise between a drag and its stray
        // activation must not reset the guard.
        let dropped_row = match event {
            Event::RowSelected(_)
            | Event::FocusIn
            | Event::FocusOut
            | Event::DragMotion(_)
            | Event::DragEnd => None,
            _ => self.dropped_row.take(),
        };

        match event {
            Event::QueryChanged(query) => self.set_query(query),
            Event::ActivateRow(index) => {
                if dropped_row == Some(index) || self.drag.is_some_and(|d| d.moved) {
                    debug!("activation of row {} ends a drag, ignored", index);
                    return Ok(());
                }
                self.drag = None;
                return self.activate_row(index);
            }
            Event::ActivateNavControl => self.activate_nav_control(),
            Event::ActivateQuery => return self.activate_query(),
            Event::Escape => self.escape(),
            Event::RowSelected(index) => {
                self.selected = index.filter(|&i| i < self.rows.len());
            }
            Event::ToggleFavorite(index) => return self.toggle_favorite(index),
            Event::DragBegin(index) => self.drag_begin(index),
            Event::DragMotion(index) => self.drag_motion(index),
            Event::DragEnd => return self.drag_end(),
            Event::FocusOut => self.close_timer.focus_out(Instant::now()),
            Event::FocusIn => self.close_timer.focus_in(),
        }
        Ok(())
    }

    /// Advance time-based state.  Closes the window once the focus-out
    /// delay has elapsed.
    ///
    /// Frontends call this after draining each batch of events, so a
    /// release that produced no activation stops guarding its row here.
    pub fn tick(&mut self, now: Instant) {
        self.dropped_row = None;
        if !self.closed && self.close_timer.poll(now) {
            info!("focus lost, closing");
            self.close();
        }
    }

    /// Close the window.  Idempotent.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.view.close();
        }
    }

    //  Navigation

    fn push(&mut self, view: View) {
        debug!("push {:?} at depth {}", view, self.stack.len());
        self.stack.push(view);
        self.render_top();
    }

    fn go_back(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
            self.render_top();
        }
    }

    fn activate_nav_control(&mut self) {
        if self.is_searching() {
            self.leave_search();
        }
        if *self.top() == View::Favorites {
            self.push(View::Categories);
        } else {
            self.go_back();
        }
    }

    fn escape(&mut self) {
        if self.is_searching() {
            self.leave_search();
        } else if self.stack.len() > 1 {
            self.go_back();
        } else {
            self.close();
        }
    }

    //  Search

    fn set_query(&mut self, query: String) {
        if query == self.query {
            return;
        }
        self.query = query;
        self.refresh();
    }

    fn leave_search(&mut self) {
        self.query.clear();
        self.view.clear_query();
        self.render_top();
    }

    //  Activation

    fn activate_row(&mut self, index: usize) -> Result<(), NavigatorError> {
        match self.rows.get(index).cloned() {
            Some(Row::Category { name, members, .. }) => {
                self.push(View::CategoryContents { name, members });
                Ok(())
            }
            Some(Row::App(entry)) => self.launch(entry),
            None => {
                debug!("no row {}", index);
                Ok(())
            }
        }
    }

    /// Selected row, else the only row, else run the text as a command.
    fn activate_query(&mut self) -> Result<(), NavigatorError> {
        if let Some(index) = self.selected.filter(|&i| i < self.rows.len()) {
            return self.activate_row(index);
        }
        if self.rows.len() == 1 {
            return self.activate_row(0);
        }
        let command = self.query.trim();
        if command.is_empty() {
            return Ok(());
        }
        match launch::spawn_query(command, &self.spawner, &self.options.launch) {
            Ok(()) => {
                info!("ran {:?}", command);
                self.close();
            }
            Err(e) => debug!("could not run {:?}: {}", command, e),
        }
        Ok(())
    }

    fn launch(&mut self, index: usize) -> Result<(), NavigatorError> {
        let Some(entry) = self.catalog.get(index) else {
            return Ok(());
        };
        let method = launch::launch_entry(entry, &self.spawner, &self.options.launch)?;
        info!("launched {} ({})", entry.id, method);
        self.close();
        Ok(())
    }

    //  Favorites

    fn toggle_favorite(&mut self, index: usize) -> Result<(), NavigatorError> {
        let Some(Row::App(entry)) = self.rows.get(index) else {
            return Ok(());
        };
        let id = self.catalog.entries()[*entry].id.clone();
        let result = self.favorites.toggle(&id);
        if let Ok(now_favorite) = result {
            info!("{} {} favorites", if now_favorite { "added to" } else { "removed from" }, id);
        }
        // The in-memory list changed even if the write failed.
        self.refresh();
        result.map(drop).map_err(Into::into)
    }

    //  Drag reordering

    fn drag_begin(&mut self, index: usize) {
        let reorderable = !self.is_searching()
            && *self.top() == View::Favorites
            && matches!(self.rows.get(index), Some(Row::App(_)));
        self.drag = reorderable.then_some(Drag {
            row: index,
            moved: false,
        });
    }

    fn drag_motion(&mut self, target: usize) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        if target == drag.row || target >= self.rows.len() {
            return;
        }
        let row = self.rows.remove(drag.row);
        self.rows.insert(target, row);
        self.view.move_row(drag.row, target);
        drag.row = target;
        drag.moved = true;
        self.selected = Some(target);
        self.view.select(self.selected);
    }

    fn drag_end(&mut self) -> Result<(), NavigatorError> {
        let Some(drag) = self.drag.take() else {
            return Ok(());
        };
        if !drag.moved {
            return Ok(());
        }
        self.dropped_row = Some(drag.row);

        let mut ids: Vec<String> = self
            .rows
            .iter()
            .filter_map(|row| match row {
                Row::App(i) => Some(self.catalog.entries()[*i].id.clone()),
                Row::Category { .. } => None,
            })
            .collect();
        // Favorites that are not installed right now keep their place at
        // the end instead of being dropped.
        ids.extend(
            self.favorites
                .ids()
                .iter()
                .filter(|id| self.catalog.index_of(id).is_none())
                .cloned(),
        );
        debug!("new favorites order {:?}", ids);
        self.favorites.replace(ids)?;
        Ok(())
    }

    //  Rendering

    fn refresh(&mut self) {
        if self.is_searching() {
            self.render_search();
        } else {
            self.render_top();
        }
    }

    fn render_top(&mut self) {
        let (rows, control, draggable) = match self.top() {
            View::Favorites => (self.favorite_rows(), NavControl::AllApplications, true),
            View::Categories => (self.category_rows(), NavControl::Back, false),
            View::CategoryContents { members, .. } => {
                let mut members = members.clone();
                members.sort_unstable();
                (members.into_iter().map(Row::App).collect(), NavControl::Back, false)
            }
        };
        self.view.set_nav_control(control);
        self.show(rows, draggable);
    }

    fn render_search(&mut self) {
        let hits = search::search_limited(
            &self.query,
            self.catalog.entries(),
            self.options.max_results,
        );
        debug!("{:?} matched {} entries", self.query, hits.len());
        self.show(hits.into_iter().map(Row::App).collect(), false);
    }

    fn favorite_rows(&self) -> Vec<Row> {
        self.favorites
            .ids()
            .iter()
            .filter_map(|id| self.catalog.index_of(id))
            .map(Row::App)
            .collect()
    }

    fn category_rows(&self) -> Vec<Row> {
        let mut rows = vec![Row::Category {
            name: ALL_APPLICATIONS.to_string(),
            icon_name: ALL_APPLICATIONS_ICON,
            members: self.catalog.all_indices(),
        }];
        rows.extend(self.catalog.categories().map(|(category, members)| Row::Category {
            name: category.name().to_string(),
            icon_name: category.icon_name(),
            members: members.to_vec(),
        }));
        rows
    }

    fn model(&self, row: &Row, draggable: bool) -> RowModel {
        match row {
            Row::Category {
                name,
                icon_name,
                members,
            } => RowModel::Category {
                label: name.clone(),
                icon_name: *icon_name,
                count: members.len(),
            },
            Row::App(i) => {
                let entry = &self.catalog.entries()[*i];
                RowModel::app(entry, self.favorites.contains(&entry.id), draggable)
            }
        }
    }

    /// Replace the rows and select the first one.
    fn show(&mut self, rows: Vec<Row>, draggable: bool) {
        let models: Vec<RowModel> = rows.iter().map(|r| self.model(r, draggable)).collect();
        self.rows = rows;
        self.drag = None;
        self.view.set_rows(&models);
        self.selected = (!self.rows.is_empty()).then_some(0);
        self.view.select(self.selected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AppEntry;
    use crate::favorites;
    use std::cell::RefCell;

    //  Recording view

    #[derive(Debug, Default)]
    struct RecordingView {
        rows: Vec<RowModel>,
        selected: Option<usize>,
        control: Option<NavControl>,
        renders: usize,
        cleared: usize,
        closed: usize,
    }

    impl RecordingView {
        fn labels(&self) -> Vec<&str> {
            self.rows.iter().map(RowModel::label).collect()
        }

        fn stars(&self) -> Vec<bool> {
            self.rows
                .iter()
                .map(|r| matches!(r, RowModel::App { favorite: true, .. }))
                .collect()
        }
    }

    impl ListView for RecordingView {
        fn set_rows(&mut self, rows: &[RowModel]) {
            self.rows = rows.to_vec();
            self.renders += 1;
        }

        fn select(&mut self, index: Option<usize>) {
            self.selected = index;
        }

        fn move_row(&mut self, from: usize, to: usize) {
            let row = self.rows.remove(from);
            self.rows.insert(to, row);
        }

        fn set_nav_control(&mut self, control: NavControl) {
            self.control = Some(control);
        }

        fn clear_query(&mut self) {
            self.cleared += 1;
        }

        fn close(&mut self) {
            self.closed += 1;
        }
    }

    //  Recording spawner

    #[derive(Debug, Default)]
    struct RecordingSpawner {
        fail: bool,
        log: RefCell<Vec<String>>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("spawn refused")]
    struct Refused;

    impl Spawner for RecordingSpawner {
        type Error = Refused;

        fn spawn_entry(&self, entry: &AppEntry) -> Result<(), Refused> {
            self.log.borrow_mut().push(format!("entry {}", entry.id));
            if self.fail {
                Err(Refused)
            } else {
                Ok(())
            }
        }

        fn spawn(&self, argv: &[String]) -> Result<(), Refused> {
            self.log.borrow_mut().push(argv.join(" "));
            if self.fail {
                Err(Refused)
            } else {
                Ok(())
            }
        }
    }

    //  Fixture

    fn app(id: &str, name: &str, tags: &[&str]) -> AppEntry {
        AppEntry {
            categories: tags.iter().map(|t| t.to_string()).collect(),
            ..AppEntry::new(id, name)
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            app("tetris.desktop", "Tetris", &["Game"]),
            app("gimp.desktop", "GIMP", &["Graphics"]),
            app("firefox.desktop", "Firefox", &["Network", "WebBrowser"]),
            app("terminal.desktop", "Terminal", &["System"]),
            app("inkscape.desktop", "Inkscape", &["Graphics"]),
        ])
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        path: std::path::PathBuf,
        nav: Navigator<RecordingView, RecordingSpawner>,
    }

    fn fixture_with(favorite_ids: &[&str], spawner: RecordingSpawner) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        let ids: Vec<String> = favorite_ids.iter().map(|s| s.to_string()).collect();
        favorites::save(&path, &ids).unwrap();
        let nav = Navigator::new(
            catalog(),
            Favorites::open(&path),
            RecordingView::default(),
            spawner,
            NavigatorOptions::default(),
        );
        Fixture {
            _dir: dir,
            path,
            nav,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(
            &["tetris.desktop", "firefox.desktop", "gone.desktop", "gimp.desktop"],
            RecordingSpawner::default(),
        )
    }

    fn spawned(f: &Fixture) -> Vec<String> {
        f.nav.spawner.log.borrow().clone()
    }

    //  Tests

    #[test]
    fn starts_on_favorites_in_stored_order() {
        let f = fixture();
        assert_eq!(f.nav.depth(), 1);
        assert_eq!(f.nav.view().labels(), vec!["Tetris", "Firefox", "GIMP"]);
        assert_eq!(f.nav.view().stars(), vec![true, true, true]);
        assert_eq!(f.nav.view().control, Some(NavControl::AllApplications));
        assert_eq!(f.nav.view().selected, Some(0));
        assert!(f
            .nav
            .view()
            .rows
            .iter()
            .all(|r| matches!(r, RowModel::App { draggable: true, .. })));
    }

    #[test]
    fn categories_view_lists_all_applications_first() {
        let mut f = fixture();
        f.nav.handle(Event::ActivateNavControl).unwrap();
        assert_eq!(f.nav.depth(), 2);
        assert_eq!(f.nav.top(), &View::Categories);
        assert_eq!(
            f.nav.view().labels(),
            vec!["All Applications", "Games", "Graphics", "Internet", "System Tools"]
        );
        assert_eq!(f.nav.view().control, Some(NavControl::Back));
        assert!(matches!(
            f.nav.view().rows[0],
            RowModel::Category { count: 5, icon_name: "applications-other", .. }
        ));
    }

    #[test]
    fn stack_depth_follows_navigation_and_back_refreshes_flags() {
        let mut f = fixture();
        f.nav.handle(Event::ActivateNavControl).unwrap();
        f.nav.handle(Event::ActivateRow(2)).unwrap(); // Graphics
        assert_eq!(f.nav.depth(), 3);
        assert_eq!(f.nav.view().labels(), vec!["GIMP", "Inkscape"]);
        assert_eq!(f.nav.view().stars(), vec![true, false]);

        f.nav.handle(Event::ToggleFavorite(1)).unwrap();
        assert_eq!(f.nav.depth(), 3);
        assert_eq!(f.nav.view().labels(), vec!["GIMP", "Inkscape"]);
        assert_eq!(f.nav.view().stars(), vec![true, true]);

        f.nav.handle(Event::ActivateNavControl).unwrap();
        assert_eq!(f.nav.depth(), 2);
        f.nav.handle(Event::Escape).unwrap();
        assert_eq!(f.nav.depth(), 1);
        assert_eq!(
            f.nav.view().labels(),
            vec!["Tetris", "Firefox", "GIMP", "Inkscape"]
        );
        assert!(!f.nav.is_closed());
    }

    #[test]
    fn escape_at_root_closes_once() {
        let mut f = fixture();
        f.nav.handle(Event::Escape).unwrap();
        assert!(f.nav.is_closed());
        f.nav.handle(Event::Escape).unwrap();
        assert_eq!(f.nav.view().closed, 1);
    }

    #[test]
    fn search_overlays_without_touching_the_stack() {
        let mut f = fixture();
        f.nav.handle(Event::ActivateNavControl).unwrap();
        f.nav.handle(Event::QueryChanged("te".into())).unwrap();
        assert_eq!(f.nav.depth(), 2);
        assert_eq!(f.nav.view().labels(), vec!["Terminal", "Tetris"]);
        assert_eq!(f.nav.view().stars(), vec![false, true]);
        assert_eq!(f.nav.view().selected, Some(0));

        f.nav.handle(Event::QueryChanged(String::new())).unwrap();
        assert_eq!(f.nav.depth(), 2);
        assert_eq!(f.nav.view().labels()[0], "All Applications");
    }

    #[test]
    fn whitespace_query_is_a_search() {
        let mut f = fixture();
        f.nav.handle(Event::QueryChanged(" ".into())).unwrap();
        assert!(f.nav.is_searching());
        assert_eq!(f.nav.depth(), 1);
        assert_eq!(f.nav.view().rows.len(), 5);
        assert!(f
            .nav
            .view()
            .rows
            .iter()
            .all(|r| matches!(r, RowModel::App { draggable: false, .. })));

        f.nav.handle(Event::Escape).unwrap();
        assert!(!f.nav.is_closed());
        assert_eq!(f.nav.query(), "");
        assert_eq!(f.nav.view().labels(), vec!["Tetris", "Firefox", "GIMP"]);
    }

    #[test]
    fn escape_during_search_clears_query_first() {
        let mut f = fixture();
        f.nav.handle(Event::QueryChanged("gimp".into())).unwrap();
        f.nav.handle(Event::Escape).unwrap();
        assert!(!f.nav.is_closed());
        assert_eq!(f.nav.query(), "");
        assert_eq!(f.nav.view().cleared, 1);
        assert_eq!(f.nav.view().labels(), vec!["Tetris", "Firefox", "GIMP"]);
    }

    #[test]
    fn toggling_during_search_keeps_results() {
        let mut f = fixture();
        f.nav.handle(Event::QueryChanged("inks".into())).unwrap();
        f.nav.handle(Event::ToggleFavorite(0)).unwrap();
        assert_eq!(f.nav.view().labels(), vec!["Inkscape"]);
        assert_eq!(f.nav.view().stars(), vec![true]);
        assert!(favorites::load(&f.path).contains(&"inkscape.desktop".to_string()));
    }

    #[test]
    fn unfavoriting_in_favorites_view_removes_the_row() {
        let mut f = fixture();
        f.nav.handle(Event::ToggleFavorite(1)).unwrap();
        assert_eq!(f.nav.view().labels(), vec!["Tetris", "GIMP"]);
        assert_eq!(
            favorites::load(&f.path),
            vec!["tetris.desktop", "gone.desktop", "gimp.desktop"]
        );
    }

    #[test]
    fn drag_from_first_to_third_saves_new_order() {
        let mut f = fixture();
        f.nav.handle(Event::DragBegin(0)).unwrap();
        f.nav.handle(Event::DragMotion(1)).unwrap();
        f.nav.handle(Event::DragMotion(2)).unwrap();
        f.nav.handle(Event::DragEnd).unwrap();

        assert_eq!(f.nav.view().labels(), vec!["Firefox", "GIMP", "Tetris"]);
        assert_eq!(f.nav.view().selected, Some(2));
        assert_eq!(
            favorites::load(&f.path),
            vec!["firefox.desktop", "gimp.desktop", "tetris.desktop", "gone.desktop"]
        );
    }

    #[test]
    fn release_after_drag_does_not_launch() {
        let mut f = fixture();
        f.nav.handle(Event::DragBegin(0)).unwrap();
        f.nav.handle(Event::DragMotion(1)).unwrap();
        f.nav.handle(Event::DragEnd).unwrap();
        f.nav.handle(Event::RowSelected(Some(1))).unwrap();
        f.nav.handle(Event::ActivateRow(1)).unwrap();
        assert!(spawned(&f).is_empty());
        assert!(!f.nav.is_closed());

        // The next click is a real one.
        f.nav.handle(Event::ActivateRow(1)).unwrap();
        assert_eq!(spawned(&f), vec!["entry tetris.desktop"]);
        assert!(f.nav.is_closed());
    }

    #[test]
    fn keyboard_activation_after_drag_launches() {
        let mut f = fixture();
        f.nav.handle(Event::DragBegin(0)).unwrap();
        f.nav.handle(Event::DragMotion(1)).unwrap();
        f.nav.handle(Event::DragEnd).unwrap();
        // Released outside the list: the focus moves on and Enter hits
        // another row.
        f.nav.handle(Event::RowSelected(Some(2))).unwrap();
        f.nav.handle(Event::ActivateRow(2)).unwrap();
        assert_eq!(spawned(&f), vec!["entry gimp.desktop"]);
    }

    #[test]
    fn tick_ends_the_release_guard() {
        let mut f = fixture();
        f.nav.handle(Event::DragBegin(0)).unwrap();
        f.nav.handle(Event::DragMotion(1)).unwrap();
        f.nav.handle(Event::DragEnd).unwrap();
        f.nav.tick(Instant::now());
        f.nav.handle(Event::ActivateRow(1)).unwrap();
        assert_eq!(spawned(&f), vec!["entry tetris.desktop"]);
    }

    #[test]
    fn new_press_after_drag_is_a_real_click() {
        let mut f = fixture();
        f.nav.handle(Event::DragBegin(0)).unwrap();
        f.nav.handle(Event::DragMotion(1)).unwrap();
        f.nav.handle(Event::DragEnd).unwrap();
        // Released outside any row: no stray activation arrives.
        f.nav.handle(Event::DragBegin(2)).unwrap();
        f.nav.handle(Event::DragEnd).unwrap();
        f.nav.handle(Event::ActivateRow(2)).unwrap();
        assert_eq!(spawned(&f), vec!["entry gimp.desktop"]);
    }

    #[test]
    fn click_without_motion_launches() {
        let mut f = fixture();
        f.nav.handle(Event::DragBegin(1)).unwrap();
        f.nav.handle(Event::DragEnd).unwrap();
        f.nav.handle(Event::ActivateRow(1)).unwrap();
        assert_eq!(spawned(&f), vec!["entry firefox.desktop"]);
    }

    #[test]
    fn drag_without_begin_or_outside_favorites_is_ignored() {
        let mut f = fixture();
        let before = std::fs::read_to_string(&f.path).unwrap();
        f.nav.handle(Event::DragMotion(2)).unwrap();
        f.nav.handle(Event::DragEnd).unwrap();
        assert_eq!(f.nav.view().labels(), vec!["Tetris", "Firefox", "GIMP"]);

        f.nav.handle(Event::ActivateNavControl).unwrap();
        f.nav.handle(Event::DragBegin(0)).unwrap();
        f.nav.handle(Event::DragMotion(1)).unwrap();
        f.nav.handle(Event::DragEnd).unwrap();
        assert_eq!(f.nav.view().labels()[0], "All Applications");
        assert_eq!(std::fs::read_to_string(&f.path).unwrap(), before);
    }

    #[test]
    fn launch_success_closes_the_window() {
        let mut f = fixture();
        f.nav.handle(Event::ActivateRow(2)).unwrap();
        assert_eq!(spawned(&f), vec!["entry gimp.desktop"]);
        assert_eq!(f.nav.view().closed, 1);
    }

    #[test]
    fn launch_failure_tries_every_fallback_and_stays_open() {
        let mut f = fixture_with(
            &["gimp.desktop"],
            RecordingSpawner {
                fail: true,
                ..RecordingSpawner::default()
            },
        );
        let err = f.nav.handle(Event::ActivateRow(0)).unwrap_err();
        assert!(matches!(err, NavigatorError::Launch(_)));
        assert_eq!(
            spawned(&f),
            vec![
                "entry gimp.desktop",
                "gtk-launch gimp.desktop",
                "dbus-launch gtk-launch gimp.desktop"
            ]
        );
        assert!(!f.nav.is_closed());
    }

    #[test]
    fn enter_launches_selected_or_single_result() {
        let mut f = fixture();
        f.nav.handle(Event::QueryChanged("fire".into())).unwrap();
        f.nav.handle(Event::RowSelected(None)).unwrap();
        f.nav.handle(Event::ActivateQuery).unwrap();
        assert_eq!(spawned(&f), vec!["entry firefox.desktop"]);

        let mut f = fixture();
        f.nav.handle(Event::QueryChanged("te".into())).unwrap();
        f.nav.handle(Event::RowSelected(Some(1))).unwrap();
        f.nav.handle(Event::ActivateQuery).unwrap();
        assert_eq!(spawned(&f), vec!["entry tetris.desktop"]);
    }

    #[test]
    fn enter_with_unmatched_text_runs_a_shell_command() {
        let mut f = fixture();
        f.nav.handle(Event::QueryChanged("echo hi".into())).unwrap();
        assert!(f.nav.view().rows.is_empty());
        f.nav.handle(Event::ActivateQuery).unwrap();
        assert_eq!(spawned(&f), vec!["sh -c echo hi"]);
        assert!(f.nav.is_closed());
    }

    #[test]
    fn enter_with_several_unselected_results_runs_a_shell_command() {
        let mut f = fixture();
        f.nav.handle(Event::QueryChanged("te".into())).unwrap();
        f.nav.handle(Event::RowSelected(None)).unwrap();
        f.nav.handle(Event::ActivateQuery).unwrap();
        assert_eq!(spawned(&f), vec!["sh -c te"]);
    }

    #[test]
    fn focus_loss_closes_after_the_delay_unless_regained() {
        let mut f = fixture();
        f.nav.handle(Event::FocusOut).unwrap();
        f.nav.handle(Event::FocusIn).unwrap();
        f.nav.tick(Instant::now() + Duration::from_secs(5));
        assert!(!f.nav.is_closed());

        f.nav.handle(Event::FocusOut).unwrap();
        f.nav.tick(Instant::now() + DEFAULT_CLOSE_DELAY + Duration::from_millis(1));
        assert!(f.nav.is_closed());
        f.nav.tick(Instant::now() + Duration::from_secs(10));
        assert_eq!(f.nav.view().closed, 1);
    }

    #[test]
    fn out_of_range_rows_are_ignored() {
        let mut f = fixture();
        f.nav.handle(Event::ActivateRow(42)).unwrap();
        f.nav.handle(Event::ToggleFavorite(42)).unwrap();
        f.nav.handle(Event::RowSelected(Some(42))).unwrap();
        assert_eq!(f.nav.selected(), None);
        assert!(spawned(&f).is_empty());
    }
}
