//! Line-oriented frontend for terminals and builds without GTK.
//!
//! Each input line is one command:
//!
//! | Input        | Meaning                                  |
//! |--------------|------------------------------------------|
//! | `/text`      | search for `text` (`/` alone clears)     |
//! | *(empty)*    | activate the search box (Enter)          |
//! | `3`          | activate row 3                           |
//! | `*3`         | toggle the favorite star on row 3        |
//! | `>`          | the navigation control (All / Back)      |
//! | `m 0 2`      | drag row 0 onto row 2                    |
//! | `q`          | escape                                   |

use crate::entry::AppEntry;
use crate::navigator::{Event, Navigator};
use crate::traits::{ListView, NavControl, RowModel, Spawner};
use log::{error, warn};
use std::io::{self, BufRead, Write};
use std::time::Instant;

const HELP: &str = "/text search, <enter> run, N open row, *N star, > navigate, m A B move, q back/quit";

/// Turn one input line into navigator events.  Unknown input yields none.
pub fn parse_line(line: &str) -> Vec<Event> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return vec![Event::ActivateQuery];
    }
    if let Some(query) = line.strip_prefix('/') {
        return vec![Event::QueryChanged(query.to_string())];
    }

    let trimmed = line.trim();
    if trimmed == "q" {
        return vec![Event::Escape];
    }
    if trimmed == ">" {
        return vec![Event::ActivateNavControl];
    }
    if let Some(index) = trimmed.strip_prefix('*').and_then(|n| n.trim().parse().ok()) {
        return vec![Event::ToggleFavorite(index)];
    }
    if let Some(rest) = trimmed.strip_prefix("m ") {
        let mut parts = rest.split_whitespace().map(str::parse::<usize>);
        if let (Some(Ok(from)), Some(Ok(to)), None) = (parts.next(), parts.next(), parts.next()) {
            let mut events = vec![Event::DragBegin(from)];
            let mut at = from;
            while at != to {
                at = if to > from { at + 1 } else { at - 1 };
                events.push(Event::DragMotion(at));
            }
            events.push(Event::DragEnd);
            return events;
        }
    }
    if let Ok(index) = trimmed.parse() {
        return vec![Event::ActivateRow(index)];
    }
    Vec::new()
}

/// Prints the list to a writer.
pub struct TerminalView<W: Write> {
    out: W,
    rows: Vec<RowModel>,
    selected: Option<usize>,
    control: Option<NavControl>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            rows: Vec::new(),
            selected: None,
            control: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self) {
        let mut text = String::new();
        for (i, row) in self.rows.iter().enumerate() {
            let cursor = if self.selected == Some(i) { '>' } else { ' ' };
            let line = match row {
                RowModel::Category { label, count, .. } => format!("{} ({})", label, count),
                RowModel::App {
                    label, favorite, ..
                } => format!("{} {}", if *favorite { '*' } else { ' ' }, label),
            };
            text.push_str(&format!("{}{:>3}  {}\n", cursor, i, line));
        }
        if let Some(control) = self.control {
            text.push_str(&format!("  [>] {}\n", control.label()));
        }
        self.write(&text);
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!("terminal write failed: {}", e);
        }
    }
}

impl<W: Write> ListView for TerminalView<W> {
    fn set_rows(&mut self, rows: &[RowModel]) {
        self.rows = rows.to_vec();
    }

    fn select(&mut self, index: Option<usize>) {
        self.selected = index;
        self.print();
    }

    fn move_row(&mut self, from: usize, to: usize) {
        if from < self.rows.len() && to < self.rows.len() {
            let row = self.rows.remove(from);
            self.rows.insert(to, row);
        }
    }

    fn set_nav_control(&mut self, control: NavControl) {
        self.control = Some(control);
    }

    fn clear_query(&mut self) {}

    fn close(&mut self) {
        self.write("closed\n");
    }
}

/// Feed `input` to the navigator until it closes or input ends.
pub fn run<V, S, R>(navigator: &mut Navigator<V, S>, input: R) -> io::Result<()>
where
    V: ListView,
    S: Spawner,
    R: BufRead,
{
    eprintln!("{}", HELP);
    for line in input.lines() {
        for event in parse_line(&line?) {
            if let Err(e) = navigator.handle(event) {
                error!("{}", e);
            }
        }
        navigator.tick(Instant::now());
        if navigator.is_closed() {
            return Ok(());
        }
    }
    navigator.close();
    Ok(())
}

/// `id<TAB>category<TAB>name`, one line per entry.
pub fn list_line(entry: &AppEntry) -> String {
    format!(
        "{}\t{}\t{}",
        entry.id,
        crate::category::Category::of(entry),
        entry.name
    )
}
