//! A simple toolkit table backed by header and row vectors.
//!
//! `SimpleAccessibleTable` stands in for a toolkit's table component. It keeps
//! its headers and cell text behind a lock and, once bound to a
//! [`ToolkitContext`], asserts that every read and mutation happens on that
//! context's thread.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_axbridge_core::{ThreadAffinity, ToolkitContext};
use parking_lot::RwLock;

use super::traits::AccessibleTable;

#[derive(Debug, Default)]
struct TableState {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableState {
    fn normalize_row(&self, mut row: Vec<String>) -> Vec<String> {
        row.resize(self.headers.len(), String::new());
        row
    }
}

/// A simple table that stores headers and rows of text.
///
/// # Example
///
/// ```
/// use horizon_axbridge::model::{AccessibleTable, SimpleAccessibleTable};
///
/// let table = SimpleAccessibleTable::new("Employees", ["Name", "Department"]);
/// table.append_row(["Alice", "Engineering"]);
/// table.append_row(["Bob", "Sales"]);
///
/// assert_eq!(table.column_count(), 2);
/// assert_eq!(table.cell_text(1, 0).as_deref(), Some("Bob"));
/// ```
#[derive(Debug)]
pub struct SimpleAccessibleTable {
    state: RwLock<TableState>,
    disposed: AtomicBool,
    affinity: OnceLock<ThreadAffinity>,
}

impl SimpleAccessibleTable {
    /// Creates a table with the given name and column headers.
    pub fn new<I, S>(name: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            state: RwLock::new(TableState {
                name: name.into(),
                headers: headers.into_iter().map(Into::into).collect(),
                rows: Vec::new(),
            }),
            disposed: AtomicBool::new(false),
            affinity: OnceLock::new(),
        }
    }

    /// Binds the table to a toolkit context.
    ///
    /// From then on every access outside that context's thread trips the
    /// affinity check. Binding is permanent; later calls are ignored.
    pub fn bind_to(&self, context: &ToolkitContext) {
        let _ = self.affinity.set(context.affinity());
    }

    /// Returns `true` if the table has been bound to a context.
    pub fn is_bound(&self) -> bool {
        self.affinity.get().is_some()
    }

    fn check_thread(&self) {
        if let Some(affinity) = self.affinity.get() {
            affinity.check("toolkit table accessed outside the toolkit context");
        }
    }

    /// Sets the table name.
    pub fn set_name(&self, name: impl Into<String>) {
        self.check_thread();
        self.state.write().name = name.into();
    }

    /// Inserts a column at `index`, shifting later columns right.
    ///
    /// `index` is clamped to the current column count. Existing rows get an
    /// empty cell in the new column.
    pub fn insert_column(&self, index: usize, header: impl Into<String>) {
        self.check_thread();
        let mut state = self.state.write();
        let index = index.min(state.headers.len());
        state.headers.insert(index, header.into());
        for row in &mut state.rows {
            row.insert(index, String::new());
        }
    }

    /// Removes the column at `index` and returns its header.
    pub fn remove_column(&self, index: usize) -> Option<String> {
        self.check_thread();
        let mut state = self.state.write();
        if index >= state.headers.len() {
            return None;
        }
        for row in &mut state.rows {
            row.remove(index);
        }
        Some(state.headers.remove(index))
    }

    /// Grows or shrinks the table to exactly `count` columns.
    ///
    /// New columns get empty headers and cells.
    pub fn set_column_count(&self, count: usize) {
        self.check_thread();
        let mut state = self.state.write();
        state.headers.resize(count, String::new());
        for row in &mut state.rows {
            row.resize(count, String::new());
        }
    }

    /// Sets a single header. Out-of-range columns are ignored.
    pub fn set_header(&self, column: usize, header: impl Into<String>) {
        self.check_thread();
        if let Some(slot) = self.state.write().headers.get_mut(column) {
            *slot = header.into();
        }
    }

    /// Appends a row, padded or truncated to the column count.
    pub fn append_row<I, S>(&self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_thread();
        let mut state = self.state.write();
        let row = state.normalize_row(row.into_iter().map(Into::into).collect());
        state.rows.push(row);
    }

    /// Removes a row. Returns `false` if `index` is out of range.
    pub fn remove_row(&self, index: usize) -> bool {
        self.check_thread();
        let mut state = self.state.write();
        if index >= state.rows.len() {
            return false;
        }
        state.rows.remove(index);
        true
    }

    /// Sets the text of a cell. Out-of-range cells are ignored.
    pub fn set_cell(&self, row: usize, column: usize, text: impl Into<String>) {
        self.check_thread();
        if let Some(cell) = self
            .state
            .write()
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
        {
            *cell = text.into();
        }
    }

    /// Removes all rows.
    pub fn clear_rows(&self) {
        self.check_thread();
        self.state.write().rows.clear();
    }

    /// Disposes of the table. Adapters referencing it become inert.
    pub fn dispose(&self) {
        self.check_thread();
        self.disposed.store(true, Ordering::Release);
    }
}

impl AccessibleTable for SimpleAccessibleTable {
    fn column_count(&self) -> usize {
        self.check_thread();
        self.state.read().headers.len()
    }

    fn row_count(&self) -> usize {
        self.check_thread();
        self.state.read().rows.len()
    }

    fn column_header(&self, column: usize) -> Option<String> {
        self.check_thread();
        self.state
            .read()
            .headers
            .get(column)
            .filter(|header| !header.is_empty())
            .cloned()
    }

    fn table_name(&self) -> Option<String> {
        self.check_thread();
        let state = self.state.read();
        if state.name.is_empty() {
            None
        } else {
            Some(state.name.clone())
        }
    }

    fn cell_text(&self, row: usize, column: usize) -> Option<String> {
        self.check_thread();
        self.state
            .read()
            .rows
            .get(row)
            .and_then(|r| r.get(column))
            .cloned()
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}
