//! The accessor contract a toolkit table offers to the bridge.

/// Toolkit-side accessible table.
///
/// This is the narrow surface the adapters read through. Implementations
/// live in the toolkit and are only ever called on the toolkit context: the
/// bridge hands every call over to that context first, so implementors may
/// assume serialized access and are free to assert it.
///
/// At minimum, implement:
/// - [`column_count`](AccessibleTable::column_count)
/// - [`row_count`](AccessibleTable::row_count)
/// - [`column_header`](AccessibleTable::column_header)
///
/// # Example
///
/// ```
/// use horizon_axbridge::model::AccessibleTable;
///
/// struct Fixed {
///     headers: Vec<String>,
/// }
///
/// impl AccessibleTable for Fixed {
///     fn column_count(&self) -> usize {
///         self.headers.len()
///     }
///
///     fn row_count(&self) -> usize {
///         0
///     }
///
///     fn column_header(&self, column: usize) -> Option<String> {
///         self.headers.get(column).cloned()
///     }
/// }
///
/// let table = Fixed { headers: vec!["Name".into()] };
/// assert!(table.is_index_valid(0));
/// assert!(!table.is_index_valid(1));
/// ```
pub trait AccessibleTable: Send + Sync {
    /// Number of columns at this instant.
    fn column_count(&self) -> usize;

    /// Number of rows at this instant.
    fn row_count(&self) -> usize;

    /// Header label of a column, if it has one.
    fn column_header(&self, column: usize) -> Option<String>;

    /// Accessible name of the table itself.
    fn table_name(&self) -> Option<String> {
        None
    }

    /// Text content of a cell.
    fn cell_text(&self, _row: usize, _column: usize) -> Option<String> {
        None
    }

    /// Returns `true` if `column` addresses an existing column.
    fn is_index_valid(&self, column: usize) -> bool {
        column < self.column_count()
    }

    /// Returns `true` if `row` addresses an existing row.
    fn is_row_valid(&self, row: usize) -> bool {
        row < self.row_count()
    }

    /// Returns `true` once the toolkit has disposed of the table.
    ///
    /// Disposal is permanent: once this returns `true` it must keep doing so.
    fn is_disposed(&self) -> bool {
        false
    }
}
