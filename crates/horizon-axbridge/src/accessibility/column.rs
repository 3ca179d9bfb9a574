//! Column adapter.

use std::sync::Arc;

use accesskit::Node;
use horizon_axbridge_core::{BridgeError, Result};

use super::attribute::{AxAttribute, AxValue, count_value, index_value};
use super::cell::CellAdapter;
use super::node::{AdapterBase, AdapterNode, NodeIdentity, NodeKey, degrade};
use super::role::AccessibleRole;

/// Adapter for one column of a table.
///
/// The adapter remembers the column index it was created for. Whether that
/// index still addresses a column is decided against the table's live column
/// count on every query, so a column that disappears reports "unavailable"
/// and one that comes back (the table grew again) reports its index again.
#[derive(Debug)]
pub struct ColumnAdapter {
    base: AdapterBase,
    column: usize,
}

static_assertions::assert_impl_all!(ColumnAdapter: Send, Sync);

impl ColumnAdapter {
    pub(crate) fn new(base: AdapterBase, column: usize) -> Self {
        Self { base, column }
    }

    /// The column index this adapter stands for, unchecked.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Key of the owning table adapter.
    pub fn table_key(&self) -> NodeKey {
        self.base.table_key()
    }

    /// The 0-based position of this column in the table, validated.
    ///
    /// Fails with [`BridgeError::IndexOutOfRange`] when the column count has
    /// dropped to or below the index, with [`BridgeError::StalePeer`] when the
    /// table is gone, and with a context error when the toolkit does not
    /// answer in time.
    pub fn try_column_number_in_table(&self) -> Result<usize> {
        let column = self.column;
        self.base.peer().query(move |table| {
            if table.is_index_valid(column) {
                Ok(column)
            } else {
                Err(BridgeError::column_out_of_range(column, table.column_count()))
            }
        })
    }

    /// The 0-based position of this column in the table, or `None` when it
    /// is currently unavailable.
    pub fn column_number_in_table(&self) -> Option<usize> {
        degrade(
            self.try_column_number_in_table(),
            self.role(),
            self.key(),
            "column_number_in_table",
        )
    }

    /// Header text of this column, validated like
    /// [`try_column_number_in_table`](Self::try_column_number_in_table).
    ///
    /// A column without header text yields `Ok(None)`.
    pub fn try_header_text(&self) -> Result<Option<String>> {
        let column = self.column;
        self.base.peer().query(move |table| {
            if table.is_index_valid(column) {
                Ok(table.column_header(column))
            } else {
                Err(BridgeError::column_out_of_range(column, table.column_count()))
            }
        })
    }

    /// Header text of this column, if available.
    pub fn header_text(&self) -> Option<String> {
        degrade(self.try_header_text(), self.role(), self.key(), "header_text").flatten()
    }

    /// Number of columns spanned. Always 1 while the column exists.
    pub fn column_span(&self) -> Option<usize> {
        self.column_number_in_table().map(|_| 1)
    }

    /// Number of cells in this column, i.e. the table's row count.
    pub fn row_count(&self) -> Option<usize> {
        let column = self.column;
        let result = self.base.peer().query(move |table| {
            if table.is_index_valid(column) {
                Ok(table.row_count())
            } else {
                Err(BridgeError::column_out_of_range(column, table.column_count()))
            }
        });
        degrade(result, self.role(), self.key(), "row_count")
    }

    /// Fresh snapshot of this column's cell adapters, top to bottom.
    pub fn cells(&self) -> Vec<Arc<CellAdapter>> {
        let Some(rows) = self.row_count() else {
            return Vec::new();
        };
        let Some(tree) = self.base.tree() else {
            return Vec::new();
        };
        (0..rows)
            .map(|row| tree.cell(self.table_key(), self.base.peer(), row, self.column))
            .collect()
    }
}

impl AdapterNode for ColumnAdapter {
    fn key(&self) -> NodeKey {
        self.base.key()
    }

    fn identity(&self) -> NodeIdentity {
        self.base.identity()
    }

    fn role(&self) -> AccessibleRole {
        AccessibleRole::Column
    }

    fn parent(&self) -> Option<Arc<dyn AdapterNode>> {
        self.base.parent()
    }

    fn children(&self) -> Vec<Arc<dyn AdapterNode>> {
        self.cells()
            .into_iter()
            .map(|cell| cell as Arc<dyn AdapterNode>)
            .collect()
    }

    fn child_count(&self) -> Option<usize> {
        self.row_count()
    }

    // Cells belong to rows in the serialized tree.
    fn tree_children(&self) -> Vec<Arc<dyn AdapterNode>> {
        Vec::new()
    }

    fn is_valid(&self) -> bool {
        self.base.is_valid()
    }

    fn label(&self) -> Option<String> {
        self.header_text()
    }

    fn index_in_parent(&self) -> Option<usize> {
        self.column_number_in_table()
    }

    fn role_attribute(&self, attribute: AxAttribute) -> AxValue {
        match attribute {
            AxAttribute::ColumnIndex => index_value(self.column_number_in_table()),
            AxAttribute::Header => AxValue::from(self.header_text()),
            AxAttribute::ColumnSpan => count_value(self.column_span()),
            AxAttribute::RowCount => count_value(self.row_count()),
            _ => AxValue::None,
        }
    }

    fn build_accessible_node(&self) -> Option<Node> {
        let header = degrade(
            self.try_header_text(),
            self.role(),
            self.key(),
            "build_accessible_node",
        )?;

        let mut node = Node::new(self.role().to_accesskit_role());
        node.set_column_index(self.column);
        if let Some(header) = header {
            node.set_label(header);
        }
        Some(node)
    }
}
