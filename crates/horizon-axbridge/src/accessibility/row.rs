//! Row adapter.

use std::sync::Arc;

use accesskit::Node;
use horizon_axbridge_core::{BridgeError, Result};

use super::attribute::{AxAttribute, AxValue, count_value, index_value};
use super::cell::CellAdapter;
use super::node::{AdapterBase, AdapterNode, NodeIdentity, NodeKey, degrade};
use super::node_key_to_node_id;
use super::role::AccessibleRole;

/// Adapter for one row of a table. Its children are the row's cells.
#[derive(Debug)]
pub struct RowAdapter {
    base: AdapterBase,
    row: usize,
}

static_assertions::assert_impl_all!(RowAdapter: Send, Sync);

impl RowAdapter {
    pub(crate) fn new(base: AdapterBase, row: usize) -> Self {
        Self { base, row }
    }

    /// The row index this adapter stands for, unchecked.
    pub fn row(&self) -> usize {
        self.row
    }

    /// The 0-based position of this row in the table, validated against the
    /// live row count.
    pub fn try_row_index_in_table(&self) -> Result<usize> {
        let row = self.row;
        self.base.peer().query(move |table| {
            if table.is_row_valid(row) {
                Ok(row)
            } else {
                Err(BridgeError::row_out_of_range(row, table.row_count()))
            }
        })
    }

    /// The 0-based position of this row, or `None` when unavailable.
    pub fn row_index_in_table(&self) -> Option<usize> {
        degrade(
            self.try_row_index_in_table(),
            self.role(),
            self.key(),
            "row_index_in_table",
        )
    }

    /// Number of cells in this row, i.e. the table's column count.
    pub fn column_count(&self) -> Option<usize> {
        let row = self.row;
        let result = self.base.peer().query(move |table| {
            if table.is_row_valid(row) {
                Ok(table.column_count())
            } else {
                Err(BridgeError::row_out_of_range(row, table.row_count()))
            }
        });
        degrade(result, self.role(), self.key(), "column_count")
    }

    /// Fresh snapshot of this row's cell adapters, left to right.
    pub fn cells(&self) -> Vec<Arc<CellAdapter>> {
        let (Some(columns), Some(tree)) = (self.column_count(), self.base.tree()) else {
            return Vec::new();
        };
        (0..columns)
            .map(|column| tree.cell(self.base.table_key(), self.base.peer(), self.row, column))
            .collect()
    }
}

impl AdapterNode for RowAdapter {
    fn key(&self) -> NodeKey {
        self.base.key()
    }

    fn identity(&self) -> NodeIdentity {
        self.base.identity()
    }

    fn role(&self) -> AccessibleRole {
        AccessibleRole::Row
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
        self.column_count()
    }

    fn is_valid(&self) -> bool {
        self.base.is_valid()
    }

    fn index_in_parent(&self) -> Option<usize> {
        self.row_index_in_table()
    }

    fn role_attribute(&self, attribute: AxAttribute) -> AxValue {
        match attribute {
            AxAttribute::RowIndex => index_value(self.row_index_in_table()),
            AxAttribute::ColumnCount => count_value(self.column_count()),
            _ => AxValue::None,
        }
    }

    fn build_accessible_node(&self) -> Option<Node> {
        self.row_index_in_table()?;

        let mut node = Node::new(self.role().to_accesskit_role());
        node.set_row_index(self.row);
        let children: Vec<_> = self
            .cells()
            .iter()
            .map(|cell| node_key_to_node_id(cell.key()))
            .collect();
        if !children.is_empty() {
            node.set_children(children);
        }
        Some(node)
    }
}
