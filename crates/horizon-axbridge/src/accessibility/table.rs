//! Table adapter.

use std::sync::Arc;

use accesskit::Node;
use horizon_axbridge_core::Result;

use super::attribute::{AxAttribute, AxValue, count_value};
use super::cell::CellAdapter;
use super::column::ColumnAdapter;
use super::node::{AdapterBase, AdapterNode, NodeIdentity, NodeKey, degrade};
use super::node_key_to_node_id;
use super::peer::PeerAccessor;
use super::role::AccessibleRole;
use super::row::RowAdapter;

/// The table's shape as read in one hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableShape {
    /// Accessible name of the table.
    pub name: Option<String>,
    /// Row count.
    pub rows: usize,
    /// Column count.
    pub columns: usize,
}

/// Adapter for a whole table, the root of its subtree.
///
/// Children are the rows followed by the columns.
#[derive(Debug)]
pub struct TableAdapter {
    base: AdapterBase,
}

static_assertions::assert_impl_all!(TableAdapter: Send, Sync);

impl TableAdapter {
    pub(crate) fn new(base: AdapterBase) -> Self {
        Self { base }
    }

    pub(crate) fn peer(&self) -> &Arc<PeerAccessor> {
        self.base.peer()
    }

    /// Read name and counts together.
    pub fn try_shape(&self) -> Result<TableShape> {
        self.base.peer().query(|table| {
            Ok(TableShape {
                name: table.table_name(),
                rows: table.row_count(),
                columns: table.column_count(),
            })
        })
    }

    /// Name and counts, or `None` when the table is unavailable.
    pub fn shape(&self) -> Option<TableShape> {
        degrade(self.try_shape(), self.role(), self.key(), "shape")
    }

    /// Current column count.
    pub fn column_count(&self) -> Option<usize> {
        let result = self.base.peer().query(|table| Ok(table.column_count()));
        degrade(result, self.role(), self.key(), "column_count")
    }

    /// Current row count.
    pub fn row_count(&self) -> Option<usize> {
        let result = self.base.peer().query(|table| Ok(table.row_count()));
        degrade(result, self.role(), self.key(), "row_count")
    }

    /// Adapter for `column`, if the table currently has that column.
    pub fn column(&self, column: usize) -> Option<Arc<ColumnAdapter>> {
        let result = self.base.peer().query(move |table| Ok(table.is_index_valid(column)));
        if !degrade(result, self.role(), self.key(), "column")? {
            return None;
        }
        let tree = self.base.tree()?;
        Some(tree.column(self.key(), self.base.peer(), column))
    }

    /// Adapter for `row`, if the table currently has that row.
    pub fn row(&self, row: usize) -> Option<Arc<RowAdapter>> {
        let result = self.base.peer().query(move |table| Ok(table.is_row_valid(row)));
        if !degrade(result, self.role(), self.key(), "row")? {
            return None;
        }
        let tree = self.base.tree()?;
        Some(tree.row(self.key(), self.base.peer(), row))
    }

    /// Adapter for the cell at `row`, `column`, if both are in range.
    pub fn cell(&self, row: usize, column: usize) -> Option<Arc<CellAdapter>> {
        let result = self
            .base
            .peer()
            .query(move |table| Ok(table.is_row_valid(row) && table.is_index_valid(column)));
        if !degrade(result, self.role(), self.key(), "cell")? {
            return None;
        }
        let tree = self.base.tree()?;
        Some(tree.cell(self.key(), self.base.peer(), row, column))
    }

    /// Fresh snapshot of the column adapters, left to right.
    pub fn columns(&self) -> Vec<Arc<ColumnAdapter>> {
        let (Some(count), Some(tree)) = (self.column_count(), self.base.tree()) else {
            return Vec::new();
        };
        (0..count)
            .map(|column| tree.column(self.key(), self.base.peer(), column))
            .collect()
    }

    /// Fresh snapshot of the row adapters, top to bottom.
    pub fn rows(&self) -> Vec<Arc<RowAdapter>> {
        let (Some(count), Some(tree)) = (self.row_count(), self.base.tree()) else {
            return Vec::new();
        };
        (0..count)
            .map(|row| tree.row(self.key(), self.base.peer(), row))
            .collect()
    }

    /// All column headers, read in one hand-off.
    pub fn column_headers(&self) -> Vec<Option<String>> {
        let result = self.base.peer().query(|table| {
            Ok((0..table.column_count())
                .map(|column| table.column_header(column))
                .collect::<Vec<_>>())
        });
        degrade(result, self.role(), self.key(), "column_headers").unwrap_or_default()
    }

    fn children_for(&self, shape: &TableShape) -> Vec<Arc<dyn AdapterNode>> {
        let Some(tree) = self.base.tree() else {
            return Vec::new();
        };
        let peer = self.base.peer();
        let rows = (0..shape.rows).map(|row| tree.row(self.key(), peer, row) as Arc<dyn AdapterNode>);
        let columns = (0..shape.columns)
            .map(|column| tree.column(self.key(), peer, column) as Arc<dyn AdapterNode>);
        rows.chain(columns).collect()
    }
}

impl AdapterNode for TableAdapter {
    fn key(&self) -> NodeKey {
        self.base.key()
    }

    fn identity(&self) -> NodeIdentity {
        self.base.identity()
    }

    fn role(&self) -> AccessibleRole {
        AccessibleRole::Table
    }

    fn parent(&self) -> Option<Arc<dyn AdapterNode>> {
        None
    }

    fn children(&self) -> Vec<Arc<dyn AdapterNode>> {
        match self.shape() {
            Some(shape) => self.children_for(&shape),
            None => Vec::new(),
        }
    }

    fn child_count(&self) -> Option<usize> {
        self.shape().map(|shape| shape.rows + shape.columns)
    }

    fn is_valid(&self) -> bool {
        self.base.is_valid()
    }

    fn label(&self) -> Option<String> {
        self.shape().and_then(|shape| shape.name)
    }

    fn role_attribute(&self, attribute: AxAttribute) -> AxValue {
        match attribute {
            AxAttribute::RowCount => count_value(self.row_count()),
            AxAttribute::ColumnCount => count_value(self.column_count()),
            _ => AxValue::None,
        }
    }

    fn build_accessible_node(&self) -> Option<Node> {
        let shape = self.shape()?;
        let children: Vec<_> = self
            .children_for(&shape)
            .iter()
            .map(|child| node_key_to_node_id(child.key()))
            .collect();

        let mut node = Node::new(self.role().to_accesskit_role());
        if let Some(name) = shape.name {
            node.set_label(name);
        }
        node.set_row_count(shape.rows);
        node.set_column_count(shape.columns);
        if !children.is_empty() {
            node.set_children(children);
        }
        Some(node)
    }
}
