//! Cell adapter.

use std::sync::Arc;

use accesskit::Node;
use horizon_axbridge_core::{BridgeError, Result};

use super::attribute::{AxAttribute, AxValue, count_value, index_value};
use super::node::{AdapterBase, AdapterNode, NodeIdentity, NodeKey, degrade};
use super::role::AccessibleRole;

/// What a cell reads in one hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CellSnapshot {
    text: Option<String>,
    header: Option<String>,
}

/// Adapter for one cell. Its parent is the row adapter.
#[derive(Debug)]
pub struct CellAdapter {
    base: AdapterBase,
    row: usize,
    column: usize,
}

static_assertions::assert_impl_all!(CellAdapter: Send, Sync);

impl CellAdapter {
    pub(crate) fn new(base: AdapterBase, row: usize, column: usize) -> Self {
        Self { base, row, column }
    }

    /// The `(row, column)` this adapter stands for, unchecked.
    pub fn position(&self) -> (usize, usize) {
        (self.row, self.column)
    }

    fn try_snapshot(&self) -> Result<CellSnapshot> {
        let (row, column) = (self.row, self.column);
        self.base.peer().query(move |table| {
            if !table.is_row_valid(row) {
                return Err(BridgeError::row_out_of_range(row, table.row_count()));
            }
            if !table.is_index_valid(column) {
                return Err(BridgeError::column_out_of_range(column, table.column_count()));
            }
            Ok(CellSnapshot {
                text: table.cell_text(row, column),
                header: table.column_header(column),
            })
        })
    }

    fn snapshot(&self, what: &'static str) -> Option<CellSnapshot> {
        degrade(self.try_snapshot(), self.role(), self.key(), what)
    }

    /// Row index, validated against both live counts.
    pub fn row_index(&self) -> Option<usize> {
        self.snapshot("row_index").map(|_| self.row)
    }

    /// Column index, validated against both live counts.
    pub fn column_index(&self) -> Option<usize> {
        self.snapshot("column_index").map(|_| self.column)
    }

    /// Text content of the cell.
    pub fn try_text(&self) -> Result<Option<String>> {
        self.try_snapshot().map(|snapshot| snapshot.text)
    }

    /// Text content of the cell, if available.
    pub fn text(&self) -> Option<String> {
        self.snapshot("text").and_then(|snapshot| snapshot.text)
    }

    /// Header text of the cell's column.
    pub fn header_text(&self) -> Option<String> {
        self.snapshot("header_text").and_then(|snapshot| snapshot.header)
    }
}

impl AdapterNode for CellAdapter {
    fn key(&self) -> NodeKey {
        self.base.key()
    }

    fn identity(&self) -> NodeIdentity {
        self.base.identity()
    }

    fn role(&self) -> AccessibleRole {
        AccessibleRole::Cell
    }

    fn parent(&self) -> Option<Arc<dyn AdapterNode>> {
        self.base.parent()
    }

    fn children(&self) -> Vec<Arc<dyn AdapterNode>> {
        Vec::new()
    }

    fn child_count(&self) -> Option<usize> {
        self.snapshot("child_count").map(|_| 0)
    }

    fn is_valid(&self) -> bool {
        self.base.is_valid()
    }

    fn label(&self) -> Option<String> {
        self.text()
    }

    fn index_in_parent(&self) -> Option<usize> {
        self.column_index()
    }

    fn role_attribute(&self, attribute: AxAttribute) -> AxValue {
        match attribute {
            AxAttribute::RowIndex => index_value(self.row_index()),
            AxAttribute::ColumnIndex => index_value(self.column_index()),
            AxAttribute::Header => AxValue::from(self.header_text()),
            AxAttribute::ColumnSpan => count_value(self.column_index().map(|_| 1)),
            AxAttribute::Value => AxValue::from(self.text()),
            _ => AxValue::None,
        }
    }

    fn build_accessible_node(&self) -> Option<Node> {
        let snapshot = self.snapshot("build_accessible_node")?;

        let mut node = Node::new(self.role().to_accesskit_role());
        node.set_row_index(self.row);
        node.set_column_index(self.column);
        if let Some(text) = snapshot.text {
            node.set_label(text);
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessibility::AdapterTree;
    use crate::model::SimpleAccessibleTable;
    use horizon_axbridge_core::ToolkitContext;

    #[test]
    fn test_cell_tracks_both_counts() {
        let context = ToolkitContext::new().unwrap();
        let table = Arc::new(SimpleAccessibleTable::new("t", ["A", "B"]));
        table.append_row(["a", "b"]);
        table.bind_to(&context);
        let tree = AdapterTree::new(context.clone());
        let cell = tree.attach_table(&table).cell(0, 1).unwrap();

        assert_eq!(cell.text().as_deref(), Some("b"));
        assert_eq!(cell.header_text().as_deref(), Some("B"));
        assert_eq!(cell.attribute(AxAttribute::Value), AxValue::Text("b".into()));

        let remover = table.clone();
        context.invoke_and_wait(move || remover.remove_column(1)).unwrap();
        assert_eq!(cell.column_index(), None);
        assert!(matches!(
            cell.try_text(),
            Err(BridgeError::IndexOutOfRange { .. })
        ));
        assert!(cell.is_valid());
        context.stop_and_join();
    }
}
