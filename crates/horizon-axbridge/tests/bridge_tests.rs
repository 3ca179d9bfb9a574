//! Tests for the accessibility bridge and adapter tree.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use accesskit::{ActivationHandler, NodeId, Role};
use horizon_axbridge::accessibility::{
    AccessibilityBridge, AccessibleRole, AdapterNode, AxAttribute, AxValue, NodeIdentity,
};
use horizon_axbridge::model::{AccessibleTable, SimpleAccessibleTable};
use horizon_axbridge::BridgeConfig;

fn bridge() -> AccessibilityBridge {
    AccessibilityBridge::with_config(&BridgeConfig::default()).unwrap()
}

fn node_id(node: &dyn AdapterNode) -> NodeId {
    NodeId(node.key().as_raw())
}

#[test]
fn test_query_dispatches_by_node_id() {
    let bridge = bridge();
    let table = Arc::new(SimpleAccessibleTable::new("Fleet", ["Ship", "Crew"]));
    table.append_row(["Argo", "50"]);
    table.bind_to(bridge.context());

    let adapter = bridge.attach_table(&table);
    let column = adapter.column(1).unwrap();
    let id = node_id(column.as_ref());

    assert_eq!(bridge.query(id, AxAttribute::Role), AxValue::Role(AccessibleRole::Column));
    assert_eq!(bridge.query(id, AxAttribute::ColumnIndex), AxValue::Index(1));
    assert_eq!(bridge.query(id, AxAttribute::Label), AxValue::Text("Crew".into()));
    assert_eq!(bridge.query(id, AxAttribute::Valid), AxValue::Bool(true));
    assert_eq!(
        bridge.query(id, AxAttribute::Parent),
        AxValue::Node(node_id(adapter.as_ref()))
    );

    let table_id = node_id(adapter.as_ref());
    assert_eq!(bridge.query(table_id, AxAttribute::ColumnCount), AxValue::Count(2));
    assert_eq!(bridge.query(table_id, AxAttribute::RowCount), AxValue::Count(1));
    assert_eq!(bridge.query(table_id, AxAttribute::ChildCount), AxValue::Count(3));
    assert_eq!(bridge.query(table_id, AxAttribute::Label), AxValue::Text("Fleet".into()));
    assert_eq!(bridge.query(table_id, AxAttribute::Header), AxValue::None);

    bridge.context().stop_and_join();
}

#[test]
fn test_query_after_table_dropped() {
    let bridge = bridge();
    let table = Arc::new(SimpleAccessibleTable::new("Fleet", ["Ship"]));
    table.bind_to(bridge.context());
    let column = bridge.attach_table(&table).column(0).unwrap();
    let id = node_id(column.as_ref());

    drop(table);
    assert_eq!(bridge.query(id, AxAttribute::ColumnIndex), AxValue::None);
    assert_eq!(bridge.query(id, AxAttribute::Parent), AxValue::None);
    assert_eq!(bridge.query(id, AxAttribute::Valid), AxValue::Bool(false));
    assert_eq!(bridge.query(id, AxAttribute::Role), AxValue::Role(AccessibleRole::Column));

    assert_eq!(bridge.tree().prune_invalid(), 2);
    assert_eq!(bridge.query(id, AxAttribute::Role), AxValue::None);

    bridge.context().stop_and_join();
}

#[test]
fn test_initial_tree_serializes_table() {
    let mut bridge = bridge();
    let table = Arc::new(SimpleAccessibleTable::new("Fleet", ["Ship", "Crew"]));
    table.append_row(["Argo", "50"]);
    table.append_row(["Nautilus", "12"]);
    table.bind_to(bridge.context());
    let adapter = bridge.attach_table(&table);

    let update = bridge.request_initial_tree().unwrap();
    let root = node_id(adapter.as_ref());
    assert_eq!(update.focus, root);
    assert_eq!(update.nodes[0].0, root);

    let roles: Vec<Role> = update.nodes.iter().map(|(_, node)| node.role()).collect();
    assert_eq!(roles.iter().filter(|r| **r == Role::Row).count(), 2);
    assert_eq!(roles.iter().filter(|r| **r == Role::Cell).count(), 4);
    assert_eq!(roles.iter().filter(|r| **r == Role::GenericContainer).count(), 2);

    bridge.context().stop_and_join();
}

#[test]
fn test_shrunk_table_update_omits_missing_columns() {
    let bridge = bridge();
    let table = Arc::new(SimpleAccessibleTable::new("t", ["A", "B", "C"]));
    table.bind_to(bridge.context());
    let adapter = bridge.attach_table(&table);
    let third = adapter.column(2).unwrap();

    let shrinker = table.clone();
    bridge
        .context()
        .invoke_and_wait(move || shrinker.set_column_count(1))
        .unwrap();

    let update = bridge.build_tree_update(adapter.key()).unwrap();
    assert_eq!(update.nodes.len(), 2);
    assert!(bridge.build_node_update(third.key()).is_none());

    // The adapter stays in the tree and comes back when the table grows.
    let grower = table.clone();
    bridge
        .context()
        .invoke_and_wait(move || grower.set_column_count(3))
        .unwrap();
    assert_eq!(third.column_number_in_table(), Some(2));
    assert!(bridge.build_node_update(third.key()).is_some());

    bridge.context().stop_and_join();
}

#[test]
fn test_cell_parent_is_row() {
    let bridge = bridge();
    let table = Arc::new(SimpleAccessibleTable::new("t", ["A", "B"]));
    table.append_row(["1", "2"]);
    table.bind_to(bridge.context());
    let adapter = bridge.attach_table(&table);

    let cell = adapter.cell(0, 1).unwrap();
    let parent = cell.parent().unwrap();
    assert_eq!(parent.role(), AccessibleRole::Row);
    assert_eq!(
        parent.identity(),
        NodeIdentity::Row {
            table: adapter.key(),
            row: 0
        }
    );
    assert_eq!(cell.index_in_parent(), Some(1));

    bridge.context().stop_and_join();
}

#[test]
fn test_child_count_creates_no_adapters() {
    let bridge = bridge();
    let table = Arc::new(SimpleAccessibleTable::new("Fleet", ["Ship", "Crew"]));
    table.append_row(["Argo", "50"]);
    table.append_row(["Nautilus", "12"]);
    table.append_row(["Endurance", "28"]);
    table.bind_to(bridge.context());

    let adapter = bridge.attach_table(&table);
    let column = adapter.column(0).unwrap();
    assert_eq!(bridge.tree().len(), 2);

    assert_eq!(
        bridge.query(node_id(adapter.as_ref()), AxAttribute::ChildCount),
        AxValue::Count(5)
    );
    assert_eq!(
        bridge.query(node_id(column.as_ref()), AxAttribute::ChildCount),
        AxValue::Count(3)
    );
    assert_eq!(bridge.tree().len(), 2);

    bridge.context().stop_and_join();
}

/// Loses its last row right after the first time anyone asks for the count.
struct ShrinkingTable {
    reads: AtomicUsize,
}

impl AccessibleTable for ShrinkingTable {
    fn column_count(&self) -> usize {
        2
    }

    fn row_count(&self) -> usize {
        if self.reads.fetch_add(1, Ordering::SeqCst) == 0 { 2 } else { 1 }
    }

    fn column_header(&self, column: usize) -> Option<String> {
        Some(format!("C{column}"))
    }
}

#[test]
fn test_tree_update_drops_rows_removed_mid_build() {
    let bridge = bridge();
    let table = Arc::new(ShrinkingTable {
        reads: AtomicUsize::new(0),
    });
    let adapter = bridge.attach_table(&table);

    let update = bridge.build_tree_update(adapter.key()).unwrap();
    let emitted: HashSet<NodeId> = update.nodes.iter().map(|(id, _)| *id).collect();
    for (id, node) in &update.nodes {
        for child in node.children() {
            assert!(emitted.contains(child), "{id:?} lists missing child {child:?}");
        }
    }

    // Table keeps one row and both columns.
    let (_, root) = &update.nodes[0];
    assert_eq!(root.role(), Role::Table);
    assert_eq!(root.children().len(), 3);
    assert!(adapter.row(1).is_none());

    bridge.context().stop_and_join();
}
