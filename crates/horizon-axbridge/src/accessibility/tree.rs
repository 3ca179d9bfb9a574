//! Arena of lazily created adapters.
//!
//! The tree owns every adapter. Adapters refer to each other only by
//! [`NodeKey`] and reach the tree through a `Weak`, so parent and child never
//! hold each other alive.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use horizon_axbridge_core::ToolkitContext;
use horizon_axbridge_core::logging::targets;
use parking_lot::RwLock;
use slotmap::SlotMap;

use super::cell::CellAdapter;
use super::column::ColumnAdapter;
use super::node::{AdapterBase, AdapterNode, NodeIdentity, NodeKey};
use super::peer::PeerAccessor;
use super::row::RowAdapter;
use super::table::TableAdapter;
use crate::model::AccessibleTable;

/// Any adapter kind stored in the tree.
#[derive(Debug, Clone)]
pub enum AnyAdapter {
    /// A table adapter.
    Table(Arc<TableAdapter>),
    /// A row adapter.
    Row(Arc<RowAdapter>),
    /// A column adapter.
    Column(Arc<ColumnAdapter>),
    /// A cell adapter.
    Cell(Arc<CellAdapter>),
}

impl AnyAdapter {
    /// View the adapter through the common contract.
    pub fn as_node(&self) -> Arc<dyn AdapterNode> {
        match self {
            Self::Table(adapter) => adapter.clone(),
            Self::Row(adapter) => adapter.clone(),
            Self::Column(adapter) => adapter.clone(),
            Self::Cell(adapter) => adapter.clone(),
        }
    }

    /// The table adapter, if this is one.
    pub fn as_table(&self) -> Option<&Arc<TableAdapter>> {
        match self {
            Self::Table(adapter) => Some(adapter),
            _ => None,
        }
    }

    /// The column adapter, if this is one.
    pub fn as_column(&self) -> Option<&Arc<ColumnAdapter>> {
        match self {
            Self::Column(adapter) => Some(adapter),
            _ => None,
        }
    }

    fn identity(&self) -> NodeIdentity {
        match self {
            Self::Table(adapter) => adapter.identity(),
            Self::Row(adapter) => adapter.identity(),
            Self::Column(adapter) => adapter.identity(),
            Self::Cell(adapter) => adapter.identity(),
        }
    }
}

/// Conversion between a concrete adapter and [`AnyAdapter`].
pub(crate) trait TreeAdapter: Sized {
    fn from_any(adapter: &AnyAdapter) -> Option<Arc<Self>>;
    fn into_any(adapter: Arc<Self>) -> AnyAdapter;
}

macro_rules! tree_adapter {
    ($ty:ty, $variant:ident) => {
        impl TreeAdapter for $ty {
            fn from_any(adapter: &AnyAdapter) -> Option<Arc<Self>> {
                match adapter {
                    AnyAdapter::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }

            fn into_any(adapter: Arc<Self>) -> AnyAdapter {
                AnyAdapter::$variant(adapter)
            }
        }
    };
}

tree_adapter!(TableAdapter, Table);
tree_adapter!(RowAdapter, Row);
tree_adapter!(ColumnAdapter, Column);
tree_adapter!(CellAdapter, Cell);

/// State shared by the tree handle and, weakly, by every adapter.
pub(crate) struct TreeShared {
    context: ToolkitContext,
    nodes: RwLock<SlotMap<NodeKey, AnyAdapter>>,
    identities: RwLock<HashMap<NodeIdentity, NodeKey>>,
}

impl std::fmt::Debug for TreeShared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeShared")
            .field("nodes", &self.nodes.read().len())
            .finish()
    }
}

impl TreeShared {
    pub(crate) fn get(&self, key: NodeKey) -> Option<AnyAdapter> {
        self.nodes.read().get(key).cloned()
    }

    fn lookup<A: TreeAdapter>(
        nodes: &SlotMap<NodeKey, AnyAdapter>,
        identities: &HashMap<NodeIdentity, NodeKey>,
        identity: &NodeIdentity,
    ) -> Option<Arc<A>> {
        identities
            .get(identity)
            .and_then(|key| nodes.get(*key))
            .and_then(A::from_any)
    }

    /// Return the adapter for `identity`, creating it on first request.
    fn get_or_insert<A, F>(self: &Arc<Self>, identity: NodeIdentity, make: F) -> Arc<A>
    where
        A: TreeAdapter,
        F: FnOnce(NodeKey, Weak<TreeShared>) -> A,
    {
        {
            let nodes = self.nodes.read();
            let identities = self.identities.read();
            if let Some(existing) = Self::lookup(&nodes, &identities, &identity) {
                return existing;
            }
        }

        let mut nodes = self.nodes.write();
        let mut identities = self.identities.write();
        // Another thread may have created it between the two locks.
        if let Some(existing) = Self::lookup(&nodes, &identities, &identity) {
            return existing;
        }

        let tree = Arc::downgrade(self);
        let mut created = None;
        let key = nodes.insert_with_key(|key| {
            let adapter = Arc::new(make(key, tree));
            created = Some(adapter.clone());
            A::into_any(adapter)
        });
        identities.insert(identity, key);
        tracing::trace!(target: targets::BRIDGE, node = key.as_raw(), ?identity, "adapter created");
        created.expect("insert_with_key runs the constructor exactly once")
    }

    pub(crate) fn attach_table<T>(self: &Arc<Self>, table: &Arc<T>) -> Arc<TableAdapter>
    where
        T: AccessibleTable + 'static,
    {
        {
            let nodes = self.nodes.read();
            if let Some(existing) = nodes
                .values()
                .filter_map(AnyAdapter::as_table)
                .find(|adapter| adapter.peer().refers_to(table) && !adapter.peer().is_invalidated())
            {
                return existing.clone();
            }
        }

        let peer = Arc::new(PeerAccessor::new(table, self.context.clone()));
        let mut nodes = self.nodes.write();
        let mut identities = self.identities.write();
        if let Some(existing) = nodes
            .values()
            .filter_map(AnyAdapter::as_table)
            .find(|adapter| adapter.peer().refers_to(table) && !adapter.peer().is_invalidated())
        {
            return existing.clone();
        }

        let tree = Arc::downgrade(self);
        let mut created = None;
        let key = nodes.insert_with_key(|key| {
            let base = AdapterBase::new(key, NodeIdentity::Table(key), None, peer, tree);
            let adapter = Arc::new(TableAdapter::new(base));
            created = Some(adapter.clone());
            AnyAdapter::Table(adapter)
        });
        identities.insert(NodeIdentity::Table(key), key);
        tracing::debug!(target: targets::BRIDGE, node = key.as_raw(), "table attached");
        created.expect("insert_with_key runs the constructor exactly once")
    }

    pub(crate) fn row(
        self: &Arc<Self>,
        table: NodeKey,
        peer: &Arc<PeerAccessor>,
        row: usize,
    ) -> Arc<RowAdapter> {
        let identity = NodeIdentity::Row { table, row };
        self.get_or_insert(identity, |key, tree| {
            RowAdapter::new(
                AdapterBase::new(key, identity, Some(table), peer.clone(), tree),
                row,
            )
        })
    }

    pub(crate) fn column(
        self: &Arc<Self>,
        table: NodeKey,
        peer: &Arc<PeerAccessor>,
        column: usize,
    ) -> Arc<ColumnAdapter> {
        let identity = NodeIdentity::Column { table, column };
        self.get_or_insert(identity, |key, tree| {
            ColumnAdapter::new(
                AdapterBase::new(key, identity, Some(table), peer.clone(), tree),
                column,
            )
        })
    }

    pub(crate) fn cell(
        self: &Arc<Self>,
        table: NodeKey,
        peer: &Arc<PeerAccessor>,
        row: usize,
        column: usize,
    ) -> Arc<CellAdapter> {
        // A cell's parent is its row; make sure the row exists first.
        let parent = self.row(table, peer, row).key();
        let identity = NodeIdentity::Cell { table, row, column };
        self.get_or_insert(identity, |key, tree| {
            CellAdapter::new(
                AdapterBase::new(key, identity, Some(parent), peer.clone(), tree),
                row,
                column,
            )
        })
    }

    fn remove_table(&self, table: NodeKey) -> usize {
        let mut nodes = self.nodes.write();
        let mut identities = self.identities.write();
        let doomed: Vec<NodeKey> = nodes
            .iter()
            .filter(|(_, adapter)| adapter.identity().table() == table)
            .map(|(key, _)| key)
            .collect();
        for key in &doomed {
            if let Some(adapter) = nodes.remove(*key) {
                identities.remove(&adapter.identity());
            }
        }
        doomed.len()
    }
}

/// Registry of the adapters exposed to the native runtime.
///
/// Adapters are created on demand: attaching a table creates only the table
/// adapter, and row, column and cell adapters appear the first time someone
/// asks for them. Asking again returns the same adapter.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use horizon_axbridge::accessibility::{AdapterNode, AdapterTree};
/// use horizon_axbridge::model::SimpleAccessibleTable;
/// use horizon_axbridge_core::ToolkitContext;
///
/// let context = ToolkitContext::new()?;
/// let table = Arc::new(SimpleAccessibleTable::new("Employees", ["Name", "Salary"]));
/// table.bind_to(&context);
///
/// let tree = AdapterTree::new(context);
/// let adapter = tree.attach_table(&table);
/// for column in adapter.columns() {
///     println!("{:?} {:?}", column.column_number_in_table(), column.header_text());
/// }
/// # Ok::<(), horizon_axbridge_core::BridgeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct AdapterTree {
    shared: Arc<TreeShared>,
}

impl AdapterTree {
    /// Create an empty tree whose adapters query through `context`.
    pub fn new(context: ToolkitContext) -> Self {
        Self {
            shared: Arc::new(TreeShared {
                context,
                nodes: RwLock::new(SlotMap::with_key()),
                identities: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The toolkit context adapters hand their queries to.
    pub fn context(&self) -> &ToolkitContext {
        &self.shared.context
    }

    /// Represent `table` in the tree.
    ///
    /// Returns the existing adapter if this table is already attached and
    /// still live.
    pub fn attach_table<T>(&self, table: &Arc<T>) -> Arc<TableAdapter>
    where
        T: AccessibleTable + 'static,
    {
        self.shared.attach_table(table)
    }

    /// Look up an adapter through the common contract.
    pub fn get(&self, key: NodeKey) -> Option<Arc<dyn AdapterNode>> {
        self.shared.get(key).map(|adapter| adapter.as_node())
    }

    /// Look up an adapter with its concrete kind.
    pub fn get_adapter(&self, key: NodeKey) -> Option<AnyAdapter> {
        self.shared.get(key)
    }

    /// All attached table adapters.
    pub fn tables(&self) -> Vec<Arc<TableAdapter>> {
        self.shared
            .nodes
            .read()
            .values()
            .filter_map(AnyAdapter::as_table)
            .cloned()
            .collect()
    }

    /// Number of adapters currently materialized.
    pub fn len(&self) -> usize {
        self.shared.nodes.read().len()
    }

    /// Returns `true` if no adapter exists.
    pub fn is_empty(&self) -> bool {
        self.shared.nodes.read().is_empty()
    }

    /// Remove a table adapter and every adapter belonging to it.
    ///
    /// Returns the number of adapters removed.
    pub fn detach_table(&self, table: NodeKey) -> usize {
        let removed = self.shared.remove_table(table);
        if removed > 0 {
            tracing::debug!(target: targets::BRIDGE, node = table.as_raw(), removed, "table detached");
        }
        removed
    }

    /// Drop the adapters of every table whose peer no longer resolves.
    ///
    /// Adapters whose index is merely out of range are kept, since the table
    /// may grow back. Returns the number of adapters removed.
    pub fn prune_invalid(&self) -> usize {
        self.tables()
            .into_iter()
            .filter(|table| !table.is_valid())
            .map(|table| self.detach_table(table.key()))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SimpleAccessibleTable;
    use horizon_axbridge_core::BridgeConfig;
    use std::time::Duration;

    fn setup() -> (ToolkitContext, Arc<SimpleAccessibleTable>) {
        let config = BridgeConfig::builder()
            .handoff_timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let context = ToolkitContext::with_config(&config).unwrap();
        let table = Arc::new(SimpleAccessibleTable::new("t", ["A", "B", "C"]));
        table.append_row(["a1", "b1", "c1"]);
        table.bind_to(&context);
        (context, table)
    }

    #[test]
    fn test_attach_is_idempotent() {
        let (context, table) = setup();
        let tree = AdapterTree::new(context.clone());

        let first = tree.attach_table(&table);
        let second = tree.attach_table(&table);
        assert_eq!(first.key(), second.key());
        assert_eq!(tree.len(), 1);
        context.stop_and_join();
    }

    #[test]
    fn test_adapters_created_lazily_and_shared() {
        let (context, table) = setup();
        let tree = AdapterTree::new(context.clone());
        let adapter = tree.attach_table(&table);
        assert_eq!(tree.len(), 1);

        let column = adapter.column(1).unwrap();
        assert_eq!(tree.len(), 2);
        let again = adapter.column(1).unwrap();
        assert_eq!(column.key(), again.key());
        assert_eq!(tree.len(), 2);

        assert!(tree.get(column.key()).is_some());
        assert!(tree.get_adapter(column.key()).unwrap().as_column().is_some());
        context.stop_and_join();
    }

    #[test]
    fn test_cell_creates_parent_row() {
        let (context, table) = setup();
        let tree = AdapterTree::new(context.clone());
        let adapter = tree.attach_table(&table);

        let column = adapter.column(2).unwrap();
        let cells = column.cells();
        assert_eq!(cells.len(), 1);

        let parent = cells[0].parent().unwrap();
        assert_eq!(parent.identity(), NodeIdentity::Row { table: adapter.key(), row: 0 });
        context.stop_and_join();
    }

    #[test]
    fn test_prune_removes_stale_tables_only() {
        let (context, table) = setup();
        let other = Arc::new(SimpleAccessibleTable::new("other", ["X"]));
        let tree = AdapterTree::new(context.clone());

        let adapter = tree.attach_table(&table);
        adapter.columns();
        let kept = tree.attach_table(&other);
        let before = tree.len();
        assert_eq!(before, 5);

        drop(table);
        assert_eq!(tree.prune_invalid(), 4);
        assert_eq!(tree.len(), 1);
        assert!(tree.get(kept.key()).is_some());
        assert!(tree.get(adapter.key()).is_none());
        context.stop_and_join();
    }

    #[test]
    fn test_detach_table() {
        let (context, table) = setup();
        let tree = AdapterTree::new(context.clone());
        let adapter = tree.attach_table(&table);
        adapter.rows();

        assert_eq!(tree.detach_table(adapter.key()), 2);
        assert!(tree.is_empty());
        assert_eq!(tree.detach_table(adapter.key()), 0);
        context.stop_and_join();
    }
}
