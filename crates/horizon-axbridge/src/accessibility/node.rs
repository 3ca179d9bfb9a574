//! The adapter node contract shared by every table element kind.

use std::sync::{Arc, Weak};

use accesskit::Node;
use horizon_axbridge_core::{BridgeError, axbridge_debug, axbridge_warn};
use slotmap::new_key_type;

use super::attribute::{AxAttribute, AxValue, count_value};
use super::peer::PeerAccessor;
use super::role::AccessibleRole;
use super::tree::TreeShared;
use super::node_key_to_node_id;

new_key_type! {
    /// Identifies an adapter in its [`AdapterTree`](super::AdapterTree).
    ///
    /// Keys stay stable for the adapter's lifetime and are never reused for a
    /// different adapter while any copy of the old key is around to be
    /// confused with it (slotmap versions its slots).
    pub struct NodeKey;
}

impl NodeKey {
    /// Convert the key to a raw `u64`, e.g. for an AccessKit `NodeId`.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Rebuild a key from [`as_raw`](Self::as_raw) output.
    ///
    /// This does not check that the key exists in any tree.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// What an adapter stands for. Used to find an existing adapter before
/// creating a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeIdentity {
    /// A table; carries its own key.
    Table(NodeKey),
    /// A row of the table with key `table`.
    Row { table: NodeKey, row: usize },
    /// A column of the table with key `table`.
    Column { table: NodeKey, column: usize },
    /// A cell of the table with key `table`.
    Cell {
        table: NodeKey,
        row: usize,
        column: usize,
    },
}

impl NodeIdentity {
    /// Key of the table this identity belongs to.
    pub fn table(&self) -> NodeKey {
        match *self {
            Self::Table(table)
            | Self::Row { table, .. }
            | Self::Column { table, .. }
            | Self::Cell { table, .. } => table,
        }
    }
}

/// Capability set every platform-accessibility adapter implements.
///
/// Implementations are read-only projections of toolkit state. Nothing here
/// mutates the toolkit, and nothing is cached beyond the adapter's identity:
/// labels, counts and children are recomputed on every call, because the
/// table may have changed since the last one.
///
/// Every accessor degrades to `None`, an empty `Vec`, or [`AxValue::None`]
/// when the table is gone, an index no longer fits, or the toolkit context
/// does not answer in time.
pub trait AdapterNode: Send + Sync {
    /// This adapter's key in its tree.
    fn key(&self) -> NodeKey;

    /// What this adapter stands for.
    fn identity(&self) -> NodeIdentity;

    /// The fixed role of this adapter kind.
    fn role(&self) -> AccessibleRole;

    /// The parent adapter, looked up through the tree.
    ///
    /// Returns `None` for a table (the root of its subtree), or when the
    /// parent is gone or inert.
    fn parent(&self) -> Option<Arc<dyn AdapterNode>>;

    /// A fresh snapshot of the child adapters.
    fn children(&self) -> Vec<Arc<dyn AdapterNode>>;

    /// Children as serialized into an AccessKit tree, where every node has
    /// exactly one parent. Defaults to [`children`](Self::children).
    fn tree_children(&self) -> Vec<Arc<dyn AdapterNode>> {
        self.children()
    }

    /// Number of children, read through the peer without creating any
    /// child adapters.
    fn child_count(&self) -> Option<usize>;

    /// Whether the underlying toolkit table still resolves.
    ///
    /// Goes from `true` to `false` at most once and never back.
    fn is_valid(&self) -> bool;

    /// The accessible name, recomputed on each call.
    fn label(&self) -> Option<String> {
        None
    }

    /// Position of this adapter among its parent's children of the same
    /// role (a column's index among the columns, a cell's among the row's
    /// cells).
    fn index_in_parent(&self) -> Option<usize> {
        None
    }

    /// Answer role-specific attributes. Called by
    /// [`attribute`](Self::attribute) for anything it does not handle itself.
    fn role_attribute(&self, _attribute: AxAttribute) -> AxValue {
        AxValue::None
    }

    /// Answer one attribute request from the native runtime.
    fn attribute(&self, attribute: AxAttribute) -> AxValue {
        match attribute {
            AxAttribute::Role => AxValue::Role(self.role()),
            AxAttribute::Valid => AxValue::Bool(self.is_valid()),
            AxAttribute::Label => AxValue::from(self.label()),
            AxAttribute::Parent => self
                .parent()
                .map(|parent| AxValue::Node(node_key_to_node_id(parent.key())))
                .unwrap_or(AxValue::None),
            AxAttribute::Children => AxValue::Nodes(
                self.children()
                    .iter()
                    .map(|child| node_key_to_node_id(child.key()))
                    .collect(),
            ),
            AxAttribute::ChildCount => count_value(self.child_count()),
            AxAttribute::Index => self
                .index_in_parent()
                .map(AxValue::Index)
                .unwrap_or(AxValue::None),
            other => self.role_attribute(other),
        }
    }

    /// Translate this adapter into an AccessKit node.
    ///
    /// Returns `None` when the adapter is currently unavailable.
    fn build_accessible_node(&self) -> Option<Node>;
}

/// State and helpers common to all adapter kinds.
///
/// Adapters compose this rather than inheriting behavior: it carries the
/// identity, the non-owning parent key, the shared peer accessor and a weak
/// handle back to the tree for lookups.
#[derive(Debug)]
pub(crate) struct AdapterBase {
    key: NodeKey,
    identity: NodeIdentity,
    parent: Option<NodeKey>,
    peer: Arc<PeerAccessor>,
    tree: Weak<TreeShared>,
}

impl AdapterBase {
    pub(crate) fn new(
        key: NodeKey,
        identity: NodeIdentity,
        parent: Option<NodeKey>,
        peer: Arc<PeerAccessor>,
        tree: Weak<TreeShared>,
    ) -> Self {
        Self {
            key,
            identity,
            parent,
            peer,
            tree,
        }
    }

    pub(crate) fn key(&self) -> NodeKey {
        self.key
    }

    pub(crate) fn identity(&self) -> NodeIdentity {
        self.identity
    }

    pub(crate) fn table_key(&self) -> NodeKey {
        self.identity.table()
    }

    pub(crate) fn peer(&self) -> &Arc<PeerAccessor> {
        &self.peer
    }

    pub(crate) fn tree(&self) -> Option<Arc<TreeShared>> {
        self.tree.upgrade()
    }

    pub(crate) fn tree_weak(&self) -> Weak<TreeShared> {
        self.tree.clone()
    }

    /// Weak parent lookup: resolve the parent key through the tree.
    pub(crate) fn parent(&self) -> Option<Arc<dyn AdapterNode>> {
        let parent = self.parent?;
        if self.peer.is_invalidated() {
            return None;
        }
        self.tree()?.get(parent).map(|adapter| adapter.as_node())
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.peer.is_valid()
    }
}

/// Turn a failed query into the "unavailable" answer the native side expects,
/// logging why.
pub(crate) fn degrade<T>(
    result: Result<T, BridgeError>,
    role: AccessibleRole,
    key: NodeKey,
    what: &'static str,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) if err.is_context_failure() => {
            axbridge_warn!(%role, node = key.as_raw(), query = what, error = %err, "query unavailable");
            None
        }
        Err(err) => {
            axbridge_debug!(%role, node = key.as_raw(), query = what, error = %err, "query unavailable");
            None
        }
    }
}
