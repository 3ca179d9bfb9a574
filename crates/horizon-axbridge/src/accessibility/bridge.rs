//! Entry point for the native accessibility runtime.

use std::collections::HashSet;
use std::sync::Arc;

use accesskit::{
    ActionHandler, ActionRequest, ActivationHandler, Node, NodeId, Tree, TreeUpdate,
};
use horizon_axbridge_core::logging::span_names;
use horizon_axbridge_core::{
    BridgeConfig, PerfSpan, Result, ToolkitContext, axbridge_debug, axbridge_info, axbridge_trace,
};
use parking_lot::Mutex;

use super::attribute::{AxAttribute, AxValue};
use super::node::{AdapterNode, NodeKey};
use super::table::TableAdapter;
use super::tree::AdapterTree;
use super::{node_id_to_node_key, node_key_to_node_id};
use crate::model::AccessibleTable;

/// Answers the native accessibility runtime on behalf of an [`AdapterTree`].
///
/// The bridge resolves AccessKit node ids to adapters, dispatches attribute
/// queries and serializes adapters into [`TreeUpdate`]s. It is the
/// [`ActivationHandler`] handed to a platform adapter: the first table
/// attached becomes the root of the initial tree.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use horizon_axbridge::accessibility::{AccessibilityBridge, AdapterNode};
/// use horizon_axbridge::model::SimpleAccessibleTable;
/// use horizon_axbridge_core::BridgeConfig;
///
/// let bridge = AccessibilityBridge::with_config(&BridgeConfig::default())?;
/// let table = Arc::new(SimpleAccessibleTable::new("Employees", ["Name", "Salary"]));
/// table.bind_to(bridge.context());
///
/// let adapter = bridge.attach_table(&table);
/// let update = bridge.build_tree_update(adapter.key()).expect("table is live");
/// println!("{} nodes", update.nodes.len());
/// # Ok::<(), horizon_axbridge_core::BridgeError>(())
/// ```
#[derive(Debug)]
pub struct AccessibilityBridge {
    tree: AdapterTree,
    root: Mutex<Option<NodeKey>>,
}

impl AccessibilityBridge {
    /// Create a bridge over an existing tree.
    pub fn new(tree: AdapterTree) -> Self {
        Self {
            tree,
            root: Mutex::new(None),
        }
    }

    /// Start a toolkit context from `config` and create a bridge on it.
    pub fn with_config(config: &BridgeConfig) -> Result<Self> {
        let context = ToolkitContext::with_config(config)?;
        Ok(Self::new(AdapterTree::new(context)))
    }

    /// The adapter tree.
    pub fn tree(&self) -> &AdapterTree {
        &self.tree
    }

    /// The toolkit context queries are handed to.
    pub fn context(&self) -> &ToolkitContext {
        self.tree.context()
    }

    /// Attach a table. The first table attached becomes the root.
    pub fn attach_table<T>(&self, table: &Arc<T>) -> Arc<TableAdapter>
    where
        T: AccessibleTable + 'static,
    {
        let adapter = self.tree.attach_table(table);
        let mut root = self.root.lock();
        let root_gone = root.is_none_or(|key| self.tree.get(key).is_none());
        if root_gone {
            axbridge_info!(node = adapter.key().as_raw(), "table became the bridge root");
            *root = Some(adapter.key());
        }
        adapter
    }

    /// Key of the root table, if any is attached.
    pub fn root(&self) -> Option<NodeKey> {
        let root = (*self.root.lock())?;
        self.tree.get(root).map(|_| root)
    }

    /// Answer one attribute query for the node with AccessKit id `node`.
    ///
    /// Unknown nodes, inert adapters and attributes the node's role does not
    /// carry all answer [`AxValue::None`].
    pub fn query(&self, node: NodeId, attribute: AxAttribute) -> AxValue {
        let _span = PerfSpan::new(span_names::QUERY);
        let Some(adapter) = self.tree.get(node_id_to_node_key(node)) else {
            axbridge_debug!(node = node.0, ?attribute, "query for unknown node");
            return AxValue::None;
        };
        let value = adapter.attribute(attribute);
        axbridge_trace!(node = node.0, role = %adapter.role(), ?attribute, ?value, "query answered");
        value
    }

    /// Serialize the subtree rooted at `root` into a full tree update.
    ///
    /// Returns `None` if the root itself is unavailable. Unavailable
    /// descendants are left out along with their subtrees.
    pub fn build_tree_update(&self, root: NodeKey) -> Option<TreeUpdate> {
        let _span = PerfSpan::new(span_names::TREE_UPDATE);
        let root_id = node_key_to_node_id(root);
        let mut nodes = Vec::new();
        let mut stack = vec![root];

        while let Some(key) = stack.pop() {
            let Some(adapter) = self.tree.get(key) else {
                continue;
            };
            let Some(node) = adapter.build_accessible_node() else {
                continue;
            };
            // Push in reverse so children come out in order.
            for child in node.children().iter().rev() {
                stack.push(node_id_to_node_key(*child));
            }
            nodes.push((node_key_to_node_id(key), node));
        }

        if nodes.first().is_none_or(|(id, _)| *id != root_id) {
            axbridge_debug!(node = root_id.0, "root unavailable, no tree update");
            return None;
        }
        drop_dangling_children(&mut nodes);
        axbridge_debug!(node = root_id.0, count = nodes.len(), "tree update built");

        Some(TreeUpdate {
            nodes,
            tree: Some(Tree::new(root_id)),
            focus: root_id,
        })
    }

    /// Serialize a single node for an incremental update.
    pub fn build_node_update(&self, key: NodeKey) -> Option<TreeUpdate> {
        let node = self.tree.get(key)?.build_accessible_node()?;
        let id = node_key_to_node_id(key);
        Some(TreeUpdate {
            nodes: vec![(id, node)],
            tree: None,
            focus: self.root().map(node_key_to_node_id).unwrap_or(id),
        })
    }

    /// Action handler to pair with this bridge.
    ///
    /// Table adapters are read-only, so requests are only logged.
    pub fn action_handler(&self) -> BridgeActionHandler {
        BridgeActionHandler {
            tree: self.tree.clone(),
        }
    }
}

/// Remove child ids that name nodes missing from the update.
///
/// Each node is built in its own hand-off, so a row listed by the table may
/// be gone by the time it is built.
fn drop_dangling_children(nodes: &mut [(NodeId, Node)]) {
    let emitted: HashSet<NodeId> = nodes.iter().map(|(id, _)| *id).collect();
    for (id, node) in nodes.iter_mut() {
        if node.children().iter().all(|child| emitted.contains(child)) {
            continue;
        }
        let kept: Vec<NodeId> = node
            .children()
            .iter()
            .copied()
            .filter(|child| emitted.contains(child))
            .collect();
        axbridge_debug!(
            node = id.0,
            dropped = node.children().len() - kept.len(),
            "child vanished during tree update"
        );
        node.set_children(kept);
    }
}

impl ActivationHandler for AccessibilityBridge {
    fn request_initial_tree(&mut self) -> Option<TreeUpdate> {
        let root = self.root()?;
        self.build_tree_update(root)
    }
}

/// Logs action requests from assistive technology.
#[derive(Debug, Clone)]
pub struct BridgeActionHandler {
    tree: AdapterTree,
}

impl ActionHandler for BridgeActionHandler {
    fn do_action(&mut self, request: ActionRequest) {
        let known = self.tree.get(node_id_to_node_key(request.target)).is_some();
        axbridge_debug!(
            node = request.target.0,
            action = ?request.action,
            known,
            "ignoring action on read-only table adapter"
        );
    }
}
