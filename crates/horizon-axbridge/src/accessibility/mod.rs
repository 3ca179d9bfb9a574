//! Accessibility adapters for toolkit tables.
//!
//! This module exposes toolkit tables to platform accessibility APIs through
//! [AccessKit](https://accesskit.dev/). Each table element a screen reader can
//! ask about (the table, its rows, columns and cells) is represented by an
//! adapter node.
//!
//! # Architecture
//!
//! - [`AdapterNode`]: the contract every adapter kind implements
//! - [`ColumnAdapter`], [`TableAdapter`], [`RowAdapter`], [`CellAdapter`]:
//!   one adapter per role, each composing the shared peer accessor
//! - [`AdapterTree`]: owns the adapters, creates them lazily, resolves
//!   parents by key
//! - [`AccessibilityBridge`]: answers attribute queries and builds AccessKit
//!   tree updates
//!
//! Adapters never touch toolkit state directly. Every read is handed to the
//! [`ToolkitContext`](horizon_axbridge_core::ToolkitContext), runs there, and
//! the caller waits for the answer for a bounded time. When the table is gone,
//! an index no longer fits or the toolkit does not answer, the query reports
//! "unavailable" instead of failing.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use horizon_axbridge::accessibility::{AccessibilityBridge, AdapterNode, AxAttribute};
//! use horizon_axbridge::model::SimpleAccessibleTable;
//! use horizon_axbridge_core::BridgeConfig;
//!
//! let bridge = AccessibilityBridge::with_config(&BridgeConfig::default())?;
//! let table = Arc::new(SimpleAccessibleTable::new("Employees", ["Name", "Salary"]));
//! table.bind_to(bridge.context());
//!
//! let column = bridge.attach_table(&table).column(1).expect("two columns");
//! assert_eq!(column.column_number_in_table(), Some(1));
//! assert_eq!(column.header_text().as_deref(), Some("Salary"));
//! println!("{:?}", column.attribute(AxAttribute::ColumnIndex));
//! # Ok::<(), horizon_axbridge_core::BridgeError>(())
//! ```

mod attribute;
mod bridge;
mod cell;
mod column;
mod debug;
mod node;
mod peer;
mod role;
mod row;
mod table;
mod tree;

pub use attribute::{AxAttribute, AxValue};
pub use bridge::{AccessibilityBridge, BridgeActionHandler};
pub use cell::CellAdapter;
pub use column::ColumnAdapter;
pub use debug::{AdapterTreeDebug, TreeFormatOptions, TreeStyle};
pub use node::{AdapterNode, NodeIdentity, NodeKey};
pub use peer::PeerAccessor;
pub use role::AccessibleRole;
pub use row::RowAdapter;
pub use table::{TableAdapter, TableShape};
pub use tree::{AdapterTree, AnyAdapter};

use accesskit::NodeId as AccessKitNodeId;

/// Convert a NodeKey to an AccessKit NodeId.
pub(crate) fn node_key_to_node_id(key: NodeKey) -> AccessKitNodeId {
    AccessKitNodeId(key.as_raw())
}

/// Convert an AccessKit NodeId back to a NodeKey.
///
/// The key is not checked against any tree; lookups of a foreign id simply
/// miss.
pub(crate) fn node_id_to_node_key(id: AccessKitNodeId) -> NodeKey {
    NodeKey::from_raw(id.0)
}
