//! Horizon AX Bridge - exposes toolkit tables to native screen readers.
//!
//! Adapter nodes stand in for a table, its rows, columns and cells in the
//! platform accessibility tree. They can be queried from any thread: every
//! read is handed over to the toolkit's serialized context, validated
//! against the table's live shape, and degrades to "unavailable" when the
//! table is gone or the toolkit is too busy to answer.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use horizon_axbridge::accessibility::{AdapterNode, AdapterTree};
//! use horizon_axbridge::model::SimpleAccessibleTable;
//! use horizon_axbridge::ToolkitContext;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context = ToolkitContext::new()?;
//!     let table = Arc::new(SimpleAccessibleTable::new("Orders", ["Id", "Total"]));
//!     table.bind_to(&context);
//!
//!     let tree = AdapterTree::new(context.clone());
//!     let column = tree.attach_table(&table).column(1).ok_or("no column")?;
//!     println!("{:?} {:?}", column.role(), column.column_number_in_table());
//!
//!     context.stop_and_join();
//!     Ok(())
//! }
//! ```

pub use horizon_axbridge_core::*;

pub mod accessibility;
pub mod model;

/// Commonly used items.
pub mod prelude {
    pub use crate::accessibility::{
        AccessibilityBridge, AccessibleRole, AdapterNode, AdapterTree, AxAttribute, AxValue,
        ColumnAdapter,
    };
    pub use crate::model::{AccessibleTable, SimpleAccessibleTable};
    pub use horizon_axbridge_core::{BridgeConfig, BridgeError, ToolkitContext};
}
