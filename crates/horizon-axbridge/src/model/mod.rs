//! Toolkit-side table model.
//!
//! The bridge reads toolkit tables through the [`AccessibleTable`] trait.
//! [`SimpleAccessibleTable`] is a ready-made implementation for toolkits that
//! keep their table data as plain text, and for tests.

mod table_model;
mod traits;

pub use table_model::SimpleAccessibleTable;
pub use traits::AccessibleTable;
