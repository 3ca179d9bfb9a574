//! Accessibility roles for adapter nodes.

use accesskit::Role;

/// The accessibility role of an adapter node.
///
/// Every adapter kind reports exactly one role for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AccessibleRole {
    /// A table/grid.
    Table,

    /// A row within a table.
    Row,

    /// A column within a table.
    Column,

    /// A cell within a table.
    Cell,
}

impl AccessibleRole {
    /// Convert to AccessKit's Role enum.
    ///
    /// AccessKit has no column role. Columns serialize as generic containers
    /// carrying a column index and the header as label.
    pub fn to_accesskit_role(self) -> Role {
        match self {
            AccessibleRole::Table => Role::Table,
            AccessibleRole::Row => Role::Row,
            AccessibleRole::Column => Role::GenericContainer,
            AccessibleRole::Cell => Role::Cell,
        }
    }

    /// Short, stable name used in logs and debug dumps.
    pub fn as_str(self) -> &'static str {
        match self {
            AccessibleRole::Table => "table",
            AccessibleRole::Row => "row",
            AccessibleRole::Column => "column",
            AccessibleRole::Cell => "cell",
        }
    }
}

impl From<AccessibleRole> for Role {
    fn from(role: AccessibleRole) -> Self {
        role.to_accesskit_role()
    }
}

impl std::fmt::Display for AccessibleRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
