//! Attribute requests from the native runtime and the values returned.

use accesskit::NodeId;

use super::role::AccessibleRole;

/// An attribute the native accessibility runtime can ask an adapter for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AxAttribute {
    /// The adapter's role.
    Role,
    /// The accessible name.
    Label,
    /// Position among the parent's children.
    Index,
    /// Row index within the table (rows and cells).
    RowIndex,
    /// Column index within the table (columns and cells).
    ColumnIndex,
    /// The parent node.
    Parent,
    /// The child nodes.
    Children,
    /// Number of child nodes.
    ChildCount,
    /// Number of rows (tables and columns).
    RowCount,
    /// Number of columns (tables and rows).
    ColumnCount,
    /// Header text (columns and cells).
    Header,
    /// Number of columns spanned (columns and cells).
    ColumnSpan,
    /// Text content (cells).
    Value,
    /// Whether the adapter still refers to a live table.
    Valid,
}

/// A value in the shape the native runtime expects.
///
/// [`AxValue::None`] is the explicit "no value": it is what every failed or
/// unsupported query answers with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AxValue {
    /// No value available.
    #[default]
    None,
    /// A role tag.
    Role(AccessibleRole),
    /// Text.
    Text(String),
    /// A 0-based index.
    Index(usize),
    /// A count.
    Count(usize),
    /// A flag.
    Bool(bool),
    /// A reference to another node.
    Node(NodeId),
    /// References to other nodes.
    Nodes(Vec<NodeId>),
}

impl AxValue {
    /// Returns `true` for [`AxValue::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The index, if this is an [`AxValue::Index`].
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            _ => None,
        }
    }

    /// The count, if this is an [`AxValue::Count`].
    pub fn as_count(&self) -> Option<usize> {
        match self {
            Self::Count(count) => Some(*count),
            _ => None,
        }
    }

    /// The text, if this is an [`AxValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<Option<String>> for AxValue {
    fn from(value: Option<String>) -> Self {
        value.map(Self::Text).unwrap_or_default()
    }
}

/// Wrap an optional index.
pub(crate) fn index_value(value: Option<usize>) -> AxValue {
    value.map(AxValue::Index).unwrap_or_default()
}

/// Wrap an optional count.
pub(crate) fn count_value(value: Option<usize>) -> AxValue {
    value.map(AxValue::Count).unwrap_or_default()
}
