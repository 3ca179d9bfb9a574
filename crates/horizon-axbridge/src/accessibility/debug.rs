//! Text dumps of the adapter tree for debugging.

use std::fmt::{self, Write};
use std::sync::Arc;

use super::node::AdapterNode;
use super::tree::AdapterTree;

/// Branch drawing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// `|` and `+--`.
    Ascii,
    /// Box-drawing characters.
    #[default]
    Unicode,
    /// Plain indentation.
    Compact,
}

/// What each line of the dump shows.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// Branch drawing style.
    pub style: TreeStyle,
    /// Show the node key.
    pub show_keys: bool,
    /// Show the validated index (column number, row index).
    pub show_indices: bool,
    /// Mark adapters whose table is gone.
    pub show_validity: bool,
    /// Maximum depth to descend (`None` for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_keys: true,
            show_indices: true,
            show_validity: true,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Roles and labels only.
    pub fn minimal() -> Self {
        Self {
            show_keys: false,
            show_indices: false,
            show_validity: false,
            ..Default::default()
        }
    }
}

/// Renders an [`AdapterTree`] as indented text.
///
/// Every line re-queries the toolkit, so the dump shows the tables as they
/// are now, not as they were when the adapters were created.
///
/// ```no_run
/// # use horizon_axbridge::accessibility::{AdapterTree, AdapterTreeDebug};
/// # fn dump(tree: &AdapterTree) {
/// println!("{}", AdapterTreeDebug::new(tree));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AdapterTreeDebug<'a> {
    tree: &'a AdapterTree,
    options: TreeFormatOptions,
}

impl<'a> AdapterTreeDebug<'a> {
    /// Dump `tree` with default options.
    pub fn new(tree: &'a AdapterTree) -> Self {
        Self {
            tree,
            options: TreeFormatOptions::default(),
        }
    }

    /// Dump `tree` with custom options.
    pub fn with_options(tree: &'a AdapterTree, options: TreeFormatOptions) -> Self {
        Self { tree, options }
    }

    /// Format every attached table.
    pub fn format_all(&self) -> String {
        let tables = self.tree.tables();
        let mut output = String::new();
        writeln!(output, "Adapter Tree ({} adapters):", self.tree.len()).expect("write to String");
        if tables.is_empty() {
            writeln!(output, "  (empty)").expect("write to String");
        }
        for table in tables {
            self.format_into(table, 0, &mut Vec::new(), &mut output);
        }
        output
    }

    /// Format the subtree under one adapter.
    pub fn format_subtree(&self, root: Arc<dyn AdapterNode>) -> String {
        let mut output = String::new();
        self.format_into(root, 0, &mut Vec::new(), &mut output);
        output
    }

    // `open` holds, per ancestor level, whether that ancestor has later siblings.
    fn format_into(
        &self,
        node: Arc<dyn AdapterNode>,
        depth: usize,
        open: &mut Vec<bool>,
        output: &mut String,
    ) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        output.push_str(&self.prefix(open));
        output.push_str(node.role().as_str());
        if let Some(label) = node.label() {
            write!(output, " {label:?}").expect("write to String");
        }
        if self.options.show_indices
            && let Some(index) = node.index_in_parent()
        {
            write!(output, " #{index}").expect("write to String");
        }
        if self.options.show_keys {
            write!(output, " [{}]", node.key().as_raw()).expect("write to String");
        }
        if self.options.show_validity && !node.is_valid() {
            output.push_str(" (invalid)");
        }
        output.push('\n');

        let children = node.tree_children();
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            open.push(i + 1 < count);
            self.format_into(child, depth + 1, open, output);
            open.pop();
        }
    }

    fn prefix(&self, open: &[bool]) -> String {
        let Some((last, ancestors)) = open.split_last() else {
            return String::new();
        };
        let (pipe, tee, elbow, blank) = match self.options.style {
            TreeStyle::Ascii => ("|   ", "+-- ", "`-- ", "    "),
            TreeStyle::Unicode => ("\u{2502}   ", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} ", "    "),
            TreeStyle::Compact => ("  ", "  ", "  ", "  "),
        };

        let mut prefix = String::new();
        for has_more in ancestors {
            prefix.push_str(if *has_more { pipe } else { blank });
        }
        prefix.push_str(if *last { tee } else { elbow });
        prefix
    }
}

impl fmt::Display for AdapterTreeDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_all())
    }
}
