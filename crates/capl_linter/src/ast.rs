//! C1 parser façade support: AST walking utilities layered on top of the raw
//! `tree-sitter` tree. Mirrors the walk/query/descendants surface a
//! tree-sitter-C–based façade needs, independent of any particular rule.

use ruff_diagnostics::Edit;
use ruff_source_file::SourceFile;
use ruff_text_size::{TextRange, TextSize};
use tree_sitter::{Node, TreeCursor};

use crate::traits::TextRanged;

pub struct DepthFirstIterator<'a> {
    cursor: TreeCursor<'a>,
}

impl<'a> Iterator for DepthFirstIterator<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.goto_first_child() {
            return Some(self.cursor.node());
        }
        loop {
            if self.cursor.goto_next_sibling() {
                return Some(self.cursor.node());
            }
            if !self.cursor.goto_parent() || self.cursor.depth() == 0 {
                // back at (or above) the node the walk started from
                return None;
            }
        }
    }
}

/// Depth-first walk that also yields the current depth relative to the
/// node the walk started from, per the C1 contract ("walk(node) yields
/// nodes in document order with current depth").
pub struct WalkIterator<'a> {
    cursor: TreeCursor<'a>,
    started: bool,
}

impl<'a> WalkIterator<'a> {
    pub fn new(node: Node<'a>) -> Self {
        Self {
            cursor: node.walk(),
            started: false,
        }
    }
}

impl<'a> Iterator for WalkIterator<'a> {
    type Item = (Node<'a>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            return Some((self.cursor.node(), self.cursor.depth() as usize));
        }
        if self.cursor.goto_first_child() {
            return Some((self.cursor.node(), self.cursor.depth() as usize));
        }
        loop {
            if self.cursor.goto_next_sibling() {
                return Some((self.cursor.node(), self.cursor.depth() as usize));
            }
            if !self.cursor.goto_parent() {
                return None;
            }
            if self.cursor.depth() == 0 {
                // back at (or above) the root we started the walk on
                return None;
            }
        }
    }
}

pub struct AncestorsIterator<'a> {
    node: Node<'a>,
}

impl<'a> Iterator for AncestorsIterator<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.node = self.node.parent()?;
        Some(self.node)
    }
}

/// Adds CAPL/C-aware helpers to [`tree_sitter::Node`].
pub trait CaplNode<'tree> {
    fn descendants(&self) -> DepthFirstIterator<'_>;
    fn walk_from(&self) -> WalkIterator<'_>;
    fn ancestors(&self) -> AncestorsIterator<'_>;
    fn child_with_name(&self, name: &str) -> Option<Node<'_>>;
    fn to_text<'a>(&self, src: &'a str) -> Option<&'a str>;
    fn edit_delete(&self, src: &SourceFile) -> Edit;
    /// True if this node or any descendant is an `ERROR` node.
    fn contains_error(&self) -> bool;
}

impl<'tree> CaplNode<'tree> for Node<'tree> {
    fn descendants(&self) -> DepthFirstIterator<'_> {
        DepthFirstIterator { cursor: self.walk() }
    }

    fn walk_from(&self) -> WalkIterator<'_> {
        WalkIterator::new(*self)
    }

    fn ancestors(&self) -> AncestorsIterator<'_> {
        AncestorsIterator { node: *self }
    }

    fn child_with_name(&self, name: &str) -> Option<Node<'_>> {
        let mut cursor = self.walk();
        self.children(&mut cursor).find(|c| c.kind() == name)
    }

    fn to_text<'a>(&self, src: &'a str) -> Option<&'a str> {
        src.get(self.start_byte()..self.end_byte())
    }

    fn edit_delete(&self, _src: &SourceFile) -> Edit {
        Edit::deletion(self.start_textsize(), self.end_textsize())
    }

    fn contains_error(&self) -> bool {
        self.kind() == "ERROR" || self.descendants().any(|n| n.kind() == "ERROR")
    }
}

/// Count of `ERROR` nodes in a tree, used by the C6 auto-fix driver's
/// no-new-error invariant.
pub fn count_error_nodes(root: Node) -> usize {
    let mut count = usize::from(root.kind() == "ERROR");
    count += root.descendants().filter(|n| n.kind() == "ERROR").count();
    count
}

/// A line-start index over a byte buffer, giving the parser façade
/// O(log n) row/column lookup and O(1) row→offset lookup.
/// `ruff_source_file::SourceFile` already maintains this table internally
/// (`to_source_code().source_location()`); this thin wrapper is kept so
/// callers outside the `ruff_*` crates never hand-roll the same math.
pub struct LineIndex<'a> {
    file: &'a SourceFile,
}

impl<'a> LineIndex<'a> {
    pub fn new(file: &'a SourceFile) -> Self {
        Self { file }
    }

    pub fn row_column(&self, offset: TextSize) -> (usize, usize) {
        let loc = self.file.to_source_code().source_location(offset);
        (loc.row.to_zero_indexed(), loc.column.to_zero_indexed())
    }

    pub fn line_range(&self, row_zero_indexed: usize) -> TextRange {
        let source = self.file.to_source_code();
        let row = ruff_source_file::OneIndexed::from_zero_indexed(row_zero_indexed);
        source.line_range(row)
    }
}
