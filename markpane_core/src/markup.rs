//! Rendered-markup tree model and the renderer seam.
//!
//! The markdown-to-markup pass itself lives outside this crate; the core
//! only fixes the tree shape that pass must produce. The tree is a derived,
//! disposable projection of the document buffer: rebuilt in full whenever
//! the buffer changes, never edited in place by anything but the tree
//! highlighter (which works on its own copy).

/// Structural kind of a markup element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Paragraph,
    /// Heading with level 1..=6.
    Heading(u8),
    /// Fenced code block; the renderer tags the language when detectable.
    CodeBlock { language: Option<String> },
    BlockQuote,
    List { ordered: bool },
    Item,
    Emphasis,
    Strong,
    Link { href: String },
}

/// A node in the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    /// An element with children.
    Element(Element),
    /// A text-bearing leaf.
    Text(String),
    /// A search-highlight marker wrapping matched text. Only the tree
    /// highlighter produces these; a freshly rendered tree has none.
    Highlight { text: String, active: bool },
}

impl MarkupNode {
    /// Convenience constructor for a text leaf.
    pub fn text(s: impl Into<String>) -> Self {
        MarkupNode::Text(s.into())
    }

    /// Convenience constructor for an element node.
    pub fn element(kind: ElementKind, children: Vec<MarkupNode>) -> Self {
        MarkupNode::Element(Element { kind, children })
    }
}

/// An element and its children, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub children: Vec<MarkupNode>,
}

/// The rendered form of one document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkupTree {
    pub roots: Vec<MarkupNode>,
}

impl MarkupTree {
    /// Creates a tree from root nodes.
    pub fn new(roots: Vec<MarkupNode>) -> Self {
        Self { roots }
    }

    /// Concatenates the text content of every text-bearing leaf in
    /// document order. Highlight markers contribute their wrapped text, so
    /// a highlighted copy of a tree has the same text content as the
    /// original.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.roots {
            collect_text(node, &mut out);
        }
        out
    }

    /// Returns true if the tree contains no highlight markers.
    pub fn is_unmarked(&self) -> bool {
        fn check(node: &MarkupNode) -> bool {
            match node {
                MarkupNode::Highlight { .. } => false,
                MarkupNode::Text(_) => true,
                MarkupNode::Element(el) => el.children.iter().all(check),
            }
        }
        self.roots.iter().all(check)
    }
}

fn collect_text(node: &MarkupNode, out: &mut String) {
    match node {
        MarkupNode::Text(s) => out.push_str(s),
        MarkupNode::Highlight { text, .. } => out.push_str(text),
        MarkupNode::Element(el) => {
            for child in &el.children {
                collect_text(child, out);
            }
        }
    }
}

/// The external markdown renderer contract: synchronous and total for any
/// input string, including the empty one.
pub trait MarkupRenderer {
    fn render(&self, text: &str) -> MarkupTree;
}
