//! Search highlighting in the rendered markup view.
//!
//! Works on a fresh copy of the rendered tree, never the authoritative
//! one: the unmarked tree is what "close search" restores, so it must
//! survive every highlight pass. Markers therefore never compound across
//! searches.
//!
//! The pass is driven by the store's match spans over the tree's
//! concatenated text content, so marker ordinals and the store's cursor
//! enumerate the same sequence by construction. A span that crosses a
//! leaf boundary is rendered as one marker per covered leaf, all sharing
//! the span's ordinal.

use crate::finder::MatchSpan;
use crate::markup::{Element, MarkupNode, MarkupTree};

/// Result of one tree highlight pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeHighlight {
    /// Copy of the input tree with match markers spliced into its text
    /// leaves.
    pub tree: MarkupTree,
    /// Number of matches marked across the whole tree.
    pub marker_count: usize,
    /// 1-based ordinal of the match tagged active, if any. The host
    /// resolves this to a pixel position and scrolls it into view,
    /// center-aligned.
    pub active_ordinal: Option<usize>,
}

/// Highlights `results` (byte spans into the tree's text content, in
/// ascending order) in the text leaves of `tree`, tagging the match whose
/// 1-based position equals `cursor_index` as active. Invoked before a
/// rendered tree exists, this is a logged no-op.
pub fn render(
    tree: Option<&MarkupTree>,
    results: &[MatchSpan],
    cursor_index: usize,
) -> Option<TreeHighlight> {
    let tree = match tree {
        Some(tree) => tree,
        None => {
            log::warn!("tree highlight requested before any rendered tree exists");
            return None;
        }
    };

    if results.is_empty() {
        return Some(TreeHighlight {
            tree: tree.clone(),
            marker_count: 0,
            active_ordinal: None,
        });
    }

    let mut pass = HighlightPass {
        results,
        cursor_index,
        offset: 0,
        marked: vec![false; results.len()],
    };
    let roots = tree.roots.iter().flat_map(|node| pass.node(node)).collect();

    let marker_count = pass.marked.iter().filter(|m| **m).count();
    let active_ordinal = (cursor_index >= 1
        && cursor_index <= results.len()
        && pass.marked[cursor_index - 1])
        .then_some(cursor_index);

    Some(TreeHighlight {
        tree: MarkupTree::new(roots),
        marker_count,
        active_ordinal,
    })
}

/// Walks the tree in document order, tracking each text leaf's byte range
/// within the concatenated text content.
struct HighlightPass<'a> {
    results: &'a [MatchSpan],
    cursor_index: usize,
    offset: usize,
    /// Which spans produced at least one marker fragment.
    marked: Vec<bool>,
}

impl HighlightPass<'_> {
    fn node(&mut self, node: &MarkupNode) -> Vec<MarkupNode> {
        match node {
            MarkupNode::Element(el) => {
                let children = el.children.iter().flat_map(|child| self.node(child)).collect();
                vec![MarkupNode::Element(Element {
                    kind: el.kind.clone(),
                    children,
                })]
            }
            MarkupNode::Text(text) => self.split_leaf(text),
            // A fresh render never contains markers; anything already
            // marked passes through, still advancing the text offset.
            MarkupNode::Highlight { text, .. } => {
                self.offset += text.len();
                vec![node.clone()]
            }
        }
    }

    /// Splits one text leaf at every span overlapping it, preserving all
    /// non-matched text exactly. Leaves no span touches come back as the
    /// original single text node.
    fn split_leaf(&mut self, text: &str) -> Vec<MarkupNode> {
        let leaf_start = self.offset;
        let leaf_end = leaf_start + text.len();
        self.offset = leaf_end;

        let mut fragments = Vec::new();
        let mut last = 0;
        for (i, span) in self.results.iter().enumerate() {
            if span.end <= leaf_start {
                continue;
            }
            if span.start >= leaf_end {
                break;
            }
            // Clip the span to this leaf.
            let start = span.start.max(leaf_start) - leaf_start;
            let end = span.end.min(leaf_end) - leaf_start;
            if end <= start {
                continue;
            }
            if start > last {
                fragments.push(MarkupNode::text(&text[last..start]));
            }
            self.marked[i] = true;
            fragments.push(MarkupNode::Highlight {
                text: text[start..end].to_string(),
                active: i + 1 == self.cursor_index,
            });
            last = end;
        }

        if fragments.is_empty() {
            return vec![MarkupNode::text(text)];
        }
        if last < text.len() {
            fragments.push(MarkupNode::text(&text[last..]));
        }
        fragments
    }
}
