//! Selection helpers shared by the trackers.

use crate::engine::{EditorView, EngineSelection, LinkKind, LinkNode, RangeSelection};

/// Why the bubble toolbar is not shown. Checked in this order; the first failure wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiddenReason {
    /// The editor is read-only.
    NotEditable,
    /// An IME composition is running.
    Composing,
    /// No range selection (none, or a node selection).
    NoRangeSelection,
    /// The range is collapsed to a caret.
    Collapsed,
    /// The selection holds only line breaks.
    EmptyText,
    /// The selection anchor is outside the editable root.
    OutsideRoot,
}

/// Decide whether a text-format bubble may show for the current selection.
///
/// Returns the range to anchor to, or the first reason it may not show.
pub fn bubble_range(view: &dyn EditorView) -> Result<RangeSelection, HiddenReason> {
    if !view.is_editable() {
        return Err(HiddenReason::NotEditable);
    }
    if view.is_composing() {
        return Err(HiddenReason::Composing);
    }
    let EngineSelection::Range(range) = view.selection() else {
        return Err(HiddenReason::NoRangeSelection);
    };
    if range.is_collapsed() {
        return Err(HiddenReason::Collapsed);
    }
    if !has_visible_text(&range.text) {
        return Err(HiddenReason::EmptyText);
    }
    if !range.anchor_in_root {
        return Err(HiddenReason::OutsideRoot);
    }
    Ok(range)
}

/// Text is non-empty once line breaks are stripped.
pub fn has_visible_text(text: &str) -> bool {
    text.chars().any(|c| c != '\n' && c != '\r')
}

/// The link the "selected node" of a range belongs to.
///
/// If anchor and focus are in the same node that node is selected. Otherwise the leading point
/// (focus for backward selections, anchor for forward ones) decides: when it sits at its
/// node's end the anchor node is selected, else the focus node.
pub fn selected_node_link(range: &RangeSelection) -> Option<&LinkNode> {
    let (anchor, focus) = (&range.anchor, &range.focus);
    if anchor.node == focus.node {
        return anchor.link.as_ref();
    }
    let leading = if range.is_backward { focus } else { anchor };
    if leading.at_node_end {
        anchor.link.as_ref()
    } else {
        focus.link.as_ref()
    }
}

/// The link a range selection is "inside", if any.
///
/// Every non-line-break node the range touches has to share the selected node's link; a
/// range covering two links, or a link plus plain text, is not inside a link. Unlinked
/// auto-links do not count.
pub fn link_for_range(range: &RangeSelection) -> Option<LinkNode> {
    let link = selected_node_link(range)?;
    if matches!(link.kind, LinkKind::Auto { unlinked: true }) {
        return None;
    }
    let uniform = range
        .node_links
        .iter()
        .all(|node_link| *node_link == Some(link.key));
    uniform.then(|| link.clone())
}

/// The link the current selection is inside, for range and node selections alike.
pub fn link_for_selection(selection: &EngineSelection) -> Option<LinkNode> {
    match selection {
        EngineSelection::None => None,
        EngineSelection::Node(nodes) => nodes
            .link
            .clone()
            .filter(|link| !matches!(link.kind, LinkKind::Auto { unlinked: true })),
        EngineSelection::Range(range) => link_for_range(range),
    }
}
