//! Document engine boundary.
//!
//! The overlay never owns the document. Everything it needs from the rich-text engine goes
//! through two traits:
//!
//! - [`EditorView`]: read-only queries (selection, editable/composition flags, rectangles).
//!   Update listeners and command handlers receive a `&dyn EditorView`.
//! - [`DocumentEngine`]: the view plus the handful of commands and subscriptions the overlay
//!   issues (link toggle, auto-link upgrade, selection restore, listener registration).
//!
//! Engines describe selections with the plain data types below; the overlay copies them into
//! [`SelectionSnapshot`]s when it needs to remember a range past the next selection change.

use serde::{Deserialize, Serialize};

use crate::anchor::AnchorFrame;
use crate::commands::{CommandHandler, CommandKind, CommandPriority, EditorCommand, ListenerId};
use crate::error::EngineError;
use crate::geometry::TextAlignment;
use crate::rect::Rect;

/// Engine-assigned node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey(pub u32);

/// Identifier of an editor instance (nested editors each have their own).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditorId(pub u32);

/// How a link node came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkKind {
    /// Authored by the user (toolbar, link editor, paste of a link).
    Manual,
    /// Created by URL-pattern detection.
    Auto {
        /// The user explicitly unlinked it; it renders as plain text.
        unlinked: bool,
    },
}

impl LinkKind {
    /// Returns `true` for auto-detected links.
    pub fn is_auto(&self) -> bool {
        matches!(self, LinkKind::Auto { .. })
    }
}

/// Attributes carried by a link node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkAttributes {
    /// Destination.
    pub url: String,
    /// `rel` attribute.
    pub rel: Option<String>,
    /// `target` attribute.
    pub target: Option<String>,
    /// `title` attribute.
    pub title: Option<String>,
}

impl LinkAttributes {
    /// Attributes with only a destination.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Same `rel`/`target`/`title`, different destination.
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..self.clone()
        }
    }
}

/// A link element node as seen through the engine boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkNode {
    /// Node key of the link element.
    pub key: NodeKey,
    /// Manual or auto-detected.
    pub kind: LinkKind,
    /// Destination and attributes.
    pub attributes: LinkAttributes,
}

impl LinkNode {
    /// The link destination.
    pub fn url(&self) -> &str {
        &self.attributes.url
    }
}

/// One end of a range selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPoint {
    /// The text node the point sits in.
    pub node: NodeKey,
    /// Character offset inside `node`.
    pub offset: usize,
    /// `offset` equals the node's text length.
    pub at_node_end: bool,
    /// Nearest link ancestor of `node`, if any.
    pub link: Option<LinkNode>,
}

/// A text range selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSelection {
    /// Where the selection started.
    pub anchor: SelectionPoint,
    /// Where the selection currently ends (the caret).
    pub focus: SelectionPoint,
    /// `focus` precedes `anchor` in document order.
    pub is_backward: bool,
    /// Selected text, with line breaks as `'\n'`.
    pub text: String,
    /// The anchor lies inside the editable root.
    pub anchor_in_root: bool,
    /// Alignment of the block holding the start of the range.
    pub alignment: TextAlignment,
    /// Nearest link ancestor of every non-line-break node the range touches, in order.
    pub node_links: Vec<Option<NodeKey>>,
}

impl RangeSelection {
    /// Anchor and focus coincide.
    pub fn is_collapsed(&self) -> bool {
        self.anchor.node == self.focus.node && self.anchor.offset == self.focus.offset
    }
}

/// A selection of whole nodes (e.g. a clicked image or a selected link element).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSelection {
    /// Selected node keys.
    pub nodes: Vec<NodeKey>,
    /// Set when exactly one node is selected and it is (or sits inside) a link.
    pub link: Option<LinkNode>,
}

/// The engine's current selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineSelection {
    /// No selection (focus is elsewhere).
    #[default]
    None,
    /// Whole-node selection.
    Node(NodeSelection),
    /// Text range selection.
    Range(RangeSelection),
}

impl EngineSelection {
    /// The range selection, if this is one.
    pub fn as_range(&self) -> Option<&RangeSelection> {
        match self {
            EngineSelection::Range(range) => Some(range),
            _ => None,
        }
    }
}

/// Copy of a selection retained across focus changes.
///
/// Once focus moves into the overlay's own input, the engine reports no selection at all;
/// the snapshot lets a later submit still target the text or node the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSnapshot {
    /// A text range.
    Range(RangeSelection),
    /// Whole nodes (a selected link element).
    Node(NodeSelection),
}

impl SelectionSnapshot {
    /// Snapshot a range selection.
    pub fn new(range: RangeSelection) -> Self {
        SelectionSnapshot::Range(range)
    }

    /// Snapshot a node selection.
    pub fn of_nodes(nodes: NodeSelection) -> Self {
        SelectionSnapshot::Node(nodes)
    }

    /// The captured range, for range snapshots.
    pub fn range(&self) -> Option<&RangeSelection> {
        match self {
            SelectionSnapshot::Range(range) => Some(range),
            SelectionSnapshot::Node(_) => None,
        }
    }

    /// Alignment the panel should anchor with.
    pub fn alignment(&self) -> TextAlignment {
        self.range().map_or(TextAlignment::Start, |range| range.alignment)
    }

    /// Returns `true` if `other` covers the same anchor and focus positions.
    pub fn same_range(&self, other: &RangeSelection) -> bool {
        let Some(a) = self.range() else {
            return false;
        };
        a.anchor.node == other.anchor.node
            && a.anchor.offset == other.anchor.offset
            && a.focus.node == other.focus.node
            && a.focus.offset == other.focus.offset
    }
}

/// Read-only view of an editor's state.
pub trait EditorView {
    /// Identifier of this editor.
    fn editor_id(&self) -> EditorId;

    /// Current selection.
    fn selection(&self) -> EngineSelection;

    /// Whether the editor accepts input.
    fn is_editable(&self) -> bool;

    /// Whether an IME composition is in progress.
    fn is_composing(&self) -> bool;

    /// Bounding box of the live selection range, in viewport pixels.
    fn selection_rect(&self) -> Option<Rect>;

    /// Bounding box of a previously captured selection, if it still resolves.
    fn rect_for_snapshot(&self, snapshot: &SelectionSnapshot) -> Option<Rect>;

    /// The container floating panels are positioned in, with its clipping scroller.
    fn root_anchor(&self) -> Option<AnchorFrame>;
}

/// Update listener: called after every committed change with a read-only view.
pub type UpdateListener = Box<dyn FnMut(&dyn EditorView)>;

/// The rich-text engine, as far as the overlay is concerned.
pub trait DocumentEngine: EditorView {
    /// Register a command handler. Higher priorities run first; a handler returning `true`
    /// stops propagation.
    fn register_command(
        &mut self,
        kind: CommandKind,
        priority: CommandPriority,
        handler: CommandHandler,
    ) -> ListenerId;

    /// Register an update listener.
    fn register_update_listener(&mut self, listener: UpdateListener) -> ListenerId;

    /// Remove a handler or listener. Returns `false` if the id was unknown.
    fn unregister(&mut self, id: ListenerId) -> bool;

    /// Run a command through the registered handlers.
    fn dispatch_command(&mut self, command: &EditorCommand) -> bool;

    /// Wrap the selection in a manual link (`Some`) or unwrap links it touches (`None`).
    ///
    /// When the selection already sits in a single link, `Some` updates that link instead.
    /// Update listeners are notified once the change is committed.
    fn toggle_link(&mut self, link: Option<LinkAttributes>) -> Result<(), EngineError>;

    /// Replace a link node by a manual link with the given attributes, keeping its children.
    fn replace_link_node(
        &mut self,
        key: NodeKey,
        attributes: LinkAttributes,
    ) -> Result<NodeKey, EngineError>;

    /// Make `snapshot` the live selection again.
    fn restore_selection(&mut self, snapshot: &SelectionSnapshot) -> Result<(), EngineError>;
}
