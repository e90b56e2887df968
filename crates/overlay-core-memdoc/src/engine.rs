//! The in-memory engine.
//!
//! [`MemoryEngine`] implements [`DocumentEngine`] over a [`Document`] and a monospace
//! [`Layout`]. Selection changes go through the same pipeline a browser-hosted engine would
//! use: the selection-change command is dispatched to registered handlers, then every update
//! listener runs. Mutations (link toggle, auto-link replacement, selection restore) notify
//! update listeners synchronously, before returning to the caller.

use overlay_core::selection::link_for_range;
use overlay_core::{
    AnchorFrame, CommandHandler, CommandKind, CommandPriority, DocumentEngine, EditorCommand,
    EditorId, EditorView, EngineError, EngineSelection, LinkAttributes, ListenerId,
    ListenerRegistry, NodeKey, NodeSelection, RangeSelection, Rect, SelectionPoint,
    SelectionSnapshot, TextAlignment, UpdateListener,
};

use crate::document::{Bias, DocPosition, Document};
use crate::layout::Layout;

/// The engine's own selection model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Nothing selected (focus elsewhere).
    #[default]
    None,
    /// A text range.
    Range {
        /// Where the selection started.
        anchor: DocPosition,
        /// Where it ends (the caret).
        focus: DocPosition,
    },
    /// A whole link node.
    Node(NodeKey),
}

/// Document, selection and layout: everything [`EditorView`] answers from.
#[derive(Debug, Clone)]
pub struct EngineState {
    id: EditorId,
    document: Document,
    selection: Selection,
    selection_in_root: bool,
    editable: bool,
    composing: bool,
    layout: Layout,
}

impl EngineState {
    fn new(id: EditorId, document: Document, layout: Layout) -> Self {
        Self {
            id,
            document,
            selection: Selection::None,
            selection_in_root: true,
            editable: true,
            composing: false,
            layout,
        }
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The engine-side selection.
    pub fn raw_selection(&self) -> Selection {
        self.selection
    }

    /// The layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn ordered(anchor: DocPosition, focus: DocPosition) -> (DocPosition, DocPosition) {
        if focus < anchor {
            (focus, anchor)
        } else {
            (anchor, focus)
        }
    }

    fn point(&self, position: DocPosition, bias: Bias) -> Option<SelectionPoint> {
        let resolved = self.document.resolve(position, bias)?;
        let span = self.document.span(&resolved)?;
        Some(SelectionPoint {
            node: span.key,
            offset: resolved.offset,
            at_node_end: resolved.at_end,
            link: self.document.link_of(span),
        })
    }

    fn range_selection(
        &self,
        anchor: DocPosition,
        focus: DocPosition,
    ) -> Option<RangeSelection> {
        let (start, end) = Self::ordered(anchor, focus);
        let is_backward = focus < anchor;
        let (start_point, end_point, node_links) = if start == end {
            // A caret on a span boundary belongs to the text before it, except at the
            // start of a block.
            let bias = if start.offset == 0 {
                Bias::Forward
            } else {
                Bias::Backward
            };
            let caret = self.point(start, bias)?;
            let resolved = self.document.resolve(start, bias)?;
            let link = self.document.span(&resolved).and_then(|span| span.link);
            (caret.clone(), caret, vec![link])
        } else {
            let node_links = self
                .document
                .spans_in(start, end)
                .into_iter()
                .map(|span| span.link)
                .collect();
            (
                self.point(start, Bias::Forward)?,
                self.point(end, Bias::Backward)?,
                node_links,
            )
        };
        let (anchor_point, focus_point) = if is_backward {
            (end_point, start_point)
        } else {
            (start_point, end_point)
        };
        Some(RangeSelection {
            anchor: anchor_point,
            focus: focus_point,
            is_backward,
            text: self.document.text_between(start, end),
            anchor_in_root: self.selection_in_root,
            alignment: self
                .document
                .block(start.block)
                .map(|block| block.alignment)
                .unwrap_or_default(),
            node_links,
        })
    }

    fn link_rect(&self, key: NodeKey) -> Option<Rect> {
        let mut rects = Vec::new();
        for (index, block) in self.document.blocks().iter().enumerate() {
            let mut offset = 0;
            for span in &block.spans {
                let len = span.len();
                if span.link == Some(key) {
                    rects.push(self.layout.range_rect(
                        &self.document,
                        DocPosition::new(index, offset),
                        DocPosition::new(index, offset + len),
                    ));
                }
                offset += len;
            }
        }
        Rect::bounding(&rects)
    }

    fn range_positions(&self, range: &RangeSelection) -> Option<(DocPosition, DocPosition)> {
        let anchor = self
            .document
            .position_of(range.anchor.node, range.anchor.offset)?;
        let focus = self
            .document
            .position_of(range.focus.node, range.focus.offset)?;
        Some((anchor, focus))
    }
}

impl EditorView for EngineState {
    fn editor_id(&self) -> EditorId {
        self.id
    }

    fn selection(&self) -> EngineSelection {
        match self.selection {
            Selection::None => EngineSelection::None,
            Selection::Range { anchor, focus } => self
                .range_selection(anchor, focus)
                .map_or(EngineSelection::None, EngineSelection::Range),
            Selection::Node(key) => EngineSelection::Node(NodeSelection {
                nodes: vec![key],
                link: self.document.link(key).cloned(),
            }),
        }
    }

    fn is_editable(&self) -> bool {
        self.editable
    }

    fn is_composing(&self) -> bool {
        self.composing
    }

    fn selection_rect(&self) -> Option<Rect> {
        match self.selection {
            Selection::None => None,
            Selection::Range { anchor, focus } => {
                let (start, end) = Self::ordered(anchor, focus);
                Some(self.layout.range_rect(&self.document, start, end))
            }
            Selection::Node(key) => self.link_rect(key),
        }
    }

    fn rect_for_snapshot(&self, snapshot: &SelectionSnapshot) -> Option<Rect> {
        match snapshot {
            SelectionSnapshot::Range(range) => {
                let (anchor, focus) = self.range_positions(range)?;
                let (start, end) = Self::ordered(anchor, focus);
                Some(self.layout.range_rect(&self.document, start, end))
            }
            SelectionSnapshot::Node(nodes) => self.link_rect(*nodes.nodes.first()?),
        }
    }

    fn root_anchor(&self) -> Option<AnchorFrame> {
        Some(self.layout.anchor_frame(&self.document))
    }
}

/// In-memory document engine.
///
/// The listener registry lives next to the state so handlers can be run against a shared
/// borrow of the state while the registry itself is borrowed mutably.
pub struct MemoryEngine {
    state: EngineState,
    registry: ListenerRegistry,
}

impl MemoryEngine {
    /// Engine over `[text](url)` markup with the default layout.
    pub fn new(markup: &str) -> Self {
        Self::with_layout(markup, Layout::default())
    }

    /// Engine over `[text](url)` markup with an explicit layout.
    pub fn with_layout(markup: &str, layout: Layout) -> Self {
        Self {
            state: EngineState::new(EditorId(1), Document::from_markup(markup), layout),
            registry: ListenerRegistry::new(),
        }
    }

    /// Give the engine another editor id (nested editors).
    pub fn with_id(mut self, id: EditorId) -> Self {
        self.state.id = id;
        self
    }

    /// Read-only state.
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.state.document
    }

    /// Registered handlers and listeners.
    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }

    fn selection_changed(&mut self) {
        let command = EditorCommand::SelectionChange {
            editor: self.state.id,
        };
        self.registry.dispatch(&command, &self.state);
        self.registry.notify_update(&self.state);
    }

    fn committed(&mut self) {
        self.registry.notify_update(&self.state);
    }

    /// Select `anchor..focus` (a backward selection when `focus < anchor`).
    pub fn select(&mut self, anchor: DocPosition, focus: DocPosition) {
        let anchor = self.state.document.clamp(anchor);
        let focus = self.state.document.clamp(focus);
        self.state.selection = Selection::Range { anchor, focus };
        self.state.selection_in_root = true;
        self.selection_changed();
    }

    /// Select the first occurrence of `needle`. Returns `false` if it is not in the document.
    pub fn select_text(&mut self, needle: &str) -> bool {
        match self.state.document.find(needle) {
            Some((start, end)) => {
                self.select(start, end);
                true
            }
            None => false,
        }
    }

    /// Put a collapsed caret at `position`.
    pub fn set_caret(&mut self, position: DocPosition) {
        self.select(position, position);
    }

    /// Select a link element as a whole.
    pub fn select_link(&mut self, key: NodeKey) -> Result<(), EngineError> {
        if self.state.document.link(key).is_none() {
            return Err(EngineError::UnknownNode(key));
        }
        self.state.selection = Selection::Node(key);
        self.state.selection_in_root = true;
        self.selection_changed();
        Ok(())
    }

    /// Focus left the editor: no selection.
    pub fn blur(&mut self) {
        self.state.selection = Selection::None;
        self.selection_changed();
    }

    /// Report the current selection's anchor as lying outside the editable root (e.g. in a
    /// nested editor's chrome).
    pub fn set_selection_in_root(&mut self, in_root: bool) {
        self.state.selection_in_root = in_root;
        self.selection_changed();
    }

    /// Toggle read-only mode.
    pub fn set_editable(&mut self, editable: bool) {
        self.state.editable = editable;
        self.committed();
    }

    /// Start or end an IME composition.
    pub fn set_composing(&mut self, composing: bool) {
        self.state.composing = composing;
        self.committed();
    }

    /// Set a block's alignment.
    pub fn set_alignment(&mut self, block: usize, alignment: TextAlignment) {
        self.state.document.set_alignment(block, alignment);
        self.committed();
    }

    /// Scroll the content. Hosts forward this to the overlays as a scroll event.
    pub fn scroll_to(&mut self, scroll_top: f64) {
        self.state.layout.scroll_top = scroll_top.max(0.0);
    }

    /// Replace the layout (resize). Hosts forward this to the overlays as a resize event.
    pub fn set_layout(&mut self, layout: Layout) {
        self.state.layout = layout;
    }

    /// Press Escape.
    pub fn press_escape(&mut self) -> bool {
        self.dispatch_command(&EditorCommand::KeyEscape)
    }

    /// Run auto-link detection over the whole document.
    pub fn detect_auto_links(&mut self) -> usize {
        let created = self.state.document.detect_auto_links();
        if created > 0 {
            self.committed();
        }
        created
    }

    /// Overwrite a link's attributes (e.g. a paste that carried `rel`/`target`).
    pub fn set_link_attributes(
        &mut self,
        key: NodeKey,
        attributes: LinkAttributes,
    ) -> Result<(), EngineError> {
        self.state.document.update_link(key, attributes)?;
        self.committed();
        Ok(())
    }

    /// The user explicitly unlinked an auto-detected link.
    pub fn unlink_auto_link(&mut self, key: NodeKey) -> Result<(), EngineError> {
        self.state.document.unlink_auto_link(key)?;
        self.committed();
        Ok(())
    }

    fn range_bounds(&self) -> Option<(DocPosition, DocPosition)> {
        match self.state.selection {
            Selection::Range { anchor, focus } => Some(EngineState::ordered(anchor, focus)),
            _ => None,
        }
    }
}

impl EditorView for MemoryEngine {
    fn editor_id(&self) -> EditorId {
        self.state.editor_id()
    }

    fn selection(&self) -> EngineSelection {
        self.state.selection()
    }

    fn is_editable(&self) -> bool {
        self.state.is_editable()
    }

    fn is_composing(&self) -> bool {
        self.state.is_composing()
    }

    fn selection_rect(&self) -> Option<Rect> {
        self.state.selection_rect()
    }

    fn rect_for_snapshot(&self, snapshot: &SelectionSnapshot) -> Option<Rect> {
        self.state.rect_for_snapshot(snapshot)
    }

    fn root_anchor(&self) -> Option<AnchorFrame> {
        self.state.root_anchor()
    }
}

impl DocumentEngine for MemoryEngine {
    fn register_command(
        &mut self,
        kind: CommandKind,
        priority: CommandPriority,
        handler: CommandHandler,
    ) -> ListenerId {
        self.registry.register_command(kind, priority, handler)
    }

    fn register_update_listener(&mut self, listener: UpdateListener) -> ListenerId {
        self.registry.register_update_listener(listener)
    }

    fn unregister(&mut self, id: ListenerId) -> bool {
        self.registry.unregister(id)
    }

    fn dispatch_command(&mut self, command: &EditorCommand) -> bool {
        if self.registry.dispatch(command, &self.state) {
            return true;
        }
        match command {
            EditorCommand::ToggleLink(attributes) => {
                match self.toggle_link(attributes.clone()) {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::debug!(%err, "toggle link command ignored");
                        false
                    }
                }
            }
            _ => false,
        }
    }

    fn toggle_link(&mut self, link: Option<LinkAttributes>) -> Result<(), EngineError> {
        if !self.state.editable {
            return Err(EngineError::ReadOnly);
        }
        match (self.state.selection, link) {
            (Selection::None, _) => return Err(EngineError::NoSelection),
            (Selection::Node(key), Some(attributes)) => {
                self.state.document.update_link(key, attributes)?;
            }
            (Selection::Node(key), None) => {
                self.state.document.unwrap_links(&[key]);
                self.state.selection = Selection::None;
            }
            (Selection::Range { anchor, focus }, Some(attributes)) => {
                let existing = self
                    .state
                    .range_selection(anchor, focus)
                    .and_then(|range| link_for_range(&range));
                match existing {
                    Some(link) => self.state.document.update_link(link.key, attributes)?,
                    None => {
                        let (start, end) = EngineState::ordered(anchor, focus);
                        if start == end {
                            return Err(EngineError::NoSelection);
                        }
                        let key = self.state.document.wrap(start, end, attributes);
                        tracing::debug!(?key, "link created");
                    }
                }
            }
            (Selection::Range { .. }, None) => {
                let Some((start, end)) = self.range_bounds() else {
                    return Err(EngineError::NoSelection);
                };
                let mut keys: Vec<NodeKey> = if start == end {
                    self.state
                        .range_selection(start, end)
                        .map(|range| range.node_links.into_iter().flatten().collect())
                        .unwrap_or_default()
                } else {
                    self.state
                        .document
                        .spans_in(start, end)
                        .into_iter()
                        .filter_map(|span| span.link)
                        .collect()
                };
                keys.dedup();
                self.state.document.unwrap_links(&keys);
            }
        }
        self.committed();
        Ok(())
    }

    fn replace_link_node(
        &mut self,
        key: NodeKey,
        attributes: LinkAttributes,
    ) -> Result<NodeKey, EngineError> {
        if !self.state.editable {
            return Err(EngineError::ReadOnly);
        }
        let replacement = self.state.document.replace_link(key, attributes)?;
        if self.state.selection == Selection::Node(key) {
            self.state.selection = Selection::Node(replacement);
        }
        tracing::debug!(?key, ?replacement, "link node replaced");
        self.committed();
        Ok(replacement)
    }

    fn restore_selection(&mut self, snapshot: &SelectionSnapshot) -> Result<(), EngineError> {
        self.state.selection = match snapshot {
            SelectionSnapshot::Range(range) => {
                let (anchor, focus) = self
                    .state
                    .range_positions(range)
                    .ok_or(EngineError::UnknownNode(range.anchor.node))?;
                Selection::Range { anchor, focus }
            }
            SelectionSnapshot::Node(nodes) => {
                let key = nodes.nodes.first().copied().ok_or(EngineError::NoSelection)?;
                if self.state.document.link(key).is_none() {
                    return Err(EngineError::UnknownNode(key));
                }
                Selection::Node(key)
            }
        };
        self.state.selection_in_root = true;
        self.committed();
        Ok(())
    }
}
