//! Link editor: the link session bound to an engine and a floating panel.

use crate::anchor::{AnchorFrame, AnchorSource};
use crate::config::OverlayConfig;
use crate::engine::{
    DocumentEngine, EditorId, EditorView, EngineSelection, LinkAttributes, RangeSelection,
    SelectionSnapshot,
};
use crate::geometry::{
    FloatingPanel, GeometryEngine, OverlayVisualState, PositionRequest, TextAlignment,
};
use crate::host::{ElementId, ElementTree, InputRef};
use crate::link::props::LinkEditorProps;
use crate::link::session::{LinkSession, LinkStatus};
use crate::rect::Rect;
use crate::selection::{link_for_range, link_for_selection};
use crate::url::sanitize_url;

/// What a submit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The link was written and the session is Viewing.
    Committed,
    /// The input is empty, the placeholder, or not a URL; nothing happened.
    Rejected,
    /// Not in Editing; nothing happened.
    NotEditing,
    /// The engine refused the command; the session stays in Editing.
    EngineFailed,
}

/// The link editing state machine plus its panel.
#[derive(Debug, Clone)]
pub struct LinkEditor {
    session: LinkSession,
    panel: FloatingPanel,
    input: InputRef,
    geometry: GeometryEngine,
    vertical_gap: f64,
    horizontal_offset: f64,
    anchor: AnchorSource,
    last_anchor: Option<AnchorFrame>,
    focus_inside: bool,
    focus_request: Option<InputRef>,
    active_editor: Option<EditorId>,
}

impl LinkEditor {
    /// Create a hidden link editor.
    pub fn new(config: &OverlayConfig, panel: FloatingPanel, input: InputRef) -> Self {
        Self {
            session: LinkSession::new(),
            panel,
            input,
            geometry: GeometryEngine::new(config.geometry),
            vertical_gap: config.link_gap(),
            horizontal_offset: config.geometry.horizontal_offset,
            anchor: AnchorSource::Editor,
            last_anchor: None,
            focus_inside: false,
            focus_request: None,
            active_editor: None,
        }
    }

    /// Use an explicit anchor instead of the editor's root container.
    pub fn with_anchor(mut self, anchor: AnchorSource) -> Self {
        self.anchor = anchor;
        self
    }

    /// Replace the anchor source.
    pub fn set_anchor(&mut self, anchor: AnchorSource) {
        self.anchor = anchor;
    }

    /// The session.
    pub fn session(&self) -> &LinkSession {
        &self.session
    }

    /// Current status.
    pub fn status(&self) -> LinkStatus {
        self.session.status()
    }

    /// The panel is showing a link (viewing or editing).
    pub fn is_link(&self) -> bool {
        self.session.is_active()
    }

    /// The editor whose selection change last reached this link editor.
    pub fn active_editor(&self) -> Option<EditorId> {
        self.active_editor
    }

    /// Record a selection change coming from `editor`.
    pub fn set_active_editor(&mut self, editor: EditorId) {
        self.active_editor = Some(editor);
    }

    /// Re-derive the session from the engine's selection, then reposition.
    pub fn refresh(&mut self, view: &dyn EditorView) -> OverlayVisualState {
        self.sync(view);
        self.reposition(view)
    }

    fn sync(&mut self, view: &dyn EditorView) {
        let selection = view.selection();
        match &selection {
            EngineSelection::Range(range) if range.anchor_in_root => {
                self.track_range(range.clone())
            }
            EngineSelection::Node(nodes) => match link_for_selection(&selection) {
                Some(link) => self.session.view(link, SelectionSnapshot::of_nodes(nodes.clone())),
                None => self.hide_if_active("node selection outside link"),
            },
            _ => {
                // With focus in the URL input the engine reports no selection; the snapshot
                // stands in for it.
                if !self.focus_inside {
                    self.hide_if_active("selection left editable root");
                }
            }
        }
    }

    fn track_range(&mut self, range: RangeSelection) {
        if let Some(link) = link_for_range(&range) {
            self.session.view(link, SelectionSnapshot::new(range));
            return;
        }
        let same_insert = self.session.is_insert_pending()
            && self
                .session
                .last_selection()
                .is_some_and(|snapshot| snapshot.same_range(&range));
        if !same_insert {
            self.hide_if_active("selection left link");
        }
    }

    fn hide_if_active(&mut self, trigger: &'static str) {
        if self.session.is_active() {
            self.session.hide(trigger);
        }
    }

    /// Recompute the panel position from the current session without changing its status.
    pub fn reposition(&mut self, view: &dyn EditorView) -> OverlayVisualState {
        self.last_anchor = self.anchor.resolve(view);
        let Some(anchor) = self.last_anchor else {
            self.panel.apply(OverlayVisualState::HIDDEN);
            return OverlayVisualState::HIDDEN;
        };
        let (target_rect, text_alignment) = self.target(view);
        let request = PositionRequest {
            target_rect,
            vertical_gap: self.vertical_gap,
            horizontal_offset: self.horizontal_offset,
            is_link_flip: true,
            text_alignment,
        };
        let state = self.geometry.compute(&request, &self.panel.rect(), &anchor);
        self.panel.apply(state);
        state
    }

    fn target(&self, view: &dyn EditorView) -> (Option<Rect>, TextAlignment) {
        if !self.session.is_active() {
            return (None, TextAlignment::Start);
        }
        match view.selection() {
            EngineSelection::Range(range) if range.anchor_in_root => {
                (view.selection_rect(), range.alignment)
            }
            EngineSelection::Node(_) => (view.selection_rect(), TextAlignment::Start),
            _ => match self.session.last_selection() {
                Some(snapshot) => (view.rect_for_snapshot(snapshot), snapshot.alignment()),
                None => (None, TextAlignment::Start),
            },
        }
    }

    /// The host's insert-link action.
    ///
    /// Over plain text this starts editing a new link from the placeholder URL; inside an
    /// existing link it edits that link. Without a usable selection the session resets.
    pub fn insert_link(&mut self, view: &dyn EditorView) {
        let range = match view.selection() {
            EngineSelection::Range(range) if range.anchor_in_root && view.is_editable() => range,
            _ => {
                self.session.hide("insert link without selection");
                return;
            }
        };
        match link_for_range(&range) {
            Some(link) => self
                .session
                .begin_edit_of(link, SelectionSnapshot::new(range)),
            None if range.is_collapsed() => {
                self.session.hide("insert link on a caret");
                return;
            }
            None => self.session.begin_insert(SelectionSnapshot::new(range)),
        }
        self.focus_request = Some(self.input);
    }

    /// Viewing → Editing.
    pub fn start_edit(&mut self) {
        if self.session.start_edit() {
            self.focus_request = Some(self.input);
        }
    }

    /// Update the URL input.
    pub fn set_edited_url(&mut self, url: impl Into<String>) {
        self.session.set_edited_url(url);
    }

    /// Leave Editing without committing.
    pub fn cancel_edit(&mut self) {
        self.session.cancel("cancel");
    }

    /// Escape key. Returns `true` if a session was active and the key is consumed.
    ///
    /// Editing falls back like a cancel; Viewing closes the panel.
    pub fn escape(&mut self) -> bool {
        match self.session.status() {
            LinkStatus::Hidden => false,
            LinkStatus::Editing => self.session.cancel("escape"),
            LinkStatus::Viewing => {
                self.session.hide("escape");
                true
            }
        }
    }

    /// Commit the edited URL.
    ///
    /// The URL is sanitized first. An auto-detected link is replaced by a manual one that
    /// keeps its `rel`/`target`/`title`; otherwise the selection is toggled to the link.
    pub fn submit<E: DocumentEngine>(&mut self, engine: &mut E) -> SubmitOutcome {
        if !self.session.is_editing() {
            return SubmitOutcome::NotEditing;
        }
        if !self.session.can_submit() {
            tracing::debug!(edited = self.session.edited_url(), "submit rejected");
            return SubmitOutcome::Rejected;
        }
        let url = sanitize_url(self.session.edited_url());
        self.restore_selection(engine);

        let result = match self.session.link() {
            Some(link) if link.kind.is_auto() => engine
                .replace_link_node(link.key, link.attributes.with_url(url.as_str()))
                .map(|_| ()),
            Some(link) => engine.toggle_link(Some(link.attributes.with_url(url.as_str()))),
            None => engine.toggle_link(Some(LinkAttributes::new(url.as_str()))),
        };
        if let Err(err) = result {
            tracing::warn!(%err, "link submit failed");
            return SubmitOutcome::EngineFailed;
        }
        self.session.commit(url);
        SubmitOutcome::Committed
    }

    /// Remove the link under the selection and close the session.
    ///
    /// The removal command is sent whatever the session state.
    pub fn delete<E: DocumentEngine>(&mut self, engine: &mut E) {
        self.restore_selection(engine);
        if let Err(err) = engine.toggle_link(None) {
            tracing::warn!(%err, "link removal failed");
        }
        self.session.hide("delete");
        self.panel.apply(OverlayVisualState::HIDDEN);
    }

    fn restore_selection<E: DocumentEngine>(&self, engine: &mut E) {
        let live = match engine.selection() {
            EngineSelection::Range(range) => range.anchor_in_root,
            EngineSelection::Node(_) => true,
            EngineSelection::None => false,
        };
        if live {
            return;
        }
        if let Some(snapshot) = self.session.last_selection()
            && let Err(err) = engine.restore_selection(snapshot)
        {
            tracing::warn!(%err, "could not restore link selection");
        }
    }

    /// Focus moved to `focused` (`None`: nothing focused).
    ///
    /// Leaving the panel for anything outside it ends the session.
    pub fn on_focus_change(&mut self, tree: &dyn ElementTree, focused: Option<ElementId>) {
        let root = self.panel.element();
        let inside = focused.is_some_and(|element| tree.is_descendant(root, element));
        let was_inside = std::mem::replace(&mut self.focus_inside, inside);
        if was_inside && !inside && self.session.is_active() {
            self.session.hide("focus left overlay");
            self.panel.apply(OverlayVisualState::HIDDEN);
        }
    }

    /// Focus currently sits inside the panel.
    pub fn is_focus_inside(&self) -> bool {
        self.focus_inside
    }

    /// Take the pending request to focus the URL input. Hosts call this once per paint.
    pub fn take_focus_request(&mut self) -> Option<InputRef> {
        self.focus_request.take()
    }

    /// Pointer moved; may suppress pointer input during a drag-selection.
    pub fn on_pointer_move(&mut self, buttons: u16, x: f64, y: f64) {
        self.panel.on_pointer_move(buttons, x, y, self.last_anchor.as_ref());
    }

    /// Pointer released.
    pub fn on_pointer_up(&mut self) {
        self.panel.on_pointer_up();
    }

    /// Resize the panel (view and edit modes usually differ in size).
    pub fn resize_panel(&mut self, width: f64, height: f64) {
        self.panel.resize(width, height);
    }

    /// The state to render.
    pub fn visual_state(&self) -> OverlayVisualState {
        self.panel.effective_state()
    }

    /// Render-facing snapshot.
    pub fn props(&self) -> LinkEditorProps {
        LinkEditorProps {
            status: self.session.status(),
            is_editing: self.session.is_editing(),
            link_url: self.session.current_url().to_string(),
            edited_url: self.session.edited_url().to_string(),
            is_valid_url: self.session.is_valid_url(),
            can_submit: self.session.can_submit(),
            input: self.input,
            visual: self.visual_state(),
        }
    }
}
