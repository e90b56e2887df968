//! Overlay orchestration.
//!
//! [`FloatingOverlays`] wires a [`BubbleOverlay`] and a [`LinkEditor`] to a
//! [`DocumentEngine`]:
//!
//! - an update listener and a selection-change handler recompute both overlays;
//! - an Escape handler at [`CommandPriority::Critical`] closes the link session before any
//!   other handler sees the key;
//! - an insert-link handler starts a new link.
//!
//! Within one refresh the link session is derived first, then the bubble (which hides while
//! the link editor is editing), each deciding visibility before computing geometry.
//!
//! Engine callbacks that arrive while an action is still running (a submit that makes the
//! engine notify its listeners synchronously) are queued and replayed once the action has
//! finished, so a transition always completes before the next one starts. Escape is the
//! exception: while busy it is left to lower-priority handlers.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::anchor::AnchorSource;
use crate::bubble::BubbleOverlay;
use crate::commands::{CommandKind, CommandPriority, EditorCommand, ListenerId};
use crate::config::OverlayConfig;
use crate::engine::{DocumentEngine, EditorId, EditorView};
use crate::geometry::{FloatingPanel, OverlayVisualState};
use crate::host::{ElementId, ElementTree, InputRef};
use crate::link::{
    LinkEditor, LinkEditorActions, LinkEditorProps, LinkEditorRenderer, LinkStatus,
    SubmitOutcome,
};

struct Overlays {
    bubble: BubbleOverlay,
    link: LinkEditor,
}

impl Overlays {
    fn refresh(&mut self, view: &dyn EditorView) {
        self.link.refresh(view);
        let suppressed = self.link.session().is_editing();
        self.bubble.refresh(view, suppressed);
    }

    fn reposition(&mut self, view: &dyn EditorView) {
        self.link.reposition(view);
        let suppressed = self.link.session().is_editing();
        self.bubble.refresh(view, suppressed);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    Refresh,
    SelectionChange(EditorId),
    Escape,
    InsertLink,
}

type Shared = Rc<RefCell<Overlays>>;
type Queue = Rc<RefCell<VecDeque<Deferred>>>;

/// The bubble toolbar and link editor of one editor, subscribed to its engine.
pub struct FloatingOverlays {
    overlays: Shared,
    queue: Queue,
    subscriptions: Vec<ListenerId>,
    replayed: Cell<usize>,
}

/// Element ids for the two panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayElements {
    /// Bubble toolbar root.
    pub bubble: ElementId,
    /// Link editor root.
    pub link: ElementId,
    /// Link editor URL input.
    pub link_input: ElementId,
}

/// Measured panel sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSizes {
    /// Bubble toolbar `(width, height)`.
    pub bubble: (f64, f64),
    /// Link editor `(width, height)`.
    pub link: (f64, f64),
}

impl FloatingOverlays {
    /// Build both overlays and subscribe them to `engine`.
    pub fn attach<E: DocumentEngine>(
        engine: &mut E,
        config: OverlayConfig,
        elements: OverlayElements,
        sizes: PanelSizes,
    ) -> Self {
        let bubble = BubbleOverlay::new(
            &config,
            FloatingPanel::new(elements.bubble, sizes.bubble.0, sizes.bubble.1),
        );
        let link = LinkEditor::new(
            &config,
            FloatingPanel::new(elements.link, sizes.link.0, sizes.link.1),
            InputRef::new(elements.link_input),
        );
        let overlays: Shared = Rc::new(RefCell::new(Overlays { bubble, link }));
        let queue: Queue = Rc::new(RefCell::new(VecDeque::new()));

        let mut subscriptions = Vec::with_capacity(4);
        subscriptions.push(engine.register_update_listener({
            let (overlays, queue) = (Rc::clone(&overlays), Rc::clone(&queue));
            Box::new(move |view: &dyn EditorView| {
                run_or_defer(&overlays, &queue, Deferred::Refresh, view);
            })
        }));
        subscriptions.push(engine.register_command(
            CommandKind::SelectionChange,
            CommandPriority::Low,
            {
                let (overlays, queue) = (Rc::clone(&overlays), Rc::clone(&queue));
                Box::new(move |command: &EditorCommand, view: &dyn EditorView| {
                    let editor = match command {
                        EditorCommand::SelectionChange { editor } => *editor,
                        _ => view.editor_id(),
                    };
                    run_or_defer(&overlays, &queue, Deferred::SelectionChange(editor), view);
                    false
                })
            },
        ));
        subscriptions.push(engine.register_command(
            CommandKind::KeyEscape,
            CommandPriority::Critical,
            {
                let (overlays, queue) = (Rc::clone(&overlays), Rc::clone(&queue));
                Box::new(move |_: &EditorCommand, view: &dyn EditorView| {
                    run_or_defer(&overlays, &queue, Deferred::Escape, view)
                })
            },
        ));
        subscriptions.push(engine.register_command(
            CommandKind::InsertLink,
            CommandPriority::Normal,
            {
                let (overlays, queue) = (Rc::clone(&overlays), Rc::clone(&queue));
                Box::new(move |_: &EditorCommand, view: &dyn EditorView| {
                    run_or_defer(&overlays, &queue, Deferred::InsertLink, view)
                })
            },
        ));

        let this = Self {
            overlays,
            queue,
            subscriptions,
            replayed: Cell::new(0),
        };
        this.overlays.borrow_mut().refresh(&*engine);
        this
    }

    /// Unsubscribe from `engine`. The overlays stop reacting to it.
    pub fn detach<E: DocumentEngine>(mut self, engine: &mut E) {
        for id in self.subscriptions.drain(..) {
            engine.unregister(id);
        }
        self.queue.borrow_mut().clear();
    }

    /// Position both overlays against an explicit anchor instead of the editor's root.
    pub fn set_anchor(&self, anchor: AnchorSource) {
        let mut overlays = self.overlays.borrow_mut();
        overlays.bubble.set_anchor(anchor);
        overlays.link.set_anchor(anchor);
    }

    /// Recompute everything from the engine's current state.
    pub fn refresh(&self, view: &dyn EditorView) {
        self.overlays.borrow_mut().refresh(view);
        self.flush(view);
    }

    /// The window was resized.
    pub fn on_resize(&self, view: &dyn EditorView) {
        tracing::trace!("overlay reposition on resize");
        self.reposition(view);
    }

    /// The editor's scroller scrolled.
    pub fn on_scroll(&self, view: &dyn EditorView) {
        tracing::trace!("overlay reposition on scroll");
        self.reposition(view);
    }

    /// Re-place both panels without re-deriving the link session, so a session closed with
    /// Escape stays closed until the selection changes.
    fn reposition(&self, view: &dyn EditorView) {
        self.overlays.borrow_mut().reposition(view);
        self.flush(view);
    }

    /// Pointer moved with `buttons` held.
    pub fn on_pointer_move(&self, buttons: u16, x: f64, y: f64) {
        let mut overlays = self.overlays.borrow_mut();
        overlays.bubble.on_pointer_move(buttons, x, y);
        overlays.link.on_pointer_move(buttons, x, y);
    }

    /// Pointer released.
    pub fn on_pointer_up(&self) {
        let mut overlays = self.overlays.borrow_mut();
        overlays.bubble.on_pointer_up();
        overlays.link.on_pointer_up();
    }

    /// Keyboard focus moved to `focused`.
    pub fn on_focus_change(
        &self,
        view: &dyn EditorView,
        tree: &dyn ElementTree,
        focused: Option<ElementId>,
    ) {
        {
            let mut overlays = self.overlays.borrow_mut();
            overlays.link.on_focus_change(tree, focused);
            overlays.reposition(view);
        }
        self.flush(view);
    }

    /// Run the insert-link command through the engine's command pipeline.
    pub fn insert_link<E: DocumentEngine>(&self, engine: &mut E) -> bool {
        let handled = engine.dispatch_command(&EditorCommand::InsertLink);
        self.flush(&*engine);
        handled
    }

    /// Resize the link panel (e.g. after switching between view and edit layouts).
    pub fn resize_link_panel(&self, view: &dyn EditorView, width: f64, height: f64) {
        {
            let mut overlays = self.overlays.borrow_mut();
            overlays.link.resize_panel(width, height);
            overlays.reposition(view);
        }
        self.flush(view);
    }

    fn flush(&self, view: &dyn EditorView) {
        loop {
            let Some(event) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            tracing::trace!(?event, "replaying deferred overlay event");
            self.replayed.set(self.replayed.get() + 1);
            apply(&mut self.overlays.borrow_mut(), event, view);
        }
    }

    /// Link editor props for rendering.
    pub fn link_props(&self) -> LinkEditorProps {
        self.overlays.borrow().link.props()
    }

    /// Render the link editor through `renderer`.
    pub fn render_link<R: LinkEditorRenderer>(&self, renderer: &mut R) {
        let props = self.link_props();
        renderer.render(&props);
    }

    /// Bubble toolbar visual state.
    pub fn bubble_state(&self) -> OverlayVisualState {
        self.overlays.borrow().bubble.visual_state()
    }

    /// Link editor visual state.
    pub fn link_state(&self) -> OverlayVisualState {
        self.overlays.borrow().link.visual_state()
    }

    /// Link session status.
    pub fn link_status(&self) -> LinkStatus {
        self.overlays.borrow().link.status()
    }

    /// The link editor is showing a link.
    pub fn is_link(&self) -> bool {
        self.overlays.borrow().link.is_link()
    }

    /// The selection under the bubble toolbar is inside a link.
    pub fn bubble_is_link(&self) -> bool {
        self.overlays.borrow().bubble.is_link()
    }

    /// The editor whose selection change last reached the overlays.
    pub fn active_editor(&self) -> Option<EditorId> {
        self.overlays.borrow().link.active_editor()
    }

    /// Take a pending request to focus the link input (call once per paint).
    pub fn take_focus_request(&self) -> Option<InputRef> {
        self.overlays.borrow_mut().link.take_focus_request()
    }

    /// Number of engine subscriptions held.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Engine callbacks that arrived during an action and were replayed after it.
    pub fn replayed_events(&self) -> usize {
        self.replayed.get()
    }
}

impl LinkEditorActions for FloatingOverlays {
    fn set_edited_url(&mut self, url: &str) {
        self.overlays.borrow_mut().link.set_edited_url(url);
    }

    fn submit_link<E: DocumentEngine>(&mut self, engine: &mut E) -> SubmitOutcome {
        let outcome = {
            let mut overlays = self.overlays.borrow_mut();
            let outcome = overlays.link.submit(engine);
            // The engine's update notification for the commit is queued; replaying it
            // re-derives the session.
            if outcome == SubmitOutcome::Committed {
                overlays.reposition(&*engine);
            }
            outcome
        };
        self.flush(&*engine);
        outcome
    }

    fn cancel_edit<E: DocumentEngine>(&mut self, engine: &mut E) {
        {
            let mut overlays = self.overlays.borrow_mut();
            overlays.link.cancel_edit();
            overlays.reposition(&*engine);
        }
        self.flush(&*engine);
    }

    fn start_edit(&mut self) {
        self.overlays.borrow_mut().link.start_edit();
    }

    fn delete_link<E: DocumentEngine>(&mut self, engine: &mut E) {
        {
            let mut overlays = self.overlays.borrow_mut();
            overlays.link.delete(engine);
            overlays.reposition(&*engine);
        }
        self.flush(&*engine);
    }
}

/// Run `event` now, or queue it if an action currently holds the overlays.
///
/// Returns whether the event was consumed (only meaningful for Escape). An Escape that
/// arrives while busy is not queued: it is reported unhandled and belongs to the next handler.
fn run_or_defer(overlays: &Shared, queue: &Queue, event: Deferred, view: &dyn EditorView) -> bool {
    match overlays.try_borrow_mut() {
        Ok(mut overlays) => apply(&mut overlays, event, view),
        Err(_) if event == Deferred::Escape => {
            tracing::trace!("overlay busy, escape passed on");
            false
        }
        Err(_) => {
            tracing::trace!(?event, "overlay busy, deferring");
            queue.borrow_mut().push_back(event);
            false
        }
    }
}

fn apply(overlays: &mut Overlays, event: Deferred, view: &dyn EditorView) -> bool {
    match event {
        Deferred::Refresh => {
            overlays.refresh(view);
            false
        }
        Deferred::SelectionChange(editor) => {
            overlays.link.set_active_editor(editor);
            overlays.refresh(view);
            false
        }
        Deferred::Escape => {
            let consumed = overlays.link.escape();
            if consumed {
                overlays.reposition(view);
            }
            consumed
        }
        Deferred::InsertLink => {
            overlays.link.insert_link(view);
            overlays.reposition(view);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::AnchorFrame;
    use crate::commands::{CommandHandler, ListenerRegistry};
    use crate::engine::{
        EngineSelection, LinkAttributes, LinkKind, NodeKey, SelectionSnapshot, UpdateListener,
    };
    use crate::error::EngineError;
    use crate::rect::Rect;
    use crate::selection::fixtures::{FakeView, link, point, range};
    use pretty_assertions::assert_eq;

    /// Engine whose view is set by hand and whose commits notify synchronously.
    struct ScriptedEngine {
        view: FakeView,
        registry: ListenerRegistry,
        selection_after_commit: Option<EngineSelection>,
        escape_during_commit: bool,
        toggled: Vec<Option<LinkAttributes>>,
    }

    impl ScriptedEngine {
        fn new(view: FakeView) -> Self {
            Self {
                view,
                registry: ListenerRegistry::new(),
                selection_after_commit: None,
                escape_during_commit: false,
                toggled: Vec::new(),
            }
        }
    }

    impl EditorView for ScriptedEngine {
        fn editor_id(&self) -> EditorId {
            self.view.editor_id()
        }
        fn selection(&self) -> EngineSelection {
            self.view.selection()
        }
        fn is_editable(&self) -> bool {
            self.view.is_editable()
        }
        fn is_composing(&self) -> bool {
            self.view.is_composing()
        }
        fn selection_rect(&self) -> Option<Rect> {
            self.view.selection_rect()
        }
        fn rect_for_snapshot(&self, snapshot: &SelectionSnapshot) -> Option<Rect> {
            self.view.rect_for_snapshot(snapshot)
        }
        fn root_anchor(&self) -> Option<AnchorFrame> {
            self.view.root_anchor()
        }
    }

    impl DocumentEngine for ScriptedEngine {
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
            self.registry.dispatch(command, &self.view)
        }

        fn toggle_link(&mut self, link: Option<LinkAttributes>) -> Result<(), EngineError> {
            self.toggled.push(link);
            if let Some(selection) = self.selection_after_commit.take() {
                self.view.selection = selection;
            }
            if self.escape_during_commit {
                self.registry.dispatch(&EditorCommand::KeyEscape, &self.view);
            }
            self.registry.notify_update(&self.view);
            Ok(())
        }

        fn replace_link_node(
            &mut self,
            key: NodeKey,
            _attributes: LinkAttributes,
        ) -> Result<NodeKey, EngineError> {
            Ok(key)
        }

        fn restore_selection(&mut self, _snapshot: &SelectionSnapshot) -> Result<(), EngineError> {
            Ok(())
        }
    }

    fn attach(engine: &mut ScriptedEngine) -> FloatingOverlays {
        FloatingOverlays::attach(
            engine,
            OverlayConfig::default(),
            OverlayElements {
                bubble: ElementId(2),
                link: ElementId(3),
                link_input: ElementId(4),
            },
            PanelSizes {
                bubble: (200.0, 36.0),
                link: (280.0, 44.0),
            },
        )
    }

    #[test]
    fn test_commit_notification_is_replayed() {
        let plain = range(point(1, 0, false, None), point(1, 5, true, None), "world");
        let mut engine = ScriptedEngine::new(FakeView::with_range(plain));
        let mut overlays = attach(&mut engine);

        assert!(overlays.insert_link(&mut engine));
        assert_eq!(overlays.link_status(), LinkStatus::Editing);
        overlays.set_edited_url("https://a.dev");

        // The engine collapses the selection into plain text while committing.
        engine.selection_after_commit = Some(EngineSelection::Range(range(
            point(2, 1, false, None),
            point(2, 1, false, None),
            "",
        )));
        assert_eq!(overlays.submit_link(&mut engine), SubmitOutcome::Committed);
        assert_eq!(engine.toggled.len(), 1);

        // Only the replayed update notification could have seen the moved selection.
        assert_eq!(overlays.replayed_events(), 1);
        assert_eq!(overlays.link_status(), LinkStatus::Hidden);
        assert_eq!(overlays.link_state(), OverlayVisualState::HIDDEN);
    }

    #[test]
    fn test_escape_while_busy_goes_to_lower_handlers_once() {
        let l = link(7, "https://a.dev", LinkKind::Manual);
        let in_link = range(
            point(2, 1, false, Some(l.clone())),
            point(2, 1, false, Some(l)),
            "",
        );
        let mut engine = ScriptedEngine::new(FakeView::with_range(in_link));
        let mut overlays = attach(&mut engine);
        assert_eq!(overlays.link_status(), LinkStatus::Viewing);

        let escapes = Rc::new(Cell::new(0));
        engine.register_command(CommandKind::KeyEscape, CommandPriority::Low, {
            let escapes = Rc::clone(&escapes);
            Box::new(move |_: &EditorCommand, _: &dyn EditorView| {
                escapes.set(escapes.get() + 1);
                true
            })
        });

        overlays.start_edit();
        overlays.set_edited_url("https://b.dev");
        engine.escape_during_commit = true;
        assert_eq!(overlays.submit_link(&mut engine), SubmitOutcome::Committed);

        assert_eq!(escapes.get(), 1);
        // Only the update notification was queued; the session was not closed afterwards.
        assert_eq!(overlays.replayed_events(), 1);
        assert_eq!(overlays.link_status(), LinkStatus::Viewing);
    }
}
