//! Command and listener registry.
//!
//! Engines route editor commands (selection change, key presses, link toggles) through a
//! priority-ordered handler list and notify update listeners after each committed change.
//! [`ListenerRegistry`] is the reusable implementation of both; an engine embeds one and
//! forwards its [`DocumentEngine`](crate::engine::DocumentEngine) registration methods to it.
//!
//! # Example
//!
//! ```rust
//! use overlay_core::commands::{CommandKind, CommandPriority, EditorCommand, ListenerRegistry};
//! # use overlay_core::{AnchorFrame, EditorId, EditorView, EngineSelection, Rect, SelectionSnapshot};
//! # struct View;
//! # impl EditorView for View {
//! #     fn editor_id(&self) -> EditorId { EditorId(0) }
//! #     fn selection(&self) -> EngineSelection { EngineSelection::None }
//! #     fn is_editable(&self) -> bool { true }
//! #     fn is_composing(&self) -> bool { false }
//! #     fn selection_rect(&self) -> Option<Rect> { None }
//! #     fn rect_for_snapshot(&self, _: &SelectionSnapshot) -> Option<Rect> { None }
//! #     fn root_anchor(&self) -> Option<AnchorFrame> { None }
//! # }
//!
//! let mut registry = ListenerRegistry::new();
//! registry.register_command(
//!     CommandKind::KeyEscape,
//!     CommandPriority::Critical,
//!     Box::new(|_: &EditorCommand, _: &dyn EditorView| true),
//! );
//! assert!(registry.dispatch(&EditorCommand::KeyEscape, &View));
//! ```

use crate::engine::{EditorId, EditorView, LinkAttributes, UpdateListener};

/// Commands the overlay listens for or issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    /// The selection of `editor` changed.
    SelectionChange {
        /// The editor whose selection changed.
        editor: EditorId,
    },
    /// Escape key pressed.
    KeyEscape,
    /// Wrap/unwrap the selection in a link.
    ToggleLink(Option<LinkAttributes>),
    /// The host's "insert link" button or shortcut.
    InsertLink,
}

impl EditorCommand {
    /// The kind used to look up handlers.
    pub fn kind(&self) -> CommandKind {
        match self {
            EditorCommand::SelectionChange { .. } => CommandKind::SelectionChange,
            EditorCommand::KeyEscape => CommandKind::KeyEscape,
            EditorCommand::ToggleLink(_) => CommandKind::ToggleLink,
            EditorCommand::InsertLink => CommandKind::InsertLink,
        }
    }
}

/// Command discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// [`EditorCommand::SelectionChange`]
    SelectionChange,
    /// [`EditorCommand::KeyEscape`]
    KeyEscape,
    /// [`EditorCommand::ToggleLink`]
    ToggleLink,
    /// [`EditorCommand::InsertLink`]
    InsertLink,
}

/// Handler priority. Higher runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommandPriority {
    /// The engine's own default behavior.
    Editor = 0,
    /// Plugins that only observe.
    Low = 1,
    /// Regular plugin handlers.
    Normal = 2,
    /// Handlers that must pre-empt regular plugins.
    High = 3,
    /// Runs before everything else.
    Critical = 4,
}

/// Handle returned by every registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Command handler. Returning `true` marks the command handled and stops propagation.
pub type CommandHandler = Box<dyn FnMut(&EditorCommand, &dyn EditorView) -> bool>;

struct CommandEntry {
    id: ListenerId,
    kind: CommandKind,
    priority: CommandPriority,
    handler: CommandHandler,
}

/// Priority-ordered command handlers plus update listeners.
#[derive(Default)]
pub struct ListenerRegistry {
    commands: Vec<CommandEntry>,
    updates: Vec<(ListenerId, UpdateListener)>,
    next_id: u64,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> ListenerId {
        self.next_id += 1;
        ListenerId(self.next_id)
    }

    /// Register a command handler.
    ///
    /// Handlers of equal priority run in registration order.
    pub fn register_command(
        &mut self,
        kind: CommandKind,
        priority: CommandPriority,
        handler: CommandHandler,
    ) -> ListenerId {
        let id = self.allocate_id();
        // Stable insert keeps registration order within a priority band.
        let index = self
            .commands
            .iter()
            .position(|entry| entry.priority < priority)
            .unwrap_or(self.commands.len());
        self.commands.insert(
            index,
            CommandEntry {
                id,
                kind,
                priority,
                handler,
            },
        );
        id
    }

    /// Register an update listener.
    pub fn register_update_listener(&mut self, listener: UpdateListener) -> ListenerId {
        let id = self.allocate_id();
        self.updates.push((id, listener));
        id
    }

    /// Remove a command handler or update listener.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.commands.len() + self.updates.len();
        self.commands.retain(|entry| entry.id != id);
        self.updates.retain(|(listener_id, _)| *listener_id != id);
        before != self.commands.len() + self.updates.len()
    }

    /// Run handlers for `command` from highest to lowest priority until one returns `true`.
    pub fn dispatch(&mut self, command: &EditorCommand, view: &dyn EditorView) -> bool {
        let kind = command.kind();
        for entry in self.commands.iter_mut().filter(|entry| entry.kind == kind) {
            if (entry.handler)(command, view) {
                tracing::trace!(?kind, priority = ?entry.priority, "command handled");
                return true;
            }
        }
        false
    }

    /// Call every update listener.
    pub fn notify_update(&mut self, view: &dyn EditorView) {
        for (_, listener) in &mut self.updates {
            listener(view);
        }
    }

    /// Number of registered handlers and listeners.
    pub fn len(&self) -> usize {
        self.commands.len() + self.updates.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::AnchorFrame;
    use crate::engine::{EngineSelection, SelectionSnapshot};
    use crate::rect::Rect;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct NullView;

    impl EditorView for NullView {
        fn editor_id(&self) -> EditorId {
            EditorId(1)
        }
        fn selection(&self) -> EngineSelection {
            EngineSelection::None
        }
        fn is_editable(&self) -> bool {
            true
        }
        fn is_composing(&self) -> bool {
            false
        }
        fn selection_rect(&self) -> Option<Rect> {
            None
        }
        fn rect_for_snapshot(&self, _snapshot: &SelectionSnapshot) -> Option<Rect> {
            None
        }
        fn root_anchor(&self) -> Option<AnchorFrame> {
            None
        }
    }

    fn recorder(
        log: &Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
        handled: bool,
    ) -> CommandHandler {
        let log = Rc::clone(log);
        Box::new(move |_: &EditorCommand, _: &dyn EditorView| {
            log.borrow_mut().push(name);
            handled
        })
    }

    #[test]
    fn test_priority_order_and_propagation() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        registry.register_command(
            CommandKind::KeyEscape,
            CommandPriority::Low,
            recorder(&log, "low", false),
        );
        registry.register_command(
            CommandKind::KeyEscape,
            CommandPriority::Critical,
            recorder(&log, "critical", false),
        );
        registry.register_command(
            CommandKind::KeyEscape,
            CommandPriority::Normal,
            recorder(&log, "normal-1", true),
        );
        registry.register_command(
            CommandKind::KeyEscape,
            CommandPriority::Normal,
            recorder(&log, "normal-2", true),
        );

        assert!(registry.dispatch(&EditorCommand::KeyEscape, &NullView));
        assert_eq!(*log.borrow(), vec!["critical", "normal-1"]);
    }

    #[test]
    fn test_kind_filter_and_unregister() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        let id = registry.register_command(
            CommandKind::InsertLink,
            CommandPriority::Normal,
            recorder(&log, "insert", true),
        );

        assert!(!registry.dispatch(&EditorCommand::KeyEscape, &NullView));
        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert!(!registry.dispatch(&EditorCommand::InsertLink, &NullView));
        assert!(log.borrow().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_update_listeners_called() {
        let count = Rc::new(RefCell::new(0));
        let count_clone = Rc::clone(&count);
        let mut registry = ListenerRegistry::new();
        registry.register_update_listener(Box::new(move |_: &dyn EditorView| {
            *count_clone.borrow_mut() += 1
        }));
        registry.notify_update(&NullView);
        registry.notify_update(&NullView);
        assert_eq!(*count.borrow(), 2);
    }
}
