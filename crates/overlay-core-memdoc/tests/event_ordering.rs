//! Subscription lifecycle, handler priority and re-entrant notifications.

use std::cell::Cell;
use std::rc::Rc;

use overlay_core::{
    CommandKind, CommandPriority, DocumentEngine, EditorCommand, EditorId, EditorView, ElementId,
    FloatingOverlays, LinkEditorActions, LinkStatus, OverlayConfig, OverlayElements, PanelSizes,
    SubmitOutcome,
};
use overlay_core_memdoc::{DocPosition, MemoryEngine};
use pretty_assertions::assert_eq;

fn attach(engine: &mut MemoryEngine) -> FloatingOverlays {
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
fn test_escape_reaches_lower_handlers_only_without_a_session() {
    let mut engine = MemoryEngine::new("see [docs](https://docs.rs) now");
    let overlays = attach(&mut engine);

    let fallthrough = Rc::new(Cell::new(0));
    engine.register_command(CommandKind::KeyEscape, CommandPriority::Low, {
        let fallthrough = Rc::clone(&fallthrough);
        Box::new(move |_: &EditorCommand, _: &dyn EditorView| {
            fallthrough.set(fallthrough.get() + 1);
            true
        })
    });

    assert!(engine.press_escape());
    assert_eq!(fallthrough.get(), 1);

    engine.set_caret(DocPosition::new(0, 6));
    assert_eq!(overlays.link_status(), LinkStatus::Viewing);
    assert!(engine.press_escape());
    assert_eq!(fallthrough.get(), 1);
    assert_eq!(overlays.link_status(), LinkStatus::Hidden);

    assert!(engine.press_escape());
    assert_eq!(fallthrough.get(), 2);
}

#[test]
fn test_submit_survives_synchronous_notifications() {
    let mut engine = MemoryEngine::new("hello world");
    let mut overlays = attach(&mut engine);

    let updates = Rc::new(Cell::new(0));
    engine.register_update_listener({
        let updates = Rc::clone(&updates);
        Box::new(move |_: &dyn EditorView| updates.set(updates.get() + 1))
    });

    engine.select_text("world");
    assert!(overlays.insert_link(&mut engine));
    overlays.set_edited_url("https://example.com");
    assert_eq!(overlays.submit_link(&mut engine), SubmitOutcome::Committed);

    // The engine notified while the overlays were mid-submit; the queued refresh ran after.
    assert!(updates.get() >= 1);
    assert_eq!(overlays.replayed_events(), 1);
    assert_eq!(overlays.link_status(), LinkStatus::Viewing);
    assert_eq!(overlays.link_props().link_url, "https://example.com");
    assert!(overlays.bubble_is_link());
    assert!(overlays.bubble_state().is_visible());
}

#[test]
fn test_detach_releases_every_subscription() {
    let mut engine = MemoryEngine::new("hello");
    assert_eq!(engine.listener_count(), 0);

    let overlays = attach(&mut engine);
    assert_eq!(overlays.subscription_count(), 4);
    assert_eq!(engine.listener_count(), 4);

    overlays.detach(&mut engine);
    assert_eq!(engine.listener_count(), 0);
    // Nobody handles escape any more.
    assert!(!engine.press_escape());
}

#[test]
fn test_active_editor_follows_selection_changes() {
    let mut first = MemoryEngine::new("one").with_id(EditorId(7));
    let mut second = MemoryEngine::new("two").with_id(EditorId(8));
    let first_overlays = attach(&mut first);
    let second_overlays = attach(&mut second);
    assert_eq!(first_overlays.active_editor(), None);

    first.select_text("one");
    assert_eq!(first_overlays.active_editor(), Some(EditorId(7)));
    assert_eq!(second_overlays.active_editor(), None);

    second.select_text("two");
    assert_eq!(second_overlays.active_editor(), Some(EditorId(8)));
}

#[test]
fn test_equal_priority_runs_in_registration_order() {
    let mut engine = MemoryEngine::new("see [docs](https://docs.rs) now");
    let overlays = attach(&mut engine);

    let late = Rc::new(Cell::new(false));
    engine.register_command(CommandKind::KeyEscape, CommandPriority::Critical, {
        let late = Rc::clone(&late);
        Box::new(move |_: &EditorCommand, _: &dyn EditorView| {
            late.set(true);
            true
        })
    });

    engine.set_caret(DocPosition::new(0, 6));
    assert!(engine.press_escape());
    assert_eq!(overlays.link_status(), LinkStatus::Hidden);
    assert!(!late.get());
}
