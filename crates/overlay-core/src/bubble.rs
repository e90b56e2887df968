//! Selection bubble toolbar.
//!
//! Shows a formatting toolbar above any non-empty text selection inside the editable root.
//! The visibility rules short-circuit: as soon as one fails the panel is hidden and no
//! geometry is computed.

use crate::anchor::{AnchorFrame, AnchorSource};
use crate::config::OverlayConfig;
use crate::engine::EditorView;
use crate::geometry::{FloatingPanel, GeometryEngine, OverlayVisualState, PositionRequest};
use crate::host::ElementId;
use crate::selection::{HiddenReason, bubble_range, link_for_range};

/// Result of the last visibility decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleVisibility {
    /// Shown above/below the selection.
    Visible,
    /// Hidden by a selection rule.
    Hidden(HiddenReason),
    /// Hidden because the link editor is editing.
    Suppressed,
}

/// Tracks the bubble toolbar's visibility and position.
#[derive(Debug, Clone)]
pub struct BubbleOverlay {
    panel: FloatingPanel,
    geometry: GeometryEngine,
    vertical_gap: f64,
    horizontal_offset: f64,
    anchor: AnchorSource,
    last_anchor: Option<AnchorFrame>,
    visibility: BubbleVisibility,
    is_link: bool,
}

impl BubbleOverlay {
    /// Create a hidden toolbar.
    pub fn new(config: &OverlayConfig, panel: FloatingPanel) -> Self {
        Self {
            panel,
            geometry: GeometryEngine::new(config.geometry),
            vertical_gap: config.bubble_gap(),
            horizontal_offset: config.geometry.horizontal_offset,
            anchor: AnchorSource::Editor,
            last_anchor: None,
            visibility: BubbleVisibility::Hidden(HiddenReason::NoRangeSelection),
            is_link: false,
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

    /// Recompute visibility and position from the editor's current state.
    ///
    /// `suppressed` hides the toolbar regardless of the selection (used while the link
    /// editor owns the selection).
    pub fn refresh(&mut self, view: &dyn EditorView, suppressed: bool) -> OverlayVisualState {
        self.last_anchor = self.anchor.resolve(view);

        let range = match bubble_range(view) {
            Ok(range) => range,
            Err(reason) => {
                tracing::trace!(?reason, "bubble hidden");
                self.is_link = false;
                return self.hide(BubbleVisibility::Hidden(reason));
            }
        };
        self.is_link = link_for_range(&range).is_some();
        if suppressed {
            return self.hide(BubbleVisibility::Suppressed);
        }

        self.visibility = BubbleVisibility::Visible;
        // Visible as far as the selection goes; without an anchor there is still nowhere
        // to draw it.
        let Some(anchor) = self.last_anchor else {
            self.panel.apply(OverlayVisualState::HIDDEN);
            return OverlayVisualState::HIDDEN;
        };
        let request = PositionRequest {
            target_rect: view.selection_rect(),
            vertical_gap: self.vertical_gap,
            horizontal_offset: self.horizontal_offset,
            is_link_flip: false,
            text_alignment: range.alignment,
        };
        let state = self.geometry.compute(&request, &self.panel.rect(), &anchor);
        self.panel.apply(state);
        state
    }

    fn hide(&mut self, visibility: BubbleVisibility) -> OverlayVisualState {
        self.visibility = visibility;
        self.panel.apply(OverlayVisualState::HIDDEN);
        OverlayVisualState::HIDDEN
    }

    /// Pointer moved; may suppress pointer input during a drag-selection.
    pub fn on_pointer_move(&mut self, buttons: u16, x: f64, y: f64) {
        self.panel.on_pointer_move(buttons, x, y, self.last_anchor.as_ref());
    }

    /// Pointer released; lifts drag suppression.
    pub fn on_pointer_up(&mut self) {
        self.panel.on_pointer_up();
    }

    /// The state to render: geometry output combined with drag suppression.
    pub fn visual_state(&self) -> OverlayVisualState {
        self.panel.effective_state()
    }

    /// Last visibility decision.
    pub fn visibility(&self) -> BubbleVisibility {
        self.visibility
    }

    /// Whether the selection the toolbar is attached to sits inside a link (toggle state of
    /// the toolbar's link button).
    pub fn is_link(&self) -> bool {
        self.is_link
    }

    /// The toolbar's panel.
    pub fn panel(&self) -> &FloatingPanel {
        &self.panel
    }

    /// The toolbar's root element.
    pub fn element(&self) -> ElementId {
        self.panel.element()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineSelection, LinkKind};
    use crate::geometry::{PointerEvents, TextAlignment};
    use crate::rect::Rect;
    use crate::selection::fixtures::{FakeView, link, point, range};
    use pretty_assertions::assert_eq;

    fn bubble() -> BubbleOverlay {
        BubbleOverlay::new(
            &OverlayConfig::default(),
            FloatingPanel::new(ElementId(1), 120.0, 40.0),
        )
    }

    fn text_view(text: &str) -> FakeView {
        FakeView::with_range(range(
            point(1, 0, false, None),
            point(1, text.chars().count(), true, None),
            text,
        ))
    }

    #[test]
    fn test_shown_above_selection() {
        let mut bubble = bubble();
        let state = bubble.refresh(&text_view("hello"), false);
        assert_eq!(state, OverlayVisualState::visible_at(95, 250));
        assert_eq!(bubble.visibility(), BubbleVisibility::Visible);
        assert!(!bubble.is_link());
    }

    #[test]
    fn test_rules_short_circuit_in_order() {
        let mut bubble = bubble();

        let mut view = text_view("hello");
        view.editable = false;
        view.composing = true;
        bubble.refresh(&view, false);
        assert_eq!(
            bubble.visibility(),
            BubbleVisibility::Hidden(HiddenReason::NotEditable)
        );

        view.editable = true;
        bubble.refresh(&view, false);
        assert_eq!(
            bubble.visibility(),
            BubbleVisibility::Hidden(HiddenReason::Composing)
        );

        let view = text_view("\n\n");
        assert_eq!(bubble.refresh(&view, false), OverlayVisualState::HIDDEN);
        assert_eq!(
            bubble.visibility(),
            BubbleVisibility::Hidden(HiddenReason::EmptyText)
        );

        let mut view = text_view("hello");
        view.selection = EngineSelection::None;
        bubble.refresh(&view, false);
        assert_eq!(
            bubble.visibility(),
            BubbleVisibility::Hidden(HiddenReason::NoRangeSelection)
        );
    }

    #[test]
    fn test_collapsed_and_outside_root_hidden() {
        let mut bubble = bubble();
        let caret = FakeView::with_range(range(
            point(1, 2, false, None),
            point(1, 2, false, None),
            "",
        ));
        bubble.refresh(&caret, false);
        assert_eq!(
            bubble.visibility(),
            BubbleVisibility::Hidden(HiddenReason::Collapsed)
        );

        let mut outside = range(point(1, 0, false, None), point(1, 3, true, None), "abc");
        outside.anchor_in_root = false;
        bubble.refresh(&FakeView::with_range(outside), false);
        assert_eq!(
            bubble.visibility(),
            BubbleVisibility::Hidden(HiddenReason::OutsideRoot)
        );
        assert_eq!(bubble.visual_state(), OverlayVisualState::HIDDEN);
    }

    #[test]
    fn test_link_flag_and_suppression() {
        let l = link(9, "https://a.dev", LinkKind::Manual);
        let view = FakeView::with_range(range(
            point(1, 0, false, Some(l.clone())),
            point(1, 3, false, Some(l)),
            "abc",
        ));
        let mut bubble = bubble();
        bubble.refresh(&view, false);
        assert!(bubble.is_link());

        assert_eq!(bubble.refresh(&view, true), OverlayVisualState::HIDDEN);
        assert_eq!(bubble.visibility(), BubbleVisibility::Suppressed);
        assert!(bubble.is_link());
    }

    #[test]
    fn test_end_aligned_block() {
        let mut r = range(point(1, 0, false, None), point(1, 5, true, None), "hello");
        r.alignment = TextAlignment::Right;
        let mut view = FakeView::with_range(r);
        view.selection_rect = Some(Rect::new(500.0, 300.0, 100.0, 20.0));
        let state = bubble().refresh(&view, false);
        // 600 - 120 + 5
        assert_eq!(state.translate_x, 485);
    }

    #[test]
    fn test_no_anchor_or_rect_hides_but_counts_as_visible() {
        let mut view = text_view("hello");
        view.anchor = None;
        let mut bubble = bubble();
        assert_eq!(bubble.refresh(&view, false), OverlayVisualState::HIDDEN);
        assert_eq!(bubble.visibility(), BubbleVisibility::Visible);

        let mut view = text_view("hello");
        view.selection_rect = None;
        assert_eq!(bubble.refresh(&view, false), OverlayVisualState::HIDDEN);
    }

    #[test]
    fn test_drag_suppression_outside_panel() {
        let mut bubble = bubble();
        bubble.refresh(&text_view("hello"), false);
        bubble.on_pointer_move(1, 700.0, 500.0);
        assert_eq!(bubble.visual_state().pointer_events, PointerEvents::None);
        assert!(bubble.visual_state().is_visible());
        bubble.on_pointer_up();
        assert_eq!(bubble.visual_state().pointer_events, PointerEvents::Auto);
    }
}
