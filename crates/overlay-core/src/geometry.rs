//! Floating panel geometry.
//!
//! Converts a target rectangle (a selection or a link) into the translate a floating panel
//! needs inside its anchor container.
//!
//! # Placement rules
//!
//! 1. No target, or an anchor without a clipping ancestor: hidden (opacity 0, pointer events
//!    off, translated to `(-10000, -10000)`).
//! 2. Above the target by default. If that crosses the scroller's top edge, flip below it,
//!    with `gap * multiplier` of clearance (the multiplier differs for link panels).
//! 3. Left-aligned with the target, or right-aligned for end/right aligned text.
//! 4. Clamped inside the scroller's right, then left edge.
//! 5. Made relative to the anchor container and rounded to whole pixels.
//!
//! [`compute_position`] is total and idempotent; it never fails.
//!
//! # Example
//!
//! ```rust
//! use overlay_core::{AnchorFrame, PositionRequest, Rect, TextAlignment, compute_position};
//!
//! let anchor = AnchorFrame::new(
//!     Rect::new(0.0, 0.0, 800.0, 600.0),
//!     Rect::new(0.0, 0.0, 800.0, 600.0),
//! );
//! let request = PositionRequest {
//!     target_rect: Some(Rect::new(100.0, 200.0, 80.0, 20.0)),
//!     vertical_gap: 10.0,
//!     horizontal_offset: 5.0,
//!     is_link_flip: false,
//!     text_alignment: TextAlignment::Start,
//! };
//! let state = compute_position(&request, &Rect::new(0.0, 0.0, 120.0, 40.0), &anchor);
//! assert!(state.is_visible());
//! assert_eq!((state.translate_x, state.translate_y), (95, 150));
//! ```

use serde::{Deserialize, Serialize};

use crate::anchor::AnchorFrame;
use crate::config::GeometryConfig;
use crate::host::ElementId;
use crate::rect::Rect;

/// Translate applied to hidden panels, far enough off-canvas to never catch input.
pub const HIDDEN_OFFSET: i32 = -10_000;

/// Text alignment of the block the target sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    /// Logical start (left in LTR).
    #[default]
    Start,
    /// Logical end.
    End,
    /// Physical left.
    Left,
    /// Physical right.
    Right,
    /// Centered.
    Center,
    /// Justified.
    Justify,
}

impl TextAlignment {
    /// Panels anchor to the target's right edge for these alignments.
    pub fn anchors_to_end(&self) -> bool {
        matches!(self, TextAlignment::End | TextAlignment::Right)
    }
}

/// CSS-like `pointer-events` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEvents {
    /// The panel receives pointer input.
    Auto,
    /// Pointer input passes through the panel.
    None,
}

impl PointerEvents {
    fn as_css(&self) -> &'static str {
        match self {
            PointerEvents::Auto => "auto",
            PointerEvents::None => "none",
        }
    }
}

/// The visual state written onto a panel's root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayVisualState {
    /// 0 (hidden) or 1 (shown).
    pub opacity: u8,
    /// Pointer input handling.
    pub pointer_events: PointerEvents,
    /// Horizontal translate inside the anchor container.
    pub translate_x: i32,
    /// Vertical translate inside the anchor container.
    pub translate_y: i32,
}

impl OverlayVisualState {
    /// The off-canvas hidden state.
    pub const HIDDEN: OverlayVisualState = OverlayVisualState {
        opacity: 0,
        pointer_events: PointerEvents::None,
        translate_x: HIDDEN_OFFSET,
        translate_y: HIDDEN_OFFSET,
    };

    /// A shown state at the given translate.
    pub fn visible_at(translate_x: i32, translate_y: i32) -> Self {
        Self {
            opacity: 1,
            pointer_events: PointerEvents::Auto,
            translate_x,
            translate_y,
        }
    }

    /// Returns `true` for opacity 1.
    pub fn is_visible(&self) -> bool {
        self.opacity == 1
    }

    /// Inline style text for the panel's root element.
    pub fn to_inline_style(&self) -> String {
        format!(
            "opacity: {}; pointer-events: {}; transform: translate({}px, {}px)",
            self.opacity,
            self.pointer_events.as_css(),
            self.translate_x,
            self.translate_y
        )
    }
}

impl Default for OverlayVisualState {
    fn default() -> Self {
        Self::HIDDEN
    }
}

/// One position request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionRequest {
    /// Rectangle to attach to; `None` hides the panel.
    pub target_rect: Option<Rect>,
    /// Gap between panel and target.
    pub vertical_gap: f64,
    /// Horizontal inset from the target/scroller edge.
    pub horizontal_offset: f64,
    /// Use the link editor's flip clearance instead of the toolbar's.
    pub is_link_flip: bool,
    /// Alignment of the target's text.
    pub text_alignment: TextAlignment,
}

impl PositionRequest {
    /// A hidden request.
    pub fn hidden() -> Self {
        Self {
            target_rect: None,
            vertical_gap: 0.0,
            horizontal_offset: 0.0,
            is_link_flip: false,
            text_alignment: TextAlignment::Start,
        }
    }
}

/// Geometry engine configured with explicit flip multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeometryEngine {
    config: GeometryConfig,
}

impl GeometryEngine {
    /// Create an engine with the given config.
    pub fn new(config: GeometryConfig) -> Self {
        Self { config }
    }

    /// The engine's config.
    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    /// Compute a panel's visual state.
    pub fn compute(
        &self,
        request: &PositionRequest,
        floating_rect: &Rect,
        anchor: &AnchorFrame,
    ) -> OverlayVisualState {
        let (Some(target), Some(scroller)) = (request.target_rect, anchor.scroller) else {
            return OverlayVisualState::HIDDEN;
        };

        let gap = request.vertical_gap;
        let offset = request.horizontal_offset;

        let mut top = target.top - floating_rect.height - gap;
        let mut left = if request.text_alignment.anchors_to_end() {
            target.right - floating_rect.width + offset
        } else {
            target.left - offset
        };

        if top < scroller.top {
            top += floating_rect.height
                + target.height
                + gap * self.config.flip_multiplier(request.is_link_flip);
            tracing::trace!(top, "panel flipped below target");
        }

        if left + floating_rect.width > scroller.right {
            left = scroller.right - floating_rect.width - offset;
        }
        if left < scroller.left {
            left = scroller.left + offset;
        }

        top -= anchor.rect.top;
        left -= anchor.rect.left;

        OverlayVisualState::visible_at(left.round() as i32, top.round() as i32)
    }
}

/// Compute a panel's visual state with the default [`GeometryConfig`].
pub fn compute_position(
    request: &PositionRequest,
    floating_rect: &Rect,
    anchor: &AnchorFrame,
) -> OverlayVisualState {
    GeometryEngine::default().compute(request, floating_rect, anchor)
}

/// A floating panel: its element, measured size and last applied visual state.
///
/// Drag suppression is kept separately from the geometry output and combined in
/// [`effective_state`](FloatingPanel::effective_state), so either one can switch pointer
/// input off without the other turning it back on.
#[derive(Debug, Clone)]
pub struct FloatingPanel {
    element: ElementId,
    width: f64,
    height: f64,
    applied: OverlayVisualState,
    drag_suppressed: bool,
}

impl FloatingPanel {
    /// Create a hidden panel of the given measured size.
    pub fn new(element: ElementId, width: f64, height: f64) -> Self {
        Self {
            element,
            width,
            height,
            applied: OverlayVisualState::HIDDEN,
            drag_suppressed: false,
        }
    }

    /// The panel's root element.
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Update the measured size (content changed, e.g. view/edit mode switch).
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// The panel's own rectangle as measured (only width/height matter to the geometry).
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Write a computed state onto the panel.
    pub fn apply(&mut self, state: OverlayVisualState) {
        self.applied = state;
    }

    /// The state last written by the geometry engine.
    pub fn applied(&self) -> OverlayVisualState {
        self.applied
    }

    /// Geometry output combined with drag suppression.
    pub fn effective_state(&self) -> OverlayVisualState {
        let mut state = self.applied;
        if self.drag_suppressed {
            state.pointer_events = PointerEvents::None;
        }
        state
    }

    /// The panel's bounding box in viewport pixels, if shown.
    pub fn viewport_rect(&self, anchor: &AnchorFrame) -> Option<Rect> {
        if !self.applied.is_visible() {
            return None;
        }
        Some(Rect::new(
            anchor.rect.left + f64::from(self.applied.translate_x),
            anchor.rect.top + f64::from(self.applied.translate_y),
            self.width,
            self.height,
        ))
    }

    /// A pointer moved. With the primary button held (`buttons` 1 or 3) outside the panel,
    /// pointer input is switched off so the panel cannot block a drag-selection.
    pub fn on_pointer_move(&mut self, buttons: u16, x: f64, y: f64, anchor: Option<&AnchorFrame>) {
        if self.drag_suppressed || !matches!(buttons, 1 | 3) {
            return;
        }
        let inside = anchor
            .and_then(|anchor| self.viewport_rect(anchor))
            .is_some_and(|rect| rect.contains_point(x, y));
        if !inside {
            tracing::trace!(x, y, "drag outside panel, suppressing pointer events");
            self.drag_suppressed = true;
        }
    }

    /// A pointer button was released.
    pub fn on_pointer_up(&mut self) {
        self.drag_suppressed = false;
    }

    /// Returns `true` while a drag is suppressing pointer input.
    pub fn is_drag_suppressed(&self) -> bool {
        self.drag_suppressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn viewport_anchor() -> AnchorFrame {
        AnchorFrame::new(
            Rect::new(0.0, 0.0, 800.0, 600.0),
            Rect::new(0.0, 0.0, 800.0, 600.0),
        )
    }

    fn request(target: Rect) -> PositionRequest {
        PositionRequest {
            target_rect: Some(target),
            vertical_gap: 10.0,
            horizontal_offset: 5.0,
            is_link_flip: false,
            text_alignment: TextAlignment::Start,
        }
    }

    #[test]
    fn test_hidden_without_scroller() {
        let anchor = AnchorFrame::detached(Rect::new(0.0, 0.0, 800.0, 600.0));
        let state = compute_position(
            &request(Rect::new(100.0, 200.0, 50.0, 20.0)),
            &Rect::new(0.0, 0.0, 100.0, 40.0),
            &anchor,
        );
        assert_eq!(state, OverlayVisualState::HIDDEN);
    }

    #[test]
    fn test_anchor_relative_and_rounded() {
        let anchor = AnchorFrame::new(
            Rect::new(20.5, 50.0, 700.0, 500.0),
            Rect::new(0.0, 0.0, 800.0, 600.0),
        );
        let state = compute_position(
            &request(Rect::new(100.2, 200.4, 50.0, 20.0)),
            &Rect::new(0.0, 0.0, 100.0, 40.0),
            &anchor,
        );
        // left = 100.2 - 5 - 20.5 = 74.7, top = 200.4 - 40 - 10 - 50 = 100.4
        assert_eq!(state, OverlayVisualState::visible_at(75, 100));
    }

    #[test]
    fn test_left_clamp() {
        let state = compute_position(
            &request(Rect::new(2.0, 200.0, 50.0, 20.0)),
            &Rect::new(0.0, 0.0, 100.0, 40.0),
            &viewport_anchor(),
        );
        assert_eq!(state.translate_x, 5);
    }

    #[test]
    fn test_custom_multiplier() {
        let engine = GeometryEngine::new(GeometryConfig {
            link_flip_multiplier: 3.0,
            ..GeometryConfig::default()
        });
        let mut req = request(Rect::new(100.0, 30.0, 50.0, 20.0));
        req.is_link_flip = true;
        let state = engine.compute(&req, &Rect::new(0.0, 0.0, 100.0, 40.0), &viewport_anchor());
        // -20 + 40 + 20 + 30
        assert_eq!(state.translate_y, 70);
    }

    #[test]
    fn test_inline_style() {
        assert_eq!(
            OverlayVisualState::HIDDEN.to_inline_style(),
            "opacity: 0; pointer-events: none; transform: translate(-10000px, -10000px)"
        );
        assert_eq!(
            OverlayVisualState::visible_at(3, -4).to_inline_style(),
            "opacity: 1; pointer-events: auto; transform: translate(3px, -4px)"
        );
    }

    #[test]
    fn test_drag_suppression_composes_with_geometry() {
        let anchor = viewport_anchor();
        let mut panel = FloatingPanel::new(ElementId(1), 100.0, 40.0);
        panel.apply(OverlayVisualState::visible_at(10, 10));

        // Inside the panel: no suppression.
        panel.on_pointer_move(1, 50.0, 20.0, Some(&anchor));
        assert_eq!(panel.effective_state().pointer_events, PointerEvents::Auto);

        // No button held: ignored.
        panel.on_pointer_move(0, 500.0, 500.0, Some(&anchor));
        assert!(!panel.is_drag_suppressed());

        panel.on_pointer_move(3, 500.0, 500.0, Some(&anchor));
        assert_eq!(panel.effective_state().pointer_events, PointerEvents::None);
        // Geometry output itself is untouched.
        assert_eq!(panel.applied().pointer_events, PointerEvents::Auto);

        // Re-positioning does not lift the suppression.
        panel.apply(OverlayVisualState::visible_at(20, 20));
        assert_eq!(panel.effective_state().pointer_events, PointerEvents::None);

        panel.on_pointer_up();
        assert_eq!(panel.effective_state().pointer_events, PointerEvents::Auto);

        // Hidden by geometry stays non-interactive after release.
        panel.apply(OverlayVisualState::HIDDEN);
        assert_eq!(panel.effective_state().pointer_events, PointerEvents::None);
    }
}
