//! Anchor frames and how they are found.

use serde::{Deserialize, Serialize};

use crate::engine::EditorView;
use crate::rect::Rect;

/// The container a floating panel is positioned in.
///
/// `rect` is the container's own bounding box (the panel's coordinate origin); `scroller` is
/// the bounding box of its nearest scrollable ancestor, the edge panels are clamped to.
/// Both are re-read on every position request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorFrame {
    /// Bounding box of the anchor container.
    pub rect: Rect,
    /// Bounding box of the clipping ancestor, if the anchor has one.
    pub scroller: Option<Rect>,
}

impl AnchorFrame {
    /// Anchor with a clipping ancestor.
    pub fn new(rect: Rect, scroller: Rect) -> Self {
        Self {
            rect,
            scroller: Some(scroller),
        }
    }

    /// Anchor with no clipping ancestor (panels anchored here are always hidden).
    pub fn detached(rect: Rect) -> Self {
        Self {
            rect,
            scroller: None,
        }
    }
}

/// Where an overlay gets its anchor from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AnchorSource {
    /// Ask the editor for its root container on every request.
    #[default]
    Editor,
    /// Use a frame the host passed in explicitly.
    Explicit(AnchorFrame),
}

impl AnchorSource {
    /// Resolve the frame for the current request.
    pub fn resolve(&self, view: &dyn EditorView) -> Option<AnchorFrame> {
        match self {
            AnchorSource::Editor => view.root_anchor(),
            AnchorSource::Explicit(frame) => Some(*frame),
        }
    }
}
