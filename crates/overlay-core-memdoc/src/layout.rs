//! Monospace layout.
//!
//! Every block is one line; every character occupies `char_width * cells` pixels, where
//! `cells` follows UAX #11 (CJK and emoji take two cells). That is enough to turn document
//! positions into the viewport rectangles the overlay positions against.

use overlay_core::{AnchorFrame, Rect};
use unicode_width::UnicodeWidthChar;

use crate::document::{DocPosition, Document};

/// Cell width of a character.
pub fn char_cells(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Geometry of the editor in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// The editor's scroll container (what is visible).
    pub viewport: Rect,
    /// The nearest clipping ancestor. `None` models an editor mounted outside any scroller.
    pub scroller: Option<Rect>,
    /// Vertical scroll offset of the content.
    pub scroll_top: f64,
    /// Width of one cell.
    pub char_width: f64,
    /// Height of one line.
    pub line_height: f64,
    /// Content padding on every side.
    pub padding: f64,
}

impl Default for Layout {
    fn default() -> Self {
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        Self {
            viewport,
            scroller: Some(viewport),
            scroll_top: 0.0,
            char_width: 8.0,
            line_height: 20.0,
            padding: 0.0,
        }
    }
}

impl Layout {
    /// Layout inside `viewport`, which is also the clipping scroller.
    pub fn in_viewport(viewport: Rect) -> Self {
        Self {
            viewport,
            scroller: Some(viewport),
            ..Self::default()
        }
    }

    /// Bounding box of the (scrolled) content container.
    pub fn content_rect(&self, document: &Document) -> Rect {
        let height = self.padding * 2.0 + self.line_height * document.blocks().len() as f64;
        Rect::new(
            self.viewport.left,
            self.viewport.top - self.scroll_top,
            self.viewport.width,
            height.max(self.viewport.height),
        )
    }

    /// The anchor frame floating panels are positioned in.
    pub fn anchor_frame(&self, document: &Document) -> AnchorFrame {
        let rect = self.content_rect(document);
        match self.scroller {
            Some(scroller) => AnchorFrame::new(rect, scroller),
            None => AnchorFrame::detached(rect),
        }
    }

    fn x(&self, document: &Document, position: DocPosition) -> f64 {
        let cells: usize = document
            .block(position.block)
            .map(|block| {
                block
                    .text()
                    .chars()
                    .take(position.offset)
                    .map(char_cells)
                    .sum()
            })
            .unwrap_or(0);
        self.viewport.left + self.padding + cells as f64 * self.char_width
    }

    fn line_top(&self, document: &Document, block: usize) -> f64 {
        self.content_rect(document).top + self.padding + block as f64 * self.line_height
    }

    /// Zero-width caret rectangle at `position`.
    pub fn caret_rect(&self, document: &Document, position: DocPosition) -> Rect {
        let top = self.line_top(document, position.block);
        let x = self.x(document, position);
        Rect::from_edges(x, top, x, top + self.line_height)
    }

    /// Bounding box of the range `start..end` (ordered).
    pub fn range_rect(&self, document: &Document, start: DocPosition, end: DocPosition) -> Rect {
        if start.block == end.block {
            let top = self.line_top(document, start.block);
            return Rect::from_edges(
                self.x(document, start),
                top,
                self.x(document, end),
                top + self.line_height,
            );
        }
        let lines: Vec<Rect> = (start.block..=end.block)
            .map(|block| {
                let from = if block == start.block { start.offset } else { 0 };
                let to = if block == end.block {
                    end.offset
                } else {
                    document.block(block).map_or(0, |b| b.len())
                };
                let top = self.line_top(document, block);
                Rect::from_edges(
                    self.x(document, DocPosition::new(block, from)),
                    top,
                    self.x(document, DocPosition::new(block, to)),
                    top + self.line_height,
                )
            })
            .collect();
        Rect::bounding(&lines).unwrap_or_else(|| self.caret_rect(document, start))
    }
}
