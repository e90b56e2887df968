#![warn(missing_docs)]
//! In-memory document engine for `overlay-core`.
//!
//! [`MemoryEngine`] is a small rich-text engine (paragraphs of text spans, manual and
//! auto-detected links, a monospace layout) that implements
//! [`DocumentEngine`](overlay_core::DocumentEngine). It is the reference host used by the
//! overlay's integration tests, and a starting point for wiring the overlays to a real engine.
//!
//! # Example
//!
//! ```rust
//! use overlay_core::{
//!     ElementId, FloatingOverlays, LinkEditorActions, LinkStatus, OverlayConfig,
//!     OverlayElements, PanelSizes, SubmitOutcome,
//! };
//! use overlay_core_memdoc::MemoryEngine;
//!
//! let mut engine = MemoryEngine::new("read the docs");
//! let mut overlays = FloatingOverlays::attach(
//!     &mut engine,
//!     OverlayConfig::default(),
//!     OverlayElements {
//!         bubble: ElementId(1),
//!         link: ElementId(2),
//!         link_input: ElementId(3),
//!     },
//!     PanelSizes {
//!         bubble: (200.0, 36.0),
//!         link: (280.0, 44.0),
//!     },
//! );
//!
//! engine.select_text("docs");
//! assert!(overlays.bubble_state().is_visible());
//!
//! overlays.insert_link(&mut engine);
//! assert_eq!(overlays.link_status(), LinkStatus::Editing);
//!
//! overlays.set_edited_url("https://docs.rs");
//! assert_eq!(overlays.submit_link(&mut engine), SubmitOutcome::Committed);
//! assert_eq!(overlays.link_props().link_url, "https://docs.rs");
//! ```

pub mod document;
pub mod engine;
pub mod layout;
pub mod tree;

pub use document::{Bias, Block, DocPosition, Document, Span};
pub use engine::{EngineState, MemoryEngine, Selection};
pub use layout::{Layout, char_cells};
pub use tree::SimpleElementTree;
