#![warn(missing_docs)]
//! Overlay Core - Headless Floating Panels for Rich-Text Editors
//!
//! # Overview
//!
//! `overlay-core` computes where (and whether) the floating panels of a rich-text editor are
//! drawn: the formatting bubble that follows a text selection and the inline link editor that
//! views, edits, inserts and removes hyperlinks. It does not render anything and does not own
//! the document; the host supplies rectangles and a [`DocumentEngine`], and reads back
//! [`OverlayVisualState`]s and [`LinkEditorProps`].
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  FloatingOverlays (engine subscriptions)    │  ← Public API
//! ├──────────────────────┬──────────────────────┤
//! │  BubbleOverlay       │  LinkEditor          │  ← Visibility / State Machine
//! │  (selection rules)   │  (LinkSession)       │
//! ├──────────────────────┴──────────────────────┤
//! │  GeometryEngine + FloatingPanel             │  ← Placement
//! ├─────────────────────────────────────────────┤
//! │  EditorView / DocumentEngine traits         │  ← Engine Boundary
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## Placing a panel
//!
//! ```rust
//! use overlay_core::{AnchorFrame, GeometryConfig, GeometryEngine, PositionRequest, Rect};
//! use overlay_core::TextAlignment;
//!
//! let engine = GeometryEngine::new(GeometryConfig::default());
//! let anchor = AnchorFrame::new(
//!     Rect::new(0.0, 0.0, 800.0, 600.0),
//!     Rect::new(0.0, 0.0, 800.0, 600.0),
//! );
//! // The selection is close to the top: the panel flips below it.
//! let request = PositionRequest {
//!     target_rect: Some(Rect::new(100.0, 30.0, 80.0, 20.0)),
//!     vertical_gap: 10.0,
//!     horizontal_offset: 5.0,
//!     is_link_flip: false,
//!     text_alignment: TextAlignment::Start,
//! };
//! let state = engine.compute(&request, &Rect::new(0.0, 0.0, 120.0, 40.0), &anchor);
//! assert_eq!(state.translate_y, 60);
//! ```
//!
//! ## Driving the link session
//!
//! ```rust
//! use overlay_core::{LinkSession, LinkStatus, PLACEHOLDER_URL};
//!
//! let mut session = LinkSession::new();
//! assert_eq!(session.status(), LinkStatus::Hidden);
//! assert_eq!(session.edited_url(), PLACEHOLDER_URL);
//! assert!(!session.can_submit());
//! ```
//!
//! Full wiring against an engine goes through [`FloatingOverlays::attach`]; the
//! `overlay-core-memdoc` crate contains an in-memory engine to try it against.
//!
//! # Module Description
//!
//! - [`geometry`] - panel placement and drag suppression
//! - [`bubble`] - bubble toolbar visibility rules
//! - [`link`] - link session state machine, editor and render props
//! - [`overlay`] - engine subscriptions and event ordering
//! - [`engine`] / [`commands`] - the document engine boundary
//! - [`selection`] - selection rules shared by both overlays
//! - [`url`] - URL validation and sanitizing
//! - [`config`] - tunable gaps and multipliers

pub mod anchor;
pub mod bubble;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod host;
pub mod link;
pub mod overlay;
pub mod rect;
pub mod selection;
pub mod url;

pub use crate::url::{
    INERT_URL, PLACEHOLDER_URL, SUPPORTED_SCHEMES, is_submittable, is_valid_url, sanitize_url,
};
pub use anchor::{AnchorFrame, AnchorSource};
pub use bubble::{BubbleOverlay, BubbleVisibility};
pub use commands::{
    CommandHandler, CommandKind, CommandPriority, EditorCommand, ListenerId, ListenerRegistry,
};
pub use config::{GeometryConfig, OverlayConfig};
pub use engine::{
    DocumentEngine, EditorId, EditorView, EngineSelection, LinkAttributes, LinkKind, LinkNode,
    NodeKey, NodeSelection, RangeSelection, SelectionPoint, SelectionSnapshot, UpdateListener,
};
pub use error::{ConfigError, EngineError};
pub use geometry::{
    FloatingPanel, GeometryEngine, HIDDEN_OFFSET, OverlayVisualState, PointerEvents,
    PositionRequest, TextAlignment, compute_position,
};
pub use host::{ElementId, ElementTree, InputRef};
pub use link::{
    LinkEditor, LinkEditorActions, LinkEditorProps, LinkEditorRenderer, LinkSession, LinkStatus,
    SubmitOutcome,
};
pub use overlay::{FloatingOverlays, OverlayElements, PanelSizes};
pub use rect::Rect;
pub use selection::HiddenReason;
