//! Link editing.
//!
//! A [`LinkEditor`] owns the single [`LinkSession`] of an editor and drives it through
//!
//! ```text
//!            selection in link            start edit
//!   Hidden ────────────────────▶ Viewing ────────────▶ Editing
//!     │  ▲                        ▲  │                  │  │
//!     │  └── leave link / delete ─┘  └─── submit ───────┘  │
//!     │                          ◀── cancel / Escape ──────┘
//!     └───────────────── insert link ─────────────────────▶
//! ```
//!
//! Submitting sanitizes the URL against the scheme allow-list and, for auto-detected links,
//! swaps in a manual link with the original attributes.

pub mod editor;
pub mod props;
pub mod session;

pub use editor::{LinkEditor, SubmitOutcome};
pub use props::{LinkEditorActions, LinkEditorProps, LinkEditorRenderer};
pub use session::{LinkSession, LinkStatus};
