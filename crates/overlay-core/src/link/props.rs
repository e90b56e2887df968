//! Render-facing view of the link editor.
//!
//! A host can draw the stock panel or swap in its own: either way it reads a
//! [`LinkEditorProps`] snapshot and calls back through [`LinkEditorActions`], so the state
//! machine stays the same.

use serde::Serialize;

use crate::engine::DocumentEngine;
use crate::geometry::OverlayVisualState;
use crate::host::InputRef;
use crate::link::editor::SubmitOutcome;
use crate::link::session::LinkStatus;

/// Everything a link panel needs to draw itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkEditorProps {
    /// Session status.
    pub status: LinkStatus,
    /// Show the input rather than the link preview.
    pub is_editing: bool,
    /// Committed URL.
    pub link_url: String,
    /// URL input contents.
    pub edited_url: String,
    /// Input validity (no error state for the placeholder).
    pub is_valid_url: bool,
    /// Enables the submit button.
    pub can_submit: bool,
    /// The URL input to focus.
    pub input: InputRef,
    /// Where and whether to draw the panel.
    pub visual: OverlayVisualState,
}

/// Draws a link panel.
pub trait LinkEditorRenderer {
    /// Render the panel for the given props.
    fn render(&mut self, props: &LinkEditorProps);
}

/// User actions a link panel can trigger.
pub trait LinkEditorActions {
    /// Replace the URL input contents.
    fn set_edited_url(&mut self, url: &str);
    /// Commit the edited URL.
    fn submit_link<E: DocumentEngine>(&mut self, engine: &mut E) -> SubmitOutcome;
    /// Leave editing without committing.
    fn cancel_edit<E: DocumentEngine>(&mut self, engine: &mut E);
    /// Switch from viewing to editing.
    fn start_edit(&mut self);
    /// Remove the link.
    fn delete_link<E: DocumentEngine>(&mut self, engine: &mut E);
}
