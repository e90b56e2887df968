//! Host UI elements.
//!
//! The overlay only needs two things from the host's element tree: stable ids for its own
//! panel and URL input, and a descendant check to tell whether focus stayed inside the panel.

use serde::{Deserialize, Serialize};

/// Host-assigned element identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// Ancestry queries over the host's element tree.
pub trait ElementTree {
    /// Returns `true` if `node` is `ancestor` or lies below it.
    fn is_descendant(&self, ancestor: ElementId, node: ElementId) -> bool;
}

/// Reference to the link editor's URL input.
///
/// Custom panels render their own input and hand its id here so focus requests still land
/// on the right element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRef {
    /// Element id of the input.
    pub element: ElementId,
}

impl InputRef {
    /// Wrap an element id.
    pub fn new(element: ElementId) -> Self {
        Self { element }
    }
}
