//! A parent-pointer element tree for hosts without a real UI toolkit.

use std::collections::HashMap;

use overlay_core::{ElementId, ElementTree};

/// Elements and their parents.
#[derive(Debug, Clone, Default)]
pub struct SimpleElementTree {
    parents: HashMap<ElementId, ElementId>,
}

impl SimpleElementTree {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `child` under `parent`.
    pub fn insert(&mut self, child: ElementId, parent: ElementId) -> &mut Self {
        self.parents.insert(child, parent);
        self
    }

    /// Detach `element` (its own children keep pointing at it).
    pub fn remove(&mut self, element: ElementId) {
        self.parents.remove(&element);
    }

    /// Parent of `element`.
    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.parents.get(&element).copied()
    }
}

impl ElementTree for SimpleElementTree {
    fn is_descendant(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        // Bounded walk; a cycle in the parent map must not hang focus handling.
        for _ in 0..=self.parents.len() {
            match current {
                Some(element) if element == ancestor => return true,
                Some(element) => current = self.parent(element),
                None => return false,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descendant_walk() {
        let (root, panel, input, other) = (ElementId(1), ElementId(2), ElementId(3), ElementId(4));
        let mut tree = SimpleElementTree::new();
        tree.insert(panel, root).insert(input, panel).insert(other, root);

        assert!(tree.is_descendant(panel, input));
        assert!(tree.is_descendant(panel, panel));
        assert!(tree.is_descendant(root, input));
        assert!(!tree.is_descendant(panel, other));

        tree.remove(input);
        assert!(!tree.is_descendant(panel, input));
    }

    #[test]
    fn test_cycle_terminates() {
        let mut tree = SimpleElementTree::new();
        tree.insert(ElementId(1), ElementId(2)).insert(ElementId(2), ElementId(1));
        assert!(!tree.is_descendant(ElementId(9), ElementId(1)));
    }
}
