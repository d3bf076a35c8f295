// Item tree
//
// The owned hierarchy of UI items: top-level windows, each owning its
// subtree. The tree belongs to the render thread; everything that mutates it
// from elsewhere goes through the mutation queues and is applied here during
// the post-frame drain.

use crate::models::{Item, ItemKind};
use thiserror::Error;

/// Structural failures. Reported per request during the drain; one bad
/// request never stalls the rest of the queue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("{name} was not found")]
    NotFound { name: String },

    #[error("{name}: items of this type must have unique names")]
    DuplicateName { name: String },
}

/// The owned UI hierarchy.
///
/// Lookup is first-match depth-first across the windows in creation order.
/// There is no name index; correctness comes from rejecting duplicate names
/// at insert time, which keeps first-match deterministic.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ItemTree {
    windows: Vec<Item>,
}

impl ItemTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn windows(&self) -> &[Item] {
        &self.windows
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Depth-first search across all windows, first match by name.
    pub fn find(&self, name: &str) -> Option<&Item> {
        self.windows.iter().find_map(|window| window.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Item> {
        self.windows
            .iter_mut()
            .find_map(|window| window.find_mut(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Append a top-level window.
    pub fn attach_window(&mut self, item: Item) -> Result<(), TreeError> {
        if item.kind.requires_unique_name() && self.contains(&item.name) {
            return Err(TreeError::DuplicateName { name: item.name });
        }
        self.windows.push(item);
        Ok(())
    }

    /// Attach `item` under the named parent, before the named sibling if one
    /// is given, appended otherwise.
    pub fn insert(
        &mut self,
        parent: &str,
        before: Option<&str>,
        item: Item,
    ) -> Result<(), TreeError> {
        if item.kind.requires_unique_name() && self.contains(&item.name) {
            return Err(TreeError::DuplicateName { name: item.name });
        }

        let Some(parent_item) = self.find_mut(parent) else {
            return Err(TreeError::NotFound {
                name: parent.to_string(),
            });
        };

        match before {
            Some(sibling) => {
                let index = parent_item
                    .children
                    .iter()
                    .position(|child| child.name == sibling);
                match index {
                    Some(index) => parent_item.children.insert(index, item),
                    // Named sibling missing: append, matching runtime-add
                    // behavior for a stale "before" hint.
                    None => parent_item.children.push(item),
                }
            }
            None => parent_item.children.push(item),
        }
        Ok(())
    }

    /// Remove the named item wherever it lives. A window name removes the
    /// window and its whole subtree. Returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        for window in &mut self.windows {
            if Self::remove_descendant(window, name) {
                return true;
            }
        }

        let before = self.windows.len();
        self.windows.retain(|window| window.name != name);
        self.windows.len() != before
    }

    fn remove_descendant(item: &mut Item, name: &str) -> bool {
        if let Some(index) = item.children.iter().position(|child| child.name == name) {
            item.children.remove(index);
            return true;
        }
        item.children
            .iter_mut()
            .any(|child| Self::remove_descendant(child, name))
    }

    /// Remove only the children of the named item, leaving it in place.
    pub fn remove_children_of(&mut self, name: &str) -> bool {
        match self.find_mut(name) {
            Some(item) => {
                item.children.clear();
                true
            }
            None => false,
        }
    }

    /// Swap the named item with its previous sibling. Returns whether a swap
    /// occurred; the first child is a no-op.
    pub fn move_up(&mut self, name: &str) -> bool {
        self.move_by(name, -1)
    }

    /// Swap the named item with its next sibling. Returns whether a swap
    /// occurred; the last child is a no-op.
    pub fn move_down(&mut self, name: &str) -> bool {
        self.move_by(name, 1)
    }

    fn move_by(&mut self, name: &str, offset: isize) -> bool {
        for window in &mut self.windows {
            if Self::move_in_subtree(window, name, offset) {
                return true;
            }
        }
        false
    }

    fn move_in_subtree(item: &mut Item, name: &str, offset: isize) -> bool {
        if let Some(index) = item.children.iter().position(|child| child.name == name) {
            let target = index as isize + offset;
            if target < 0 || target as usize >= item.children.len() {
                return false;
            }
            item.children.swap(index, target as usize);
            return true;
        }
        item.children
            .iter_mut()
            .any(|child| Self::move_in_subtree(child, name, offset))
    }

    /// Clear transient interaction flags on every item in the tree.
    pub fn reset_frame_state(&mut self) {
        for window in &mut self.windows {
            window.reset_frame_state();
        }
    }

    /// All names in the tree, depth-first. Used by invariant checks.
    pub fn all_names(&self) -> Vec<String> {
        fn collect(item: &Item, out: &mut Vec<String>) {
            out.push(item.name.clone());
            for child in &item.children {
                collect(child, out);
            }
        }
        let mut names = Vec::new();
        for window in &self.windows {
            collect(window, &mut names);
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_window() -> ItemTree {
        let mut tree = ItemTree::new();
        tree.attach_window(Item::window("main", 800, 600)).unwrap();
        tree
    }

    #[test]
    fn test_insert_and_find() {
        let mut tree = tree_with_window();
        tree.insert("main", None, Item::new(ItemKind::Widget, "a"))
            .unwrap();
        tree.insert("main", None, Item::new(ItemKind::Widget, "b"))
            .unwrap();

        assert!(tree.contains("a"));
        let main = tree.find("main").unwrap();
        assert_eq!(main.children.len(), 2);
        assert_eq!(main.children[1].name, "b");
    }

    #[test]
    fn test_insert_before_sibling() {
        let mut tree = tree_with_window();
        tree.insert("main", None, Item::new(ItemKind::Widget, "a"))
            .unwrap();
        tree.insert("main", Some("a"), Item::new(ItemKind::Widget, "b"))
            .unwrap();

        let main = tree.find("main").unwrap();
        assert_eq!(main.children[0].name, "b");
        assert_eq!(main.children[1].name, "a");
    }

    #[test]
    fn test_insert_missing_parent() {
        let mut tree = tree_with_window();
        let err = tree
            .insert("ghost", None, Item::new(ItemKind::Widget, "a"))
            .unwrap_err();
        assert_eq!(
            err,
            TreeError::NotFound {
                name: "ghost".to_string()
            }
        );
        assert!(!tree.contains("a"));
    }

    #[test]
    fn test_insert_duplicate_name_rejected() {
        let mut tree = tree_with_window();
        tree.insert("main", None, Item::new(ItemKind::Widget, "a"))
            .unwrap();

        let err = tree
            .insert("main", None, Item::new(ItemKind::Widget, "a"))
            .unwrap_err();
        assert!(matches!(err, TreeError::DuplicateName { .. }));
        assert_eq!(tree.find("main").unwrap().children.len(), 1);
    }

    #[test]
    fn test_separator_duplicates_allowed() {
        let mut tree = tree_with_window();
        tree.insert("main", None, Item::new(ItemKind::Separator, "sep"))
            .unwrap();
        tree.insert("main", None, Item::new(ItemKind::Separator, "sep"))
            .unwrap();
        assert_eq!(tree.find("main").unwrap().children.len(), 2);
    }

    #[test]
    fn test_remove_nested_item() {
        let mut tree = tree_with_window();
        tree.insert("main", None, Item::new(ItemKind::Child, "group"))
            .unwrap();
        tree.insert("group", None, Item::new(ItemKind::Widget, "leaf"))
            .unwrap();

        assert!(tree.remove("leaf"));
        assert!(!tree.contains("leaf"));
        assert!(tree.contains("group"));
    }

    #[test]
    fn test_remove_window_wholesale() {
        let mut tree = tree_with_window();
        tree.attach_window(Item::window("tools", 200, 400)).unwrap();
        tree.insert("tools", None, Item::new(ItemKind::Widget, "button"))
            .unwrap();

        assert!(tree.remove("tools"));
        assert!(!tree.contains("tools"));
        assert!(!tree.contains("button"));
        assert_eq!(tree.window_count(), 1);
    }

    #[test]
    fn test_remove_missing_returns_false() {
        let mut tree = tree_with_window();
        let before = tree.clone();
        assert!(!tree.remove("nothing"));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_remove_children_of() {
        let mut tree = tree_with_window();
        tree.insert("main", None, Item::new(ItemKind::Child, "group"))
            .unwrap();
        tree.insert("group", None, Item::new(ItemKind::Widget, "a"))
            .unwrap();
        tree.insert("group", None, Item::new(ItemKind::Widget, "b"))
            .unwrap();

        assert!(tree.remove_children_of("group"));
        assert!(tree.contains("group"));
        assert!(!tree.contains("a"));
        assert!(!tree.contains("b"));

        assert!(!tree.remove_children_of("ghost"));
    }

    #[test]
    fn test_move_up_down() {
        let mut tree = tree_with_window();
        for name in ["a", "b", "c"] {
            tree.insert("main", None, Item::new(ItemKind::Widget, name))
                .unwrap();
        }

        assert!(tree.move_up("b"));
        let order: Vec<_> = tree.find("main").unwrap().children.iter().map(|c| c.name.clone()).collect();
        assert_eq!(order, ["b", "a", "c"]);

        assert!(tree.move_down("a"));
        let order: Vec<_> = tree.find("main").unwrap().children.iter().map(|c| c.name.clone()).collect();
        assert_eq!(order, ["b", "c", "a"]);
    }

    #[test]
    fn test_move_at_boundary_is_noop() {
        let mut tree = tree_with_window();
        tree.insert("main", None, Item::new(ItemKind::Widget, "first"))
            .unwrap();
        tree.insert("main", None, Item::new(ItemKind::Widget, "last"))
            .unwrap();

        assert!(!tree.move_up("first"));
        assert!(!tree.move_down("last"));
        assert!(!tree.move_up("missing"));

        let order: Vec<_> = tree.find("main").unwrap().children.iter().map(|c| c.name.clone()).collect();
        assert_eq!(order, ["first", "last"]);
    }

    #[test]
    fn test_reset_frame_state() {
        let mut tree = tree_with_window();
        tree.insert("main", None, Item::new(ItemKind::Widget, "a"))
            .unwrap();
        tree.find_mut("a").unwrap().state.hovered = true;
        tree.find_mut("main").unwrap().state.active = true;

        tree.reset_frame_state();

        assert!(!tree.find("a").unwrap().state.hovered);
        assert!(!tree.find("main").unwrap().state.active);
    }

    #[test]
    fn test_all_names() {
        let mut tree = tree_with_window();
        tree.insert("main", None, Item::new(ItemKind::Child, "group"))
            .unwrap();
        tree.insert("group", None, Item::new(ItemKind::Widget, "leaf"))
            .unwrap();

        assert_eq!(tree.all_names(), ["main", "group", "leaf"]);
    }
}
