/// Type tag of a UI item.
///
/// The tag decides two things the scheduler cares about: whether the item
/// attaches as a top-level window during the post-frame drain, and whether
/// its name must be unique across the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Window,
    Child,
    Popup,
    Menu,
    Widget,
    /// Decorative, never targeted by name, so duplicates are tolerated.
    Separator,
}

impl ItemKind {
    /// Whether items of this kind must carry a tree-unique name.
    pub fn requires_unique_name(&self) -> bool {
        !matches!(self, ItemKind::Separator)
    }
}

/// Per-frame transient interaction state.
///
/// Cleared once per frame after drawing so the next frame starts clean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameState {
    pub hovered: bool,
    pub active: bool,
    pub focused: bool,
    pub clicked: bool,
}

impl FrameState {
    pub fn reset(&mut self) {
        *self = FrameState::default();
    }
}

/// Names of the host callbacks registered per input event.
///
/// An unset slot means the event class is simply not routed for this item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCallbacks {
    pub key_press: Option<String>,
    pub key_down: Option<String>,
    pub key_release: Option<String>,
    pub mouse_click: Option<String>,
    pub mouse_down: Option<String>,
    pub mouse_double_click: Option<String>,
    pub mouse_release: Option<String>,
    pub mouse_wheel: Option<String>,
    pub mouse_drag: Option<String>,
}

/// A node in the UI tree.
///
/// Items own their children in declaration order; there is no stored parent
/// back-reference, parent relations are derived from the owning sequences.
/// Name uniqueness (outside [`ItemKind::Separator`]) is enforced at insert
/// time by [`ItemTree`](crate::tree::ItemTree).
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub kind: ItemKind,
    pub width: u32,
    pub height: u32,
    pub children: Vec<Item>,
    pub state: FrameState,
    pub callbacks: EventCallbacks,
    /// Host callback invoked during render-prep while this is the active window.
    pub render_callback: Option<String>,
    pub keyboard_handled: bool,
    pub mouse_handled: bool,
}

impl Item {
    pub fn new(kind: ItemKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            width: 0,
            height: 0,
            children: Vec::new(),
            state: FrameState::default(),
            callbacks: EventCallbacks::default(),
            render_callback: None,
            keyboard_handled: true,
            mouse_handled: true,
        }
    }

    /// Shorthand for a top-level window of the given size.
    pub fn window(name: impl Into<String>, width: u32, height: u32) -> Self {
        let mut item = Item::new(ItemKind::Window, name);
        item.width = width;
        item.height = height;
        item
    }

    /// Depth-first search of this subtree, self included. First match wins.
    pub fn find(&self, name: &str) -> Option<&Item> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Mutable variant of [`find`](Self::find).
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Item> {
        if self.name == name {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(name))
    }

    /// Clear transient interaction flags on this item and every descendant.
    pub fn reset_frame_state(&mut self) {
        self.state.reset();
        for child in &mut self.children {
            child.reset_frame_state();
        }
    }
}
