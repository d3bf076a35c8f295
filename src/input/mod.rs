// Input routing
//
// Routes a per-frame input snapshot to the active window's event
// callbacks. Events only ever reach one window per frame: the active
// window if it exists in the tree, otherwise the root window.

use crate::dispatch::CallbackDispatcher;
use crate::models::{Item, Payload};

/// Mouse buttons tracked for click, down, double-click and release events.
pub const MOUSE_BUTTONS: usize = 5;

/// Mouse buttons eligible for drag events. Only one button can drag at a
/// time, so the scan stops at the first dragging button.
pub const DRAG_BUTTONS: usize = 3;

/// Snapshot of input state for one frame, filled in by the render backend.
///
/// Keys are identified by backend-specific key codes. Durations are in
/// seconds; a down duration of `-1.0` means the key or button is up, and
/// `0.0` means it went down this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFrame {
    /// Keys that went down this frame.
    pub keys_pressed: Vec<i64>,

    /// Keys that went up this frame.
    pub keys_released: Vec<i64>,

    /// Keys currently held, with how long they have been down.
    pub keys_down: Vec<(i64, f64)>,

    pub mouse_clicked: [bool; MOUSE_BUTTONS],
    pub mouse_double_clicked: [bool; MOUSE_BUTTONS],
    pub mouse_released: [bool; MOUSE_BUTTONS],

    /// Per-button down duration, `-1.0` while the button is up.
    pub mouse_down_duration: [f64; MOUSE_BUTTONS],

    /// Vertical wheel movement this frame, `0.0` when the wheel is still.
    pub mouse_wheel: f64,

    /// Per-button drag distance in pixels since the button went down.
    pub mouse_drag_amount: [f64; DRAG_BUTTONS],

    /// Drag delta for whichever button is dragging.
    pub mouse_drag_delta: (f64, f64),
}

impl Default for InputFrame {
    fn default() -> Self {
        Self {
            keys_pressed: Vec::new(),
            keys_released: Vec::new(),
            keys_down: Vec::new(),
            mouse_clicked: [false; MOUSE_BUTTONS],
            mouse_double_clicked: [false; MOUSE_BUTTONS],
            mouse_released: [false; MOUSE_BUTTONS],
            // -1.0 is "up"; 0.0 would read as held for zero seconds.
            mouse_down_duration: [-1.0; MOUSE_BUTTONS],
            mouse_wheel: 0.0,
            mouse_drag_amount: [0.0; DRAG_BUTTONS],
            mouse_drag_delta: (0.0, 0.0),
        }
    }
}

/// Last observed drag, kept across frames for host queries.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    pub dragging: bool,
    pub delta: (f64, f64),
}

/// Routes input snapshots to the event callbacks of a single handler item.
#[derive(Debug)]
pub struct InputRouter {
    drag_threshold: f64,
    drag_state: DragState,
}

impl InputRouter {
    pub fn new(drag_threshold: f64) -> Self {
        Self {
            drag_threshold,
            drag_state: DragState::default(),
        }
    }

    pub fn drag_state(&self) -> DragState {
        self.drag_state
    }

    /// Route one frame of input to `handler`'s callbacks. `window_name` is
    /// the sender for all mouse events; key events use the key code as
    /// sender instead.
    pub fn route(
        &mut self,
        handler: &Item,
        window_name: &str,
        input: &InputFrame,
        dispatcher: &CallbackDispatcher,
    ) {
        if handler.keyboard_handled {
            self.route_keys(handler, input, dispatcher);
        }

        // early opt out of mouse events
        if !handler.mouse_handled {
            return;
        }

        let callbacks = &handler.callbacks;

        if input.mouse_wheel != 0.0 {
            if let Some(callback) = &callbacks.mouse_wheel {
                dispatcher.invoke(callback, window_name, Payload::Pair(0, input.mouse_wheel));
            }
        }

        // Dragging is routed separately since only a single button can be
        // dragged at a time.
        if let Some(callback) = &callbacks.mouse_drag {
            for button in 0..DRAG_BUTTONS {
                if input.mouse_drag_amount[button] >= self.drag_threshold {
                    self.drag_state = DragState {
                        dragging: true,
                        delta: input.mouse_drag_delta,
                    };
                    dispatcher.invoke(callback, window_name, Payload::Pair(button as i64, 0.0));
                    break;
                }

                self.drag_state = DragState::default();
            }
        }

        for button in 0..MOUSE_BUTTONS {
            let number = Payload::Int(button as i64);

            if input.mouse_clicked[button] {
                if let Some(callback) = &callbacks.mouse_click {
                    dispatcher.invoke(callback, window_name, number.clone());
                }
            }

            if input.mouse_down_duration[button] >= 0.0 {
                if let Some(callback) = &callbacks.mouse_down {
                    dispatcher.invoke(
                        callback,
                        window_name,
                        Payload::Pair(button as i64, input.mouse_down_duration[button]),
                    );
                }
            }

            if input.mouse_double_clicked[button] {
                if let Some(callback) = &callbacks.mouse_double_click {
                    dispatcher.invoke(callback, window_name, number.clone());
                }
            }

            if input.mouse_released[button] {
                if let Some(callback) = &callbacks.mouse_release {
                    dispatcher.invoke(callback, window_name, number);
                }
            }
        }
    }

    fn route_keys(&self, handler: &Item, input: &InputFrame, dispatcher: &CallbackDispatcher) {
        let callbacks = &handler.callbacks;

        if let Some(callback) = &callbacks.key_press {
            for key in &input.keys_pressed {
                dispatcher.invoke(callback, &key.to_string(), Payload::Empty);
            }
        }

        if let Some(callback) = &callbacks.key_down {
            for (key, duration) in &input.keys_down {
                dispatcher.invoke(callback, &key.to_string(), Payload::Float(*duration));
            }
        }

        if let Some(callback) = &callbacks.key_release {
            for key in &input.keys_released {
                dispatcher.invoke(callback, &key.to_string(), Payload::Empty);
            }
        }
    }
}
