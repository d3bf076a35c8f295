// Render backend seam
//
// The runtime never issues drawing calls itself. Everything the frame
// scheduler needs from the rendering layer sits behind `RenderBackend`,
// and all timing behind `Clock`, so tests can drive both by hand.

use crate::tree::ItemTree;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// RGBA color, components in `0.0..=1.0`.
pub type Color = [f32; 4];

/// Named style color slots, applied to the backend as one table.
///
/// Slots a theme leaves unset are filled from the dark defaults before the
/// first frame, so backends always see a complete table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleTable {
    pub colors: IndexMap<String, Color>,
}

impl StyleTable {
    /// Every color slot a complete table carries.
    pub const SLOTS: [&'static str; 12] = [
        "Text",
        "WindowBg",
        "ChildBg",
        "PopupBg",
        "Border",
        "FrameBg",
        "TitleBg",
        "TitleBgActive",
        "MenuBarBg",
        "Button",
        "ButtonHovered",
        "ButtonActive",
    ];

    pub fn set(&mut self, slot: &str, color: Color) {
        self.colors.insert(slot.to_string(), color);
    }

    pub fn get(&self, slot: &str) -> Option<Color> {
        self.colors.get(slot).copied()
    }

    pub fn is_complete(&self) -> bool {
        Self::SLOTS.iter().all(|slot| self.colors.contains_key(*slot))
    }

    /// Fill every unset slot from the dark defaults.
    pub fn fill_defaults(&mut self) {
        let defaults = Theme::Dark.style();
        for slot in Self::SLOTS {
            if !self.colors.contains_key(slot) {
                self.colors
                    .insert(slot.to_string(), defaults.colors[slot]);
            }
        }
    }
}

/// Built-in theme presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
    Classic,
}

impl Theme {
    /// Case-insensitive preset lookup by configured name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            "classic" => Some(Self::Classic),
            _ => None,
        }
    }

    /// The preset's complete style table.
    pub fn style(self) -> StyleTable {
        let mut table = StyleTable::default();
        match self {
            Self::Dark => {
                table.set("Text", [1.0, 1.0, 1.0, 1.0]);
                table.set("WindowBg", [0.06, 0.06, 0.06, 0.94]);
                table.set("ChildBg", [0.0, 0.0, 0.0, 0.0]);
                table.set("PopupBg", [0.08, 0.08, 0.08, 0.94]);
                table.set("Border", [0.43, 0.43, 0.50, 0.50]);
                table.set("FrameBg", [0.16, 0.29, 0.48, 0.54]);
                table.set("TitleBg", [0.04, 0.04, 0.04, 1.0]);
                table.set("TitleBgActive", [0.16, 0.29, 0.48, 1.0]);
                table.set("MenuBarBg", [0.14, 0.14, 0.14, 1.0]);
                table.set("Button", [0.26, 0.59, 0.98, 0.40]);
                table.set("ButtonHovered", [0.26, 0.59, 0.98, 1.0]);
                table.set("ButtonActive", [0.06, 0.53, 0.98, 1.0]);
            }
            Self::Light => {
                table.set("Text", [0.0, 0.0, 0.0, 1.0]);
                table.set("WindowBg", [0.94, 0.94, 0.94, 1.0]);
                table.set("ChildBg", [0.0, 0.0, 0.0, 0.0]);
                table.set("PopupBg", [1.0, 1.0, 1.0, 0.98]);
                table.set("Border", [0.0, 0.0, 0.0, 0.30]);
                table.set("FrameBg", [1.0, 1.0, 1.0, 1.0]);
                table.set("TitleBg", [0.96, 0.96, 0.96, 1.0]);
                table.set("TitleBgActive", [0.82, 0.82, 0.82, 1.0]);
                table.set("MenuBarBg", [0.86, 0.86, 0.86, 1.0]);
                table.set("Button", [0.26, 0.59, 0.98, 0.40]);
                table.set("ButtonHovered", [0.26, 0.59, 0.98, 1.0]);
                table.set("ButtonActive", [0.06, 0.53, 0.98, 1.0]);
            }
            Self::Classic => {
                table.set("Text", [0.90, 0.90, 0.90, 1.0]);
                table.set("WindowBg", [0.0, 0.0, 0.0, 0.70]);
                table.set("ChildBg", [0.0, 0.0, 0.0, 0.0]);
                table.set("PopupBg", [0.11, 0.11, 0.14, 0.92]);
                table.set("Border", [0.50, 0.50, 0.50, 0.50]);
                table.set("FrameBg", [0.43, 0.43, 0.43, 0.39]);
                table.set("TitleBg", [0.27, 0.27, 0.54, 0.83]);
                table.set("TitleBgActive", [0.32, 0.32, 0.63, 0.87]);
                table.set("MenuBarBg", [0.40, 0.40, 0.55, 0.80]);
                table.set("Button", [0.35, 0.40, 0.61, 0.62]);
                table.set("ButtonHovered", [0.40, 0.48, 0.71, 0.79]);
                table.set("ButtonActive", [0.46, 0.54, 0.80, 1.0]);
            }
        }
        table
    }
}

/// The rendering layer as the frame scheduler sees it.
pub trait RenderBackend: Send {
    /// Draw one frame of the tree.
    fn draw_frame(&mut self, tree: &ItemTree);

    /// Push the global UI scale. Called every frame during render-prep.
    fn set_global_scale(&mut self, scale: f32);

    /// Apply a complete style table. Called when the style changed.
    fn apply_style(&mut self, style: &StyleTable);
}

/// Backend that draws nothing and records what it was asked to do.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_drawn: usize,
    pub last_scale: f32,
    pub styles_applied: usize,
    pub last_style: Option<StyleTable>,
}

impl NullRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderBackend for NullRenderer {
    fn draw_frame(&mut self, _tree: &ItemTree) {
        self.frames_drawn += 1;
    }

    fn set_global_scale(&mut self, scale: f32) {
        self.last_scale = scale;
    }

    fn apply_style(&mut self, style: &StyleTable) {
        self.styles_applied += 1;
        self.last_style = Some(style.clone());
    }
}

/// Monotonic time source for frame timing and the pool idle timer.
pub trait Clock: Send {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall clock anchored at construction.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock. Cloned handles share the same time, so a test can
/// keep one handle and advance it while the runtime reads the other.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }

    pub fn set(&self, to: Duration) {
        *self.now.lock().unwrap() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }
}
