//! Widget toolkit interface
//!
//! The card compiler never draws anything itself. It creates widgets, attaches
//! them to containers and mutates a handful of their properties through this
//! trait; [`crate::scene::Scene`] is the in-tree implementation.

/// Opaque handle to a widget owned by a toolkit
///
/// Toolkits that reuse storage bump the generation so handles to dropped
/// widgets never reach the widget that took their place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId {
    index: usize,
    generation: u32,
}

impl WidgetId {
    pub fn new(index: usize) -> Self {
        Self::with_generation(index, 0)
    }

    pub fn with_generation(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> usize {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Main axis of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font of a text widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub size: f32,
    pub weight: FontWeight,
}

impl Font {
    pub const DEFAULT_SIZE: f32 = 14.0;

    pub fn new(size: f32) -> Self {
        Self {
            size,
            weight: FontWeight::Normal,
        }
    }

    pub fn scaled(self, ratio: f32) -> Self {
        Self {
            size: self.size * ratio,
            ..self
        }
    }

    pub fn bold(self) -> Self {
        Self {
            weight: FontWeight::Bold,
            ..self
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

/// Decoded pixels ready to be shown by an image widget
///
/// Pixels are row-major `0xAARRGGBB`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x < self.width && y < self.height {
            self.pixels.get((y * self.width + x) as usize).copied()
        } else {
            None
        }
    }
}

/// What the card compiler needs from a GUI toolkit.
///
/// Widgets are created with a parent but only take part in its layout once
/// [`Toolkit::attach`] is called. Operations on handles that no longer exist
/// (e.g. from a replaced card) are ignored.
pub trait Toolkit {
    /// A detached vertical container to build a card into.
    fn create_root(&mut self) -> WidgetId;
    fn create_container(&mut self, parent: WidgetId, orientation: Orientation) -> WidgetId;
    fn create_text(&mut self, parent: WidgetId, text: &str) -> WidgetId;
    /// An image widget showing a placeholder until a bitmap is set.
    fn create_image(&mut self, parent: WidgetId) -> WidgetId;

    /// Add `child` to the layout of `parent`.
    fn attach(&mut self, parent: WidgetId, child: WidgetId);

    /// Show the tree under `root`, dropping whatever was shown before.
    fn mount(&mut self, root: WidgetId);

    fn label(&self, widget: WidgetId) -> String;
    fn set_label(&mut self, widget: WidgetId, text: &str);
    /// Break the current label into lines no wider than `width` pixels.
    fn wrap(&mut self, widget: WidgetId, width: u32);

    fn font(&self, widget: WidgetId) -> Font;
    fn set_font(&mut self, widget: WidgetId, font: Font);

    /// Current width in pixels: the fixed width if one is set, otherwise
    /// the width from the last layout pass.
    fn width(&self, widget: WidgetId) -> u32;
    fn set_fixed_width(&mut self, widget: WidgetId, width: u32);
    /// Whether the widget's size follows its container during layout.
    fn set_auto_layout(&mut self, widget: WidgetId, enabled: bool);
    fn set_bitmap(&mut self, widget: WidgetId, bitmap: Bitmap);

    /// Recompute positions and sizes of the mounted tree.
    fn layout(&mut self, width: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_helpers() {
        let font = Font::new(10.0).scaled(1.5).bold();
        assert_eq!(font.size, 15.0);
        assert_eq!(font.weight, FontWeight::Bold);
    }

    #[test]
    fn test_widget_id_generation_distinguishes_handles() {
        let old = WidgetId::new(3);
        let reused = WidgetId::with_generation(3, 1);
        assert_eq!(old.index(), reused.index());
        assert_ne!(old, reused);
    }

    #[test]
    fn test_bitmap_pixel_bounds() {
        let bitmap = Bitmap::new(2, 1, vec![1, 2]);
        assert_eq!(bitmap.pixel(1, 0), Some(2));
        assert_eq!(bitmap.pixel(2, 0), None);
    }
}
