//! Software rendering primitives
//!
//! A pixel buffer plus the text measurement and rasterization the scene
//! needs. No GPU dependencies; the host copies the buffer to the window.

use crate::toolkit::{Bitmap, Font, FontWeight};
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use fontdue::FontSettings;
use std::path::Path;
use tracing::{debug, warn};

/// Fonts tried when no font is configured
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// Pixel buffer for rendering
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0xFFFFFF; width * height], // White background
        }
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: u32) {
        let x0 = x;
        let y0 = y;
        let x1 = x + w as i32;
        let y1 = y + h as i32;

        if x1 <= 0 || y1 <= 0 || x0 >= self.width as i32 || y0 >= self.height as i32 {
            return;
        }

        let x_start = x0.max(0) as usize;
        let y_start = y0.max(0) as usize;
        let x_end = x1.min(self.width as i32) as usize;
        let y_end = y1.min(self.height as i32) as usize;

        for py in y_start..y_end {
            self.pixels[py * self.width + x_start..py * self.width + x_end].fill(color);
        }
    }

    pub fn draw_rect_outline(&mut self, x: i32, y: i32, w: u32, h: u32, color: u32, thickness: u32) {
        // Top
        self.fill_rect(x, y, w, thickness, color);
        // Bottom
        self.fill_rect(x, y + h as i32 - thickness as i32, w, thickness, color);
        // Left
        self.fill_rect(x, y, thickness, h, color);
        // Right
        self.fill_rect(x + w as i32 - thickness as i32, y, thickness, h, color);
    }

    /// Blend a pixel with alpha
    pub fn blend_pixel(&mut self, x: usize, y: usize, color: u32, alpha: u8) {
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = y * self.width + x;
        let bg = self.pixels[idx];

        let bg_r = (bg >> 16) & 0xFF;
        let bg_g = (bg >> 8) & 0xFF;
        let bg_b = bg & 0xFF;

        let fg_r = (color >> 16) & 0xFF;
        let fg_g = (color >> 8) & 0xFF;
        let fg_b = color & 0xFF;

        let a = alpha as u32;
        let inv_a = 255 - a;

        let r = (fg_r * a + bg_r * inv_a) / 255;
        let g = (fg_g * a + bg_g * inv_a) / 255;
        let b = (fg_b * a + bg_b * inv_a) / 255;

        self.pixels[idx] = (r << 16) | (g << 8) | b;
    }

    /// Draw an ARGB bitmap with its top-left corner at (x, y).
    pub fn blit(&mut self, bitmap: &Bitmap, x: i32, y: i32) {
        for by in 0..bitmap.height {
            let py = y + by as i32;
            if py < 0 || py >= self.height as i32 {
                continue;
            }
            for bx in 0..bitmap.width {
                let px = x + bx as i32;
                if px < 0 || px >= self.width as i32 {
                    continue;
                }
                let argb = bitmap.pixels[(by * bitmap.width + bx) as usize];
                let alpha = (argb >> 24) as u8;
                if alpha > 0 {
                    self.blend_pixel(px as usize, py as usize, argb & 0xFFFFFF, alpha);
                }
            }
        }
    }
}

/// Measures and draws text, with a real font when one is available
pub enum TextRenderer {
    Font(Box<fontdue::Font>),
    /// Average-advance estimate; glyphs are drawn as blocks.
    Estimate,
}

impl TextRenderer {
    pub fn estimate() -> Self {
        TextRenderer::Estimate
    }

    pub fn from_file(path: &Path) -> Option<Self> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Font {:?} not readable: {}", path, e);
                return None;
            }
        };
        match fontdue::Font::from_bytes(bytes, FontSettings::default()) {
            Ok(font) => Some(TextRenderer::Font(Box::new(font))),
            Err(e) => {
                warn!("Failed to load font {:?}: {}", path, e);
                None
            }
        }
    }

    /// The configured font, else the first system font found, else the
    /// estimate.
    pub fn load(configured: Option<&Path>) -> Self {
        if let Some(renderer) = configured.and_then(Self::from_file) {
            return renderer;
        }
        for candidate in SYSTEM_FONTS {
            if let Some(renderer) = Self::from_file(Path::new(candidate)) {
                debug!("Using system font {}", candidate);
                return renderer;
            }
        }
        warn!("No font available, falling back to estimated text metrics");
        TextRenderer::Estimate
    }

    pub fn text_width(&self, content: &str, font: Font) -> u32 {
        let width = match self {
            TextRenderer::Font(f) => content
                .chars()
                .map(|c| f.metrics(c, font.size).advance_width)
                .sum::<f32>()
                .ceil() as u32,
            TextRenderer::Estimate => {
                let avg = font.size * 0.55;
                ((content.chars().count() as f32 * avg) as u32).saturating_add(4)
            }
        };
        match font.weight {
            FontWeight::Bold if !content.is_empty() => width + 1,
            _ => width,
        }
    }

    pub fn line_height(&self, font: Font) -> u32 {
        match self {
            TextRenderer::Font(f) => f
                .horizontal_line_metrics(font.size)
                .map(|m| m.new_line_size.ceil() as u32)
                .unwrap_or(font.size as u32 + 6),
            TextRenderer::Estimate => font.size as u32 + 6,
        }
    }

    /// Greedy word wrap. Existing line breaks are kept.
    pub fn wrap_text(&self, content: &str, font: Font, width_limit: u32) -> Vec<String> {
        let space_width = self.text_width(" ", font);
        let mut lines: Vec<String> = vec![];

        for paragraph in content.split('\n') {
            let mut current = String::new();
            let mut current_width = 0u32;

            for word in paragraph.split_whitespace() {
                let word_width = self.text_width(word, font);
                if current.is_empty() {
                    current.push_str(word);
                    current_width = word_width;
                } else if current_width + space_width + word_width <= width_limit {
                    current.push(' ');
                    current.push_str(word);
                    current_width += space_width + word_width;
                } else {
                    lines.push(std::mem::take(&mut current));
                    current.push_str(word);
                    current_width = word_width;
                }
            }

            lines.push(current);
        }

        lines
    }

    /// Draw one line with its top edge at `y`.
    pub fn draw_line(&self, fb: &mut FrameBuffer, text: &str, x: i32, y: i32, font: Font, color: u32) {
        let passes = if font.weight == FontWeight::Bold { 2 } else { 1 };
        for pass in 0..passes {
            match self {
                TextRenderer::Font(f) => draw_glyphs(fb, f, text, x + pass, y, font.size, color),
                TextRenderer::Estimate => draw_blocks(fb, text, x + pass, y, font.size, color),
            }
        }
    }
}

fn draw_glyphs(fb: &mut FrameBuffer, font: &fontdue::Font, text: &str, x: i32, y: i32, size: f32, color: u32) {
    let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings {
        x: x as f32,
        y: y as f32,
        ..LayoutSettings::default()
    });
    layout.append(&[font], &TextStyle::new(text, size, 0));

    for glyph in layout.glyphs() {
        let (metrics, bitmap) = font.rasterize_config(glyph.key);
        let gx = glyph.x.round() as i32;
        let gy = glyph.y.round() as i32;

        for (i, alpha) in bitmap.iter().enumerate() {
            if *alpha == 0 {
                continue;
            }
            let px = gx + (i % metrics.width) as i32;
            let py = gy + (i / metrics.width) as i32;
            if px >= 0 && py >= 0 {
                fb.blend_pixel(px as usize, py as usize, color, *alpha);
            }
        }
    }
}

fn draw_blocks(fb: &mut FrameBuffer, text: &str, x: i32, y: i32, size: f32, color: u32) {
    let advance = size * 0.55;
    let glyph_h = (size * 0.7) as u32;
    let top = y + (size * 0.3) as i32;
    for (i, c) in text.chars().enumerate() {
        if c.is_whitespace() {
            continue;
        }
        let gx = x + (i as f32 * advance) as i32 + 2;
        fb.fill_rect(gx, top, (advance * 0.8).max(1.0) as u32, glyph_h, color);
    }
}
