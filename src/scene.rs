//! Retained widget scene
//!
//! [`Scene`] is the in-tree [`Toolkit`]: an arena of containers, text labels
//! and images with a simple box layout, painted into a [`FrameBuffer`].

use crate::render::{FrameBuffer, TextRenderer};
use crate::toolkit::{Bitmap, Font, Orientation, Toolkit, WidgetId};
use std::collections::HashSet;
use std::fmt::Write;

/// Space around every child of a vertical container
pub const BORDER: u32 = 3;

const TEXT_COLOR: u32 = 0x202020;
const PLACEHOLDER_FILL: u32 = 0xEEEEEE;
const PLACEHOLDER_EDGE: u32 = 0xC8C8C8;

/// Position and size of a widget after layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    pub base_font_size: f32,
    pub placeholder_height: u32,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            base_font_size: Font::DEFAULT_SIZE,
            placeholder_height: 64,
        }
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Container {
        orientation: Orientation,
        children: Vec<WidgetId>,
    },
    Text {
        label: String,
        font: Font,
    },
    Image {
        bitmap: Option<Bitmap>,
    },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<WidgetId>,
    fixed_width: Option<u32>,
    auto_layout: bool,
    rect: Rect,
}

/// What a layout pass needs to know about one node, detached from the arena
enum Plan {
    Stack(Orientation, Vec<WidgetId>),
    Text(Vec<u32>, u32),
    Image {
        fixed: Option<u32>,
        auto_layout: bool,
        natural: Option<(u32, u32)>,
    },
}

/// One arena entry; `generation` counts how often the slot was reused.
#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

pub struct Scene {
    slots: Vec<Slot>,
    /// Indices of empty slots, reused before the arena grows
    free: Vec<usize>,
    root: Option<WidgetId>,
    text: TextRenderer,
    options: SceneOptions,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(TextRenderer::estimate(), SceneOptions::default())
    }
}

impl Scene {
    pub fn new(text: TextRenderer, options: SceneOptions) -> Self {
        Self {
            slots: vec![],
            free: vec![],
            root: None,
            text,
            options,
        }
    }

    /// The mounted root, if any card has been shown
    pub fn root(&self) -> Option<WidgetId> {
        self.root
    }

    pub fn rect(&self, widget: WidgetId) -> Option<Rect> {
        self.node(widget).map(|n| n.rect)
    }

    pub fn parent(&self, widget: WidgetId) -> Option<WidgetId> {
        self.node(widget).and_then(|n| n.parent)
    }

    pub fn children(&self, widget: WidgetId) -> &[WidgetId] {
        match self.node(widget).map(|n| &n.kind) {
            Some(NodeKind::Container { children, .. }) => children,
            _ => &[],
        }
    }

    pub fn orientation(&self, widget: WidgetId) -> Option<Orientation> {
        match self.node(widget).map(|n| &n.kind) {
            Some(NodeKind::Container { orientation, .. }) => Some(*orientation),
            _ => None,
        }
    }

    pub fn is_text(&self, widget: WidgetId) -> bool {
        matches!(self.node(widget).map(|n| &n.kind), Some(NodeKind::Text { .. }))
    }

    pub fn is_image(&self, widget: WidgetId) -> bool {
        matches!(self.node(widget).map(|n| &n.kind), Some(NodeKind::Image { .. }))
    }

    pub fn bitmap(&self, widget: WidgetId) -> Option<&Bitmap> {
        match self.node(widget).map(|n| &n.kind) {
            Some(NodeKind::Image { bitmap }) => bitmap.as_ref(),
            _ => None,
        }
    }

    pub fn fixed_width(&self, widget: WidgetId) -> Option<u32> {
        self.node(widget).and_then(|n| n.fixed_width)
    }

    pub fn auto_layout(&self, widget: WidgetId) -> bool {
        self.node(widget).map(|n| n.auto_layout).unwrap_or(false)
    }

    /// Number of live widgets, mounted or not
    pub fn widget_count(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    /// Arena size, live or free
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Every live widget under `widget` (inclusive), depth-first
    pub fn descendants(&self, widget: WidgetId) -> Vec<WidgetId> {
        let mut out = vec![];
        let mut stack = vec![widget];
        while let Some(id) = stack.pop() {
            if self.node(id).is_none() {
                continue;
            }
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    pub fn content_height(&self) -> u32 {
        self.root
            .and_then(|root| self.rect(root))
            .map(|r| r.height)
            .unwrap_or(0)
    }

    fn node(&self, widget: WidgetId) -> Option<&Node> {
        self.slots
            .get(widget.index())
            .filter(|slot| slot.generation == widget.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, widget: WidgetId) -> Option<&mut Node> {
        self.slots
            .get_mut(widget.index())
            .filter(|slot| slot.generation == widget.generation())
            .and_then(|slot| slot.node.as_mut())
    }

    fn push(&mut self, kind: NodeKind, parent: Option<WidgetId>) -> WidgetId {
        let node = Node {
            kind,
            parent,
            fixed_width: None,
            auto_layout: true,
            rect: Rect::default(),
        };
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        slot.node = Some(node);
        WidgetId::with_generation(index, slot.generation)
    }

    // ─────────────────────────────────────────────────────────────
    // Layout
    // ─────────────────────────────────────────────────────────────

    fn plan(&self, widget: WidgetId) -> Option<Plan> {
        let node = self.node(widget)?;
        let plan = match &node.kind {
            NodeKind::Container {
                orientation,
                children,
            } => Plan::Stack(*orientation, children.clone()),
            NodeKind::Text { label, font } => {
                let widths = label
                    .split('\n')
                    .map(|line| self.text.text_width(line, *font))
                    .collect();
                Plan::Text(widths, self.text.line_height(*font))
            }
            NodeKind::Image { bitmap } => Plan::Image {
                fixed: node.fixed_width,
                auto_layout: node.auto_layout,
                natural: bitmap.as_ref().map(|b| (b.width, b.height)),
            },
        };
        Some(plan)
    }

    fn layout_node(&mut self, widget: WidgetId, x: i32, y: i32, avail: u32) -> Rect {
        let Some(plan) = self.plan(widget) else {
            return Rect::default();
        };

        let rect = match plan {
            Plan::Stack(Orientation::Vertical, children) => {
                let inner = avail.saturating_sub(2 * BORDER);
                let mut cy = y;
                for child in children {
                    let r = self.layout_node(child, x + BORDER as i32, cy + BORDER as i32, inner);
                    cy += (r.height + 2 * BORDER) as i32;
                }
                Rect {
                    x,
                    y,
                    width: avail,
                    height: (cy - y) as u32,
                }
            }
            Plan::Stack(Orientation::Horizontal, children) => {
                let slot = match children.len() as u32 {
                    0 => 0,
                    n => avail / n,
                };
                let mut height = 0;
                for (i, child) in children.into_iter().enumerate() {
                    let r = self.layout_node(child, x + (i as u32 * slot) as i32, y, slot);
                    height = height.max(r.height);
                }
                Rect {
                    x,
                    y,
                    width: avail,
                    height,
                }
            }
            Plan::Text(widths, line_height) => Rect {
                x,
                y,
                width: widths.iter().copied().max().unwrap_or(0).min(avail),
                height: line_height * widths.len() as u32,
            },
            Plan::Image {
                fixed,
                auto_layout,
                natural,
            } => {
                let width = match (fixed, auto_layout) {
                    (Some(w), false) => w,
                    (Some(w), true) => w.min(avail),
                    (None, _) => avail,
                };
                let height = match natural {
                    Some((nw, nh)) if nw > 0 => {
                        ((nh as u64 * width as u64) / nw as u64).max(1) as u32
                    }
                    _ => self.options.placeholder_height,
                };
                Rect {
                    x,
                    y,
                    width,
                    height,
                }
            }
        };

        if let Some(node) = self.node_mut(widget) {
            node.rect = rect;
        }
        rect
    }

    // ─────────────────────────────────────────────────────────────
    // Painting
    // ─────────────────────────────────────────────────────────────

    pub fn paint(&self, fb: &mut FrameBuffer) {
        fb.clear(0xFFFFFF);
        if let Some(root) = self.root {
            self.paint_node(fb, root);
        }
    }

    fn paint_node(&self, fb: &mut FrameBuffer, widget: WidgetId) {
        let Some(node) = self.node(widget) else {
            return;
        };
        let rect = node.rect;
        match &node.kind {
            NodeKind::Container { children, .. } => {
                for child in children {
                    self.paint_node(fb, *child);
                }
            }
            NodeKind::Text { label, font } => {
                let line_height = self.text.line_height(*font) as i32;
                for (i, line) in label.split('\n').enumerate() {
                    let y = rect.y + i as i32 * line_height;
                    self.text.draw_line(fb, line, rect.x, y, *font, TEXT_COLOR);
                }
            }
            NodeKind::Image { bitmap: Some(bitmap) } => {
                fb.blit(bitmap, rect.x, rect.y);
            }
            NodeKind::Image { bitmap: None } => {
                fb.fill_rect(rect.x, rect.y, rect.width, rect.height, PLACEHOLDER_FILL);
                fb.draw_rect_outline(rect.x, rect.y, rect.width, rect.height, PLACEHOLDER_EDGE, 1);
            }
        }
    }

    /// Indented dump of the mounted tree with the last layout
    pub fn describe(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root {
            self.describe_node(&mut out, root, 0);
        }
        out
    }

    fn describe_node(&self, out: &mut String, widget: WidgetId, indent: usize) {
        let Some(node) = self.node(widget) else {
            return;
        };
        let r = node.rect;
        let prefix = " ".repeat(indent);
        let geometry = format!("({},{} {}x{})", r.x, r.y, r.width, r.height);
        let _ = match &node.kind {
            NodeKind::Container { orientation, .. } => {
                writeln!(out, "{}{:?} {}", prefix, orientation, geometry)
            }
            NodeKind::Text { label, font } => writeln!(
                out,
                "{}Text {:?} {} size={} {:?}",
                prefix, label, geometry, font.size, font.weight
            ),
            NodeKind::Image { bitmap } => writeln!(
                out,
                "{}Image {} {}{}",
                prefix,
                if bitmap.is_some() { "bitmap" } else { "placeholder" },
                geometry,
                node.fixed_width
                    .map(|w| format!(" fixed={}", w))
                    .unwrap_or_default()
            ),
        };
        for child in self.children(widget) {
            self.describe_node(out, *child, indent + 2);
        }
    }
}

impl Toolkit for Scene {
    fn create_root(&mut self) -> WidgetId {
        self.push(
            NodeKind::Container {
                orientation: Orientation::Vertical,
                children: vec![],
            },
            None,
        )
    }

    fn create_container(&mut self, parent: WidgetId, orientation: Orientation) -> WidgetId {
        self.push(
            NodeKind::Container {
                orientation,
                children: vec![],
            },
            Some(parent),
        )
    }

    fn create_text(&mut self, parent: WidgetId, text: &str) -> WidgetId {
        let font = Font::new(self.options.base_font_size);
        self.push(
            NodeKind::Text {
                label: text.to_string(),
                font,
            },
            Some(parent),
        )
    }

    fn create_image(&mut self, parent: WidgetId) -> WidgetId {
        self.push(NodeKind::Image { bitmap: None }, Some(parent))
    }

    fn attach(&mut self, parent: WidgetId, child: WidgetId) {
        if self.node(child).is_none() || parent == child {
            return;
        }
        let attached = match self.node_mut(parent).map(|n| &mut n.kind) {
            Some(NodeKind::Container { children, .. }) => {
                if !children.contains(&child) {
                    children.push(child);
                }
                true
            }
            _ => false,
        };
        if attached {
            if let Some(node) = self.node_mut(child) {
                node.parent = Some(parent);
            }
        }
    }

    /// Drops every widget that is not under `root`.
    fn mount(&mut self, root: WidgetId) {
        if self.node(root).is_none() {
            return;
        }
        let keep: HashSet<usize> = self
            .descendants(root)
            .into_iter()
            .map(WidgetId::index)
            .collect();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.is_some() && !keep.contains(&index) {
                slot.node = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index);
            }
        }
        self.root = Some(root);
    }

    fn label(&self, widget: WidgetId) -> String {
        match self.node(widget).map(|n| &n.kind) {
            Some(NodeKind::Text { label, .. }) => label.clone(),
            _ => String::new(),
        }
    }

    fn set_label(&mut self, widget: WidgetId, text: &str) {
        if let Some(NodeKind::Text { label, .. }) = self.node_mut(widget).map(|n| &mut n.kind) {
            *label = text.to_string();
        }
    }

    fn wrap(&mut self, widget: WidgetId, width: u32) {
        let wrapped = match self.node(widget).map(|n| &n.kind) {
            Some(NodeKind::Text { label, font }) => {
                self.text.wrap_text(label, *font, width).join("\n")
            }
            _ => return,
        };
        self.set_label(widget, &wrapped);
    }

    fn font(&self, widget: WidgetId) -> Font {
        match self.node(widget).map(|n| &n.kind) {
            Some(NodeKind::Text { font, .. }) => *font,
            _ => Font::new(self.options.base_font_size),
        }
    }

    fn set_font(&mut self, widget: WidgetId, new_font: Font) {
        if let Some(NodeKind::Text { font, .. }) = self.node_mut(widget).map(|n| &mut n.kind) {
            *font = new_font;
        }
    }

    fn width(&self, widget: WidgetId) -> u32 {
        self.node(widget)
            .map(|n| n.fixed_width.unwrap_or(n.rect.width))
            .unwrap_or(0)
    }

    fn set_fixed_width(&mut self, widget: WidgetId, width: u32) {
        if let Some(node) = self.node_mut(widget) {
            node.fixed_width = Some(width);
            node.rect.width = width;
        }
    }

    fn set_auto_layout(&mut self, widget: WidgetId, enabled: bool) {
        if let Some(node) = self.node_mut(widget) {
            node.auto_layout = enabled;
        }
    }

    fn set_bitmap(&mut self, widget: WidgetId, new_bitmap: Bitmap) {
        if let Some(NodeKind::Image { bitmap }) = self.node_mut(widget).map(|n| &mut n.kind) {
            *bitmap = Some(new_bitmap);
        }
    }

    fn layout(&mut self, width: u32) {
        if let Some(root) = self.root {
            self.layout_node(root, 0, 0, width);
        }
    }
}
