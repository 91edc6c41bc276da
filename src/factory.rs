//! Element factories
//!
//! A [`FactoryRegistry`] maps element type names to factory functions. A
//! factory turns one element into widgets under a parent and returns the
//! resize behavior of what it built. All property values go through
//! [`BuildContext::bind`], so no factory needs to know whether a value is a
//! literal or a `${path}` binding.

use crate::binding::{binding_path, Bindings};
use crate::card::{Element, ElementKind};
use crate::config::CardStyle;
use crate::fetch::{load_bitmap, ImageFetcher};
use crate::reflow::{ReflowBuilder, ResizeHandler};
use crate::toolkit::{Orientation, Toolkit, WidgetId};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, warn};

/// Builds one element under `parent`
pub type Factory = fn(&Element, WidgetId, &mut BuildContext<'_>) -> ResizeHandler;

/// Type name to factory lookup, fixed once handed to a builder
#[derive(Clone)]
pub struct FactoryRegistry {
    factories: HashMap<String, Factory>,
    style: CardStyle,
}

impl FactoryRegistry {
    /// A registry that knows no element types
    pub fn empty(style: CardStyle) -> Self {
        Self {
            factories: HashMap::new(),
            style,
        }
    }

    /// `TextBlock`, `ColumnSet`, `Column` and `Image`
    pub fn with_defaults(style: CardStyle) -> Self {
        let mut registry = Self::empty(style);
        for kind in ElementKind::ALL {
            let factory: Factory = match kind {
                ElementKind::TextBlock => text_block,
                ElementKind::ColumnSet => column_set,
                ElementKind::Column => column,
                ElementKind::Image => image,
            };
            registry.register(kind.type_name(), factory);
        }
        registry
    }

    pub fn register(&mut self, type_name: impl Into<String>, factory: Factory) -> &mut Self {
        self.factories.insert(type_name.into(), factory);
        self
    }

    pub fn get(&self, type_name: &str) -> Option<Factory> {
        self.factories.get(type_name).copied()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    pub fn style(&self) -> &CardStyle {
        &self.style
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::with_defaults(CardStyle::default())
    }
}

/// What a factory gets to work with while building
pub struct BuildContext<'a> {
    registry: &'a FactoryRegistry,
    toolkit: &'a mut dyn Toolkit,
    bindings: &'a mut Bindings,
    fetcher: Rc<dyn ImageFetcher>,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        registry: &'a FactoryRegistry,
        toolkit: &'a mut dyn Toolkit,
        bindings: &'a mut Bindings,
        fetcher: Rc<dyn ImageFetcher>,
    ) -> Self {
        Self {
            registry,
            toolkit,
            bindings,
            fetcher,
        }
    }

    /// Apply `raw` through `setter`, now for literals or at resolution time
    /// for `${path}` values.
    pub fn bind(&mut self, raw: &str, setter: impl FnOnce(&mut dyn Toolkit, &str) + 'static) {
        self.bindings.bind(&mut *self.toolkit, raw, Box::new(setter));
    }

    /// Like [`BuildContext::bind`], but literals also wait for resolution
    /// so they apply after every value bound before them.
    pub fn defer(&mut self, raw: &str, setter: impl FnOnce(&mut dyn Toolkit, &str) + 'static) {
        self.bindings.defer(raw, Box::new(setter));
    }

    /// Add a finished widget to its parent's layout.
    pub fn attach(&mut self, parent: WidgetId, widget: WidgetId) {
        self.toolkit.attach(parent, widget);
    }

    pub fn toolkit(&mut self) -> &mut dyn Toolkit {
        &mut *self.toolkit
    }

    pub fn style(&self) -> &CardStyle {
        self.registry.style()
    }

    pub fn fetcher(&self) -> Rc<dyn ImageFetcher> {
        Rc::clone(&self.fetcher)
    }

    /// Look up the element's factory and run it. Unknown types build
    /// nothing and return `None`.
    pub fn build_element(&mut self, element: &Element, parent: WidgetId) -> Option<ResizeHandler> {
        let registry = self.registry;
        match registry.get(element.type_name()) {
            Some(factory) => Some(factory(element, parent, self)),
            None => {
                debug!("Skipping unknown element type {:?}", element.type_name());
                None
            }
        }
    }

    /// Build `elements` under `parent`, composing their handlers in order.
    pub fn build_children(&mut self, elements: &[Element], parent: WidgetId) -> ResizeHandler {
        let mut reflow = ReflowBuilder::new();
        for element in elements {
            if let Some(handler) = self.build_element(element, parent) {
                reflow.push(handler);
            }
        }
        reflow.finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Built-in factories
// ─────────────────────────────────────────────────────────────────────────────

fn text_block(element: &Element, parent: WidgetId, ctx: &mut BuildContext<'_>) -> ResizeHandler {
    let label = ctx.toolkit().create_text(parent, "");
    ctx.toolkit().set_auto_layout(label, true);

    let text = element.str_prop("text").unwrap_or_default();
    ctx.bind(text, move |tk, value| tk.set_label(label, value));

    if let Some(size) = element.str_prop("size") {
        let ratio = ctx.style().medium_text_scale;
        ctx.bind(size, move |tk, value| {
            if value == "Medium" {
                let font = tk.font(label).scaled(ratio);
                tk.set_font(label, font);
            }
        });
    }

    if let Some(weight) = element.str_prop("weight") {
        ctx.bind(weight, move |tk, value| {
            if value == "Bolder" {
                let font = tk.font(label).bold();
                tk.set_font(label, font);
            }
        });
    }

    ctx.attach(parent, label);

    ResizeHandler::new(move |tk, width| {
        let text = tk.label(label).replace('\n', " ");
        tk.set_label(label, &text);
        tk.wrap(label, width);
    })
}

fn column_set(element: &Element, parent: WidgetId, ctx: &mut BuildContext<'_>) -> ResizeHandler {
    let row = ctx.toolkit().create_container(parent, Orientation::Horizontal);
    let on_resize = ctx.build_children(&element.children("columns"), row);
    ctx.attach(parent, row);
    on_resize
}

fn column(element: &Element, parent: WidgetId, ctx: &mut BuildContext<'_>) -> ResizeHandler {
    let stack = ctx.toolkit().create_container(parent, Orientation::Vertical);
    let on_resize = ctx.build_children(&element.children("items"), stack);
    ctx.attach(parent, stack);
    on_resize
}

fn image(element: &Element, parent: WidgetId, ctx: &mut BuildContext<'_>) -> ResizeHandler {
    let picture = ctx.toolkit().create_image(parent);

    let style = *ctx.style();
    let size = element.str_prop("size").unwrap_or("Medium");
    ctx.bind(size, move |tk, value| {
        let width = match value {
            "Small" => style.small_image_width,
            "Medium" => style.medium_image_width,
            _ => return,
        };
        tk.set_fixed_width(picture, width);
        tk.set_auto_layout(picture, false);
    });

    if let Some(url) = element.str_prop("url") {
        let fetcher = ctx.fetcher();
        let load = move |tk: &mut dyn Toolkit, value: &str| {
            match load_bitmap(&*fetcher, value, tk.width(picture)) {
                Ok(bitmap) => tk.set_bitmap(picture, bitmap),
                Err(e) => warn!("Keeping placeholder for image {:?}: {}", value, e),
            }
        };
        // The bitmap is scaled to the fixed width, so it must load after a
        // bound size is known.
        if binding_path(size).is_some() {
            ctx.defer(url, load);
        } else {
            ctx.bind(url, load);
        }
    }

    ctx.attach(parent, picture);
    ResizeHandler::noop()
}
