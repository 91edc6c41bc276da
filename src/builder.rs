//! Tree builder
//!
//! Runs the factory registry over a card body and hands back the sinks that
//! still need data plus one resize handler for the whole tree.

use crate::binding::Bindings;
use crate::card::CardDocument;
use crate::factory::{BuildContext, FactoryRegistry};
use crate::fetch::ImageFetcher;
use crate::reflow::{ReflowBuilder, ResizeHandler};
use crate::toolkit::{Toolkit, WidgetId};
use std::rc::Rc;
use tracing::debug;

/// Output of one build
#[derive(Debug)]
pub struct Built {
    pub bindings: Bindings,
    pub on_resize: ResizeHandler,
}

pub struct TreeBuilder<'r> {
    registry: &'r FactoryRegistry,
    fetcher: Rc<dyn ImageFetcher>,
}

impl<'r> TreeBuilder<'r> {
    pub fn new(registry: &'r FactoryRegistry, fetcher: Rc<dyn ImageFetcher>) -> Self {
        Self { registry, fetcher }
    }

    /// Build `card` into `root`, a vertical container.
    ///
    /// Each top-level handler is wrapped around the ones before it, so the
    /// first element's handler runs last on resize.
    pub fn build(&self, card: &CardDocument, toolkit: &mut dyn Toolkit, root: WidgetId) -> Built {
        let mut bindings = Bindings::new();
        let mut reflow = ReflowBuilder::new();
        {
            let mut ctx = BuildContext::new(
                self.registry,
                toolkit,
                &mut bindings,
                Rc::clone(&self.fetcher),
            );
            for element in card.body() {
                if let Some(handler) = ctx.build_element(element, root) {
                    reflow.wrap(handler);
                }
            }
        }
        debug!(
            "Built {} elements ({} skipped entries), {} pending bindings",
            card.body().len(),
            card.skipped(),
            bindings.len()
        );
        Built {
            bindings,
            on_resize: reflow.finish(),
        }
    }
}
