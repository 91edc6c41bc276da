//! Reflow cascade
//!
//! Every factory returns a [`ResizeHandler`]. Handlers are plain values that
//! compose into one: calling the composite calls each part with the same
//! width, in the order they were added. The no-op handler is the identity
//! and disappears on composition.

use crate::toolkit::Toolkit;
use std::fmt;

type HandlerFn = Box<dyn Fn(&mut dyn Toolkit, u32)>;

enum Inner {
    Noop,
    Single(HandlerFn),
    Chain(Vec<HandlerFn>),
}

/// A procedure run with the new content width on every window resize
pub struct ResizeHandler {
    inner: Inner,
}

impl ResizeHandler {
    pub fn new(handler: impl Fn(&mut dyn Toolkit, u32) + 'static) -> Self {
        Self {
            inner: Inner::Single(Box::new(handler)),
        }
    }

    pub fn noop() -> Self {
        Self { inner: Inner::Noop }
    }

    /// Combine handlers; the result runs them in iteration order.
    pub fn compose(handlers: impl IntoIterator<Item = ResizeHandler>) -> Self {
        let mut parts = Vec::new();
        for handler in handlers {
            match handler.inner {
                Inner::Noop => {}
                Inner::Single(f) => parts.push(f),
                Inner::Chain(fs) => parts.extend(fs),
            }
        }
        match parts.len() {
            0 => Self::noop(),
            1 => Self {
                inner: Inner::Single(parts.remove(0)),
            },
            _ => Self {
                inner: Inner::Chain(parts),
            },
        }
    }

    pub fn call(&self, toolkit: &mut dyn Toolkit, width: u32) {
        match &self.inner {
            Inner::Noop => {}
            Inner::Single(f) => f(toolkit, width),
            Inner::Chain(fs) => {
                for f in fs {
                    f(toolkit, width);
                }
            }
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self.inner, Inner::Noop)
    }

    /// Number of non-trivial handlers folded into this one.
    pub fn len(&self) -> usize {
        match &self.inner {
            Inner::Noop => 0,
            Inner::Single(_) => 1,
            Inner::Chain(fs) => fs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResizeHandler {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for ResizeHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeHandler").field("handlers", &self.len()).finish()
    }
}

/// Accumulates handlers and folds them into one with [`ReflowBuilder::finish`]
#[derive(Debug, Default)]
pub struct ReflowBuilder {
    handlers: Vec<ResizeHandler>,
}

impl ReflowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `handler` after everything added so far.
    pub fn push(&mut self, handler: ResizeHandler) {
        if !handler.is_noop() {
            self.handlers.push(handler);
        }
    }

    /// Run `handler` before everything added so far, so the first handler
    /// ever wrapped ends up last.
    pub fn wrap(&mut self, handler: ResizeHandler) {
        if !handler.is_noop() {
            self.handlers.insert(0, handler);
        }
    }

    pub fn finish(self) -> ResizeHandler {
        ResizeHandler::compose(self.handlers)
    }
}
