//! Deferred data bindings
//!
//! While a card is built, every property value goes through
//! [`Bindings::bind`]. Literals are applied on the spot; `${path}` values are
//! parked as sinks and applied later by [`Bindings::resolve_all`] once the
//! data document is known.

use crate::path::{DataDocument, ResolveError};
use crate::toolkit::Toolkit;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, trace};

/// Applies one resolved value to one widget property
pub type Setter = Box<dyn FnOnce(&mut dyn Toolkit, &str)>;

/// A whole-string `${a.b.c}` expression
static BINDING_EXPR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$\{([^.{}\s]+(?:\.[^.{}\s]+)*)\}$").expect("Binding regex pattern is valid")
});

/// The path inside a whole-string `${path}` value, if `raw` is one.
pub fn binding_path(raw: &str) -> Option<&str> {
    BINDING_EXPR
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Path(String),
    /// Known already, but has to wait for the sinks registered before it.
    Literal(String),
}

/// A binding waiting for data
pub struct Sink {
    source: Source,
    setter: Setter,
}

impl Sink {
    /// The data path, or `None` for a deferred literal.
    pub fn path(&self) -> Option<&str> {
        match &self.source {
            Source::Path(path) => Some(path.as_str()),
            Source::Literal(_) => None,
        }
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").field("source", &self.source).finish()
    }
}

/// One sink that could not be applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("binding #{index} (${{{path}}}) {error}")]
pub struct SinkFailure {
    pub index: usize,
    pub path: String,
    #[source]
    pub error: ResolveError,
}

/// Every sink that failed during one [`Bindings::resolve_all`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} of {total} bindings failed to resolve", .failures.len())]
pub struct BindingErrors {
    pub total: usize,
    pub failures: Vec<SinkFailure>,
}

impl BindingErrors {
    pub fn first(&self) -> Option<&SinkFailure> {
        self.failures.first()
    }
}

/// Ordered sink list collected while building one card
#[derive(Debug, Default)]
pub struct Bindings {
    sinks: Vec<Sink>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: impl Into<String>, setter: Setter) {
        let path = path.into();
        trace!("registered sink #{} for ${{{}}}", self.sinks.len(), path);
        self.sinks.push(Sink {
            source: Source::Path(path),
            setter,
        });
    }

    /// Like [`Bindings::bind`], except a literal is also held back and
    /// applied in registration order by [`Bindings::resolve_all`]. Use it
    /// when the setter depends on an earlier deferred value.
    pub fn defer(&mut self, raw: &str, setter: Setter) {
        match binding_path(raw) {
            Some(path) => self.register(path, setter),
            None => {
                trace!("deferred literal sink #{} {:?}", self.sinks.len(), raw);
                self.sinks.push(Sink {
                    source: Source::Literal(raw.to_string()),
                    setter,
                });
            }
        }
    }

    /// Apply `raw` now if it is a literal, otherwise defer it as a sink.
    pub fn bind(&mut self, toolkit: &mut dyn Toolkit, raw: &str, setter: Setter) {
        match binding_path(raw) {
            Some(path) => self.register(path, setter),
            None => setter(toolkit, raw),
        }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Data paths of the pending sinks, skipping deferred literals.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.sinks.iter().filter_map(Sink::path)
    }

    /// Resolve every sink in registration order.
    ///
    /// A failing sink leaves its widget untouched and does not stop the
    /// remaining sinks. Returns the number applied, or every failure.
    pub fn resolve_all(
        self,
        data: &DataDocument,
        toolkit: &mut dyn Toolkit,
    ) -> Result<usize, BindingErrors> {
        let total = self.sinks.len();
        let mut failures = Vec::new();
        for (index, sink) in self.sinks.into_iter().enumerate() {
            let path = match sink.source {
                Source::Literal(value) => {
                    (sink.setter)(toolkit, &value);
                    continue;
                }
                Source::Path(path) => path,
            };
            match data.resolve(&path) {
                Ok(value) => {
                    debug!("${{{}}} -> {:?}", path, value);
                    (sink.setter)(toolkit, value);
                }
                Err(error) => failures.push(SinkFailure { index, path, error }),
            }
        }
        if failures.is_empty() {
            Ok(total)
        } else {
            Err(BindingErrors { total, failures })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Seen = Rc<RefCell<Vec<String>>>;

    fn capture(seen: &Seen) -> Setter {
        let seen = Rc::clone(seen);
        Box::new(move |_, value| seen.borrow_mut().push(value.to_string()))
    }

    #[test]
    fn test_binding_path_matches_whole_string_only() {
        assert_eq!(binding_path("${name}"), Some("name"));
        assert_eq!(binding_path("${a.b.c}"), Some("a.b.c"));
        assert_eq!(binding_path("Hello ${name}"), None);
        assert_eq!(binding_path("${name} again"), None);
        assert_eq!(binding_path("${}"), None);
        assert_eq!(binding_path("${a..b}"), None);
        assert_eq!(binding_path("$name"), None);
        assert_eq!(binding_path("plain"), None);
    }

    #[test]
    fn test_literal_is_applied_immediately() {
        let seen = Seen::default();
        let mut scene = Scene::default();
        let mut bindings = Bindings::new();
        for literal in ["Hello", "", "${not closed", "a.b"] {
            bindings.bind(&mut scene, literal, capture(&seen));
        }
        assert!(bindings.is_empty());
        assert_eq!(*seen.borrow(), ["Hello", "", "${not closed", "a.b"]);
    }

    #[test]
    fn test_expression_registers_one_sink_without_calling() {
        let seen = Seen::default();
        let mut scene = Scene::default();
        let mut bindings = Bindings::new();
        bindings.bind(&mut scene, "${user.name}", capture(&seen));
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.paths().collect::<Vec<_>>(), ["user.name"]);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_resolve_all_in_registration_order() {
        let seen = Seen::default();
        let mut scene = Scene::default();
        let mut bindings = Bindings::new();
        bindings.bind(&mut scene, "${b}", capture(&seen));
        bindings.bind(&mut scene, "${a.x}", capture(&seen));
        let data = DataDocument::parse(r#"{"a":{"x":"second"},"b":"first"}"#).unwrap();
        assert_eq!(bindings.resolve_all(&data, &mut scene), Ok(2));
        assert_eq!(*seen.borrow(), ["first", "second"]);
    }

    #[test]
    fn test_failing_sink_does_not_block_others() {
        let seen = Seen::default();
        let mut scene = Scene::default();
        let mut bindings = Bindings::new();
        bindings.bind(&mut scene, "${missing}", capture(&seen));
        bindings.bind(&mut scene, "${ok}", capture(&seen));
        bindings.bind(&mut scene, "${ok.deeper}", capture(&seen));
        let data = DataDocument::parse(r#"{"ok":"yes"}"#).unwrap();

        let errors = bindings.resolve_all(&data, &mut scene).unwrap_err();
        assert_eq!(*seen.borrow(), ["yes"]);
        assert_eq!(errors.total, 3);
        assert_eq!(errors.failures.len(), 2);
        let first = errors.first().unwrap();
        assert_eq!((first.index, first.path.as_str()), (0, "missing"));
        assert!(matches!(first.error, ResolveError::PathNotFound { .. }));
        assert!(matches!(
            errors.failures[1].error,
            ResolveError::TypeMismatch { .. }
        ));
        assert_eq!(errors.to_string(), "2 of 3 bindings failed to resolve");
    }

    #[test]
    fn test_deferred_literal_waits_for_earlier_sinks() {
        let seen = Seen::default();
        let mut scene = Scene::default();
        let mut bindings = Bindings::new();
        bindings.bind(&mut scene, "${size}", capture(&seen));
        bindings.defer("lit.png", capture(&seen));
        bindings.defer("${url}", capture(&seen));
        assert!(seen.borrow().is_empty());
        assert_eq!(bindings.len(), 3);
        assert_eq!(bindings.paths().collect::<Vec<_>>(), ["size", "url"]);

        let data = DataDocument::parse(r#"{"size":"Small"}"#).unwrap();
        let errors = bindings.resolve_all(&data, &mut scene).unwrap_err();
        assert_eq!(*seen.borrow(), ["Small", "lit.png"]);
        assert_eq!(errors.failures.len(), 1);
        assert_eq!(errors.failures[0].index, 2);
    }

    #[test]
    fn test_sink_failure_display_names_path() {
        let failure = SinkFailure {
            index: 4,
            path: "a.b".into(),
            error: ResolveError::NotAString { path: "a.b".into() },
        };
        assert_eq!(
            failure.to_string(),
            "binding #4 (${a.b}) 'a.b': value is not a string"
        );
    }
}
