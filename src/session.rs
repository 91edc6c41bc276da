//! Card session
//!
//! Owns the card currently on screen and its resize handler. Showing a card
//! builds the new tree off-screen and only mounts it once both documents
//! parsed, so a bad card never replaces a good one.

use crate::binding::{BindingErrors, SinkFailure};
use crate::builder::TreeBuilder;
use crate::card::CardDocument;
use crate::error::Result;
use crate::factory::FactoryRegistry;
use crate::fetch::ImageFetcher;
use crate::path::DataDocument;
use crate::provider::CardProvider;
use crate::reflow::ResizeHandler;
use crate::toolkit::Toolkit;
use std::rc::Rc;
use tracing::{info, warn};

/// Content width used until the host reports one
pub const DEFAULT_WIDTH: u32 = 450;

/// Outcome of a successful [`CardSession::show_card`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowReport {
    pub locator: String,
    /// Sinks discovered while building
    pub sinks: usize,
    /// Sinks left unapplied because their path did not resolve
    pub unresolved: Vec<SinkFailure>,
}

impl ShowReport {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

pub struct CardSession<P> {
    provider: P,
    registry: FactoryRegistry,
    fetcher: Rc<dyn ImageFetcher>,
    current_card: Option<String>,
    /// Caller data the current card was shown with
    current_data: String,
    on_resize: ResizeHandler,
    width: u32,
}

impl<P: CardProvider> CardSession<P> {
    pub fn new(provider: P, registry: FactoryRegistry, fetcher: Rc<dyn ImageFetcher>) -> Self {
        Self {
            provider,
            registry,
            fetcher,
            current_card: None,
            current_data: String::new(),
            on_resize: ResizeHandler::noop(),
            width: DEFAULT_WIDTH,
        }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Load, build and mount the card at `locator`.
    ///
    /// `data` is passed to the provider; an empty string or `{}` lets the
    /// provider pick its own data.
    pub fn show_card(
        &mut self,
        locator: &str,
        data: &str,
        toolkit: &mut dyn Toolkit,
    ) -> Result<ShowReport> {
        let source = self.provider.provide(locator, data)?;
        let card = CardDocument::parse(&source.template)?;
        let document = DataDocument::parse(&source.data)?;

        let root = toolkit.create_root();
        let built = TreeBuilder::new(&self.registry, Rc::clone(&self.fetcher))
            .build(&card, toolkit, root);
        let sinks = built.bindings.len();

        let unresolved = match built.bindings.resolve_all(&document, toolkit) {
            Ok(_) => vec![],
            Err(BindingErrors { total, failures }) => {
                warn!("{} of {} bindings unresolved in {:?}", failures.len(), total, locator);
                for failure in &failures {
                    warn!("  {}", failure);
                }
                failures
            }
        };

        toolkit.mount(root);
        self.on_resize = built.on_resize;
        self.current_card = Some(locator.to_string());
        self.current_data = data.to_string();
        self.on_resize(toolkit, self.width);

        info!(
            "Showing card {:?}: {} elements, {} bindings",
            locator,
            card.body().len(),
            sinks
        );
        Ok(ShowReport {
            locator: locator.to_string(),
            sinks,
            unresolved,
        })
    }

    /// Show the current card again from scratch, with the data it was
    /// last shown with.
    pub fn reload(&mut self, toolkit: &mut dyn Toolkit) -> Option<Result<ShowReport>> {
        let locator = self.current_card.clone()?;
        let data = self.current_data.clone();
        Some(self.show_card(&locator, &data, toolkit))
    }

    /// Rewrap for a new content width, then lay out.
    pub fn on_resize(&mut self, toolkit: &mut dyn Toolkit, width: u32) {
        self.width = width;
        self.on_resize.call(toolkit, width);
        toolkit.layout(width);
    }

    pub fn current_card(&self) -> Option<&str> {
        self.current_card.as_deref()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn registry(&self) -> &FactoryRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fetch::NoFetch;
    use crate::path::ResolveError;
    use crate::provider::{CardSource, StaticCardProvider};
    use crate::scene::Scene;
    use std::cell::RefCell;

    fn session<P: CardProvider>(provider: P) -> CardSession<P> {
        CardSession::new(provider, FactoryRegistry::default(), Rc::new(NoFetch))
    }

    #[test]
    fn test_show_card_mounts_resolved_tree() {
        let provider = StaticCardProvider::new(
            r#"{"body":[{"type":"TextBlock","text":"${name}"}]}"#,
            r#"{"name":"Ada"}"#,
        );
        let mut scene = Scene::default();
        let mut session = session(provider).with_width(300);
        let report = session.show_card("/", "{}", &mut scene).unwrap();

        assert_eq!(report.sinks, 1);
        assert!(report.is_complete());
        assert_eq!(session.current_card(), Some("/"));
        let root = scene.root().unwrap();
        assert_eq!(scene.label(scene.children(root)[0]), "Ada");
        assert_eq!(scene.rect(root).unwrap().width, 300);
    }

    #[test]
    fn test_unresolved_sinks_are_reported_not_fatal() {
        let provider = StaticCardProvider::new(
            r#"{"body":[
                {"type":"TextBlock","text":"${missing}"},
                {"type":"TextBlock","text":"${name}"}
            ]}"#,
            r#"{"name":"Ada"}"#,
        );
        let mut scene = Scene::default();
        let mut session = session(provider);
        let report = session.show_card("/", "", &mut scene).unwrap();

        assert_eq!(report.sinks, 2);
        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.unresolved[0].path, "missing");
        assert!(matches!(
            report.unresolved[0].error,
            ResolveError::PathNotFound { .. }
        ));
        let children = scene.children(scene.root().unwrap()).to_vec();
        assert_eq!(scene.label(children[0]), "");
        assert_eq!(scene.label(children[1]), "Ada");
    }

    #[test]
    fn test_parse_failure_keeps_previous_card() {
        let template = RefCell::new(r#"{"body":[{"type":"TextBlock","text":"first"}]}"#.to_string());
        let provider = |_: &str, _: &str| -> Result<CardSource> {
            Ok(CardSource::new(template.borrow().clone(), "{}"))
        };
        let mut scene = Scene::default();
        let mut session = session(&provider);
        session.show_card("/first", "", &mut scene).unwrap();
        let root = scene.root().unwrap();

        *template.borrow_mut() = "{ not json".to_string();
        let err = session.show_card("/second", "", &mut scene).unwrap_err();
        assert!(err.is_parse());
        assert_eq!(session.current_card(), Some("/first"));
        assert_eq!(scene.root(), Some(root));
        assert_eq!(scene.label(scene.children(root)[0]), "first");
    }

    #[test]
    fn test_provider_error_propagates() {
        let provider =
            |_: &str, _: &str| -> Result<CardSource> { Err(Error::provider("offline")) };
        let mut scene = Scene::default();
        let mut session = session(provider);
        let err = session.show_card("/", "", &mut scene).unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
        assert_eq!(session.current_card(), None);
        assert_eq!(scene.root(), None);
    }

    #[test]
    fn test_show_twice_rebuilds_from_scratch() {
        let provider = StaticCardProvider::new(
            r#"{"body":[{"type":"TextBlock","text":"only"}]}"#,
            "{}",
        );
        let mut scene = Scene::default();
        let mut session = session(provider);
        session.show_card("/", "", &mut scene).unwrap();
        let first_root = scene.root().unwrap();
        session.reload(&mut scene).unwrap().unwrap();

        let root = scene.root().unwrap();
        assert_ne!(root, first_root);
        assert_eq!(scene.children(root).len(), 1);
        assert_eq!(scene.widget_count(), 2);
    }

    #[test]
    fn test_reload_keeps_caller_data() {
        let provider = StaticCardProvider::new(
            r#"{"body":[{"type":"TextBlock","text":"${name}"}]}"#,
            r#"{"name":"Default"}"#,
        );
        let mut scene = Scene::default();
        let mut session = session(provider);
        session
            .show_card("/", r#"{"name":"Caller"}"#, &mut scene)
            .unwrap();
        session.reload(&mut scene).unwrap().unwrap();
        let label = scene.children(scene.root().unwrap())[0];
        assert_eq!(scene.label(label), "Caller");

        session.show_card("/", "", &mut scene).unwrap();
        session.reload(&mut scene).unwrap().unwrap();
        let label = scene.children(scene.root().unwrap())[0];
        assert_eq!(scene.label(label), "Default");
    }

    #[test]
    fn test_resize_before_any_card_is_harmless() {
        let mut scene = Scene::default();
        let mut session = session(StaticCardProvider::new("{}", "{}"));
        assert!(session.reload(&mut scene).is_none());
        session.on_resize(&mut scene, 120);
        assert_eq!(session.width(), 120);
    }

    #[test]
    fn test_resize_rewraps_mounted_text() {
        let provider = StaticCardProvider::new(
            r#"{"body":[{"type":"TextBlock","text":"several short words"}]}"#,
            "{}",
        );
        let mut scene = Scene::default();
        let mut session = session(provider).with_width(1000);
        session.show_card("/", "", &mut scene).unwrap();
        let label = scene.children(scene.root().unwrap())[0];
        assert_eq!(scene.label(label), "several short words");

        session.on_resize(&mut scene, 60);
        assert!(scene.label(label).contains('\n'));
        session.on_resize(&mut scene, 1000);
        assert_eq!(scene.label(label), "several short words");
    }
}
