//! Cardview - JSON cards compiled into widget trees
//!
//! A card template is a JSON document whose `body` lists elements
//! (`TextBlock`, `ColumnSet`, `Column`, `Image`). Building a card walks the
//! body through a [`FactoryRegistry`], creating widgets on a [`Toolkit`].
//! Property values of the form `${a.b.c}` become sinks that are filled from
//! a separate data document once the tree exists. Every factory also hands
//! back a [`ResizeHandler`]; the composed handler rewraps text when the host
//! width changes.

pub mod binding;
pub mod builder;
pub mod card;
pub mod config;
pub mod error;
pub mod factory;
pub mod fetch;
pub mod logging;
pub mod path;
pub mod provider;
pub mod reflow;
pub mod render;
pub mod scene;
pub mod session;
pub mod toolkit;

pub use binding::{Bindings, BindingErrors, SinkFailure};
pub use builder::{Built, TreeBuilder};
pub use card::{CardDocument, Element, ElementKind};
pub use config::{CardStyle, Settings};
pub use error::{Error, Result};
pub use factory::{BuildContext, Factory, FactoryRegistry};
pub use fetch::{HttpFetcher, ImageFetcher, NoFetch};
pub use path::{resolve, DataDocument, ResolveError};
pub use provider::{CardProvider, CardSource, FileCardProvider, StaticCardProvider};
pub use reflow::{ReflowBuilder, ResizeHandler};
pub use scene::Scene;
pub use session::{CardSession, ShowReport};
pub use toolkit::{Bitmap, Font, FontWeight, Orientation, Toolkit, WidgetId};
