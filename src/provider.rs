//! Card providers
//!
//! A provider turns a locator plus caller data into the two JSON documents
//! a card needs: the template and its data.

use crate::config::CardsSettings;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Template and data text for one card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSource {
    pub template: String,
    pub data: String,
}

impl CardSource {
    pub fn new(template: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            data: data.into(),
        }
    }
}

pub trait CardProvider {
    fn provide(&self, locator: &str, data: &str) -> Result<CardSource>;
}

impl<F> CardProvider for F
where
    F: Fn(&str, &str) -> Result<CardSource>,
{
    fn provide(&self, locator: &str, data: &str) -> Result<CardSource> {
        self(locator, data)
    }
}

/// Caller data counts as given unless it is blank or an empty object.
fn has_data(data: &str) -> bool {
    let trimmed = data.trim();
    !trimmed.is_empty() && trimmed != "{}"
}

/// Reads cards from a directory.
///
/// The locator may name a `.json` template inside the directory; any other
/// locator (such as `/`) selects the default template.
#[derive(Debug, Clone)]
pub struct FileCardProvider {
    dir: PathBuf,
    template: String,
    data: String,
}

impl FileCardProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let defaults = CardsSettings::default();
        Self {
            dir: dir.into(),
            template: defaults.template,
            data: defaults.data,
        }
    }

    pub fn with_files(mut self, template: impl Into<String>, data: impl Into<String>) -> Self {
        self.template = template.into();
        self.data = data.into();
        self
    }

    pub fn from_settings(settings: &CardsSettings) -> Self {
        Self::new(settings.dir.clone()).with_files(settings.template.clone(), settings.data.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn template_path(&self, locator: &str) -> Result<PathBuf> {
        let name = locator.trim_start_matches('/');
        if name.is_empty() || !name.ends_with(".json") {
            return Ok(self.dir.join(&self.template));
        }
        // No path traversal
        if name.contains("..") {
            return Err(Error::provider(format!(
                "locator {:?} leaves the card directory",
                locator
            )));
        }
        Ok(self.dir.join(name))
    }

    fn read(&self, path: &Path) -> Result<String> {
        if !path.is_file() {
            return Err(Error::CardNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(std::fs::read_to_string(path)?)
    }
}

impl CardProvider for FileCardProvider {
    fn provide(&self, locator: &str, data: &str) -> Result<CardSource> {
        let template_path = self.template_path(locator)?;
        debug!("Loading template {:?} for {:?}", template_path, locator);
        let template = self.read(&template_path)?;

        let data = if has_data(data) {
            data.to_string()
        } else {
            self.read(&self.dir.join(&self.data))?
        };
        Ok(CardSource { template, data })
    }
}

/// Serves the same documents for every locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCardProvider {
    source: CardSource,
}

impl StaticCardProvider {
    pub fn new(template: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            source: CardSource::new(template, data),
        }
    }
}

impl CardProvider for StaticCardProvider {
    fn provide(&self, _locator: &str, data: &str) -> Result<CardSource> {
        let mut source = self.source.clone();
        if has_data(data) {
            source.data = data.to_string();
        }
        Ok(source)
    }
}
