//! Dotted-path lookup into data documents

use crate::error::{Error, Result};
use serde_json::Value;
use thiserror::Error;

/// Why a binding path could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("'{path}': no member '{segment}'")]
    PathNotFound { path: String, segment: String },

    #[error("'{path}': cannot look up '{segment}' in a non-object value")]
    TypeMismatch { path: String, segment: String },

    #[error("'{path}': value is not a string")]
    NotAString { path: String },
}

/// Walk `path` (split on `.`) from the root of `data`.
///
/// Every step must land in an object holding the next segment, and the
/// final value must be a string.
pub fn resolve<'a>(data: &'a Value, path: &str) -> std::result::Result<&'a str, ResolveError> {
    let mut current = data;
    for segment in path.split('.') {
        let object = current.as_object().ok_or_else(|| ResolveError::TypeMismatch {
            path: path.to_string(),
            segment: segment.to_string(),
        })?;
        current = object.get(segment).ok_or_else(|| ResolveError::PathNotFound {
            path: path.to_string(),
            segment: segment.to_string(),
        })?;
    }
    current.as_str().ok_or_else(|| ResolveError::NotAString {
        path: path.to_string(),
    })
}

/// Parsed data payload that bindings resolve against
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataDocument {
    root: Value,
}

impl DataDocument {
    pub fn parse(src: &str) -> Result<Self> {
        let root = serde_json::from_str(src).map_err(|e| Error::parse("data", e))?;
        Ok(Self { root })
    }

    pub fn resolve(&self, path: &str) -> std::result::Result<&str, ResolveError> {
        resolve(&self.root, path)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }
}

impl From<Value> for DataDocument {
    fn from(root: Value) -> Self {
        Self { root }
    }
}
