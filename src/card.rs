//! Card document model
//!
//! A typed view over a parsed card: an ordered `body` of elements, each with a
//! `type` tag and the raw JSON properties that go with it. Nested containers
//! (`ColumnSet.columns`, `Column.items`) are read lazily by the factories.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ELEMENT KINDS
// ============================================================================

/// Element types the default factory registry understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    TextBlock,
    ColumnSet,
    Column,
    Image,
}

impl ElementKind {
    pub const ALL: [ElementKind; 4] = [
        ElementKind::TextBlock,
        ElementKind::ColumnSet,
        ElementKind::Column,
        ElementKind::Image,
    ];

    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "TextBlock" => Some(ElementKind::TextBlock),
            "ColumnSet" => Some(ElementKind::ColumnSet),
            "Column" => Some(ElementKind::Column),
            "Image" => Some(ElementKind::Image),
            _ => None,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            ElementKind::TextBlock => "TextBlock",
            ElementKind::ColumnSet => "ColumnSet",
            ElementKind::Column => "Column",
            ElementKind::Image => "Image",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

// ============================================================================
// ELEMENTS
// ============================================================================

/// One entry of a card body or of a container's child list
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    type_name: String,
    props: Map<String, Value>,
}

impl Element {
    pub fn new(type_name: impl Into<String>, props: Map<String, Value>) -> Self {
        Self {
            type_name: type_name.into(),
            props,
        }
    }

    /// Read an element from JSON. Entries that are not objects or have no
    /// string `type` yield `None` and are treated like unknown types.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let type_name = object.get("type")?.as_str()?;
        let props = object
            .iter()
            .filter(|(key, _)| key.as_str() != "type")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Some(Self::new(type_name, props))
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> Option<ElementKind> {
        ElementKind::from_type_name(&self.type_name)
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// A string property. Non-string values are ignored.
    pub fn str_prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    pub fn props(&self) -> &Map<String, Value> {
        &self.props
    }

    /// The elements listed under `key` (e.g. `columns` or `items`).
    /// Missing or non-array values give an empty list.
    pub fn children(&self, key: &str) -> Vec<Element> {
        match self.props.get(key) {
            Some(Value::Array(entries)) => entries.iter().filter_map(Element::from_value).collect(),
            _ => vec![],
        }
    }
}

// ============================================================================
// DOCUMENTS
// ============================================================================

/// Root of a card template
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardDocument {
    body: Vec<Element>,
    skipped: usize,
}

impl CardDocument {
    pub fn parse(src: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(src).map_err(|e| Error::parse("template", e))?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Self {
        let entries = value
            .get("body")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let body: Vec<Element> = entries.iter().filter_map(Element::from_value).collect();
        Self {
            skipped: entries.len() - body.len(),
            body,
        }
    }

    pub fn body(&self) -> &[Element] {
        &self.body
    }

    /// Body entries dropped because they had no usable `type`.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl FromStr for CardDocument {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
