use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Section types whose content the optimizer may rewrite.
/// Every other type, including custom ones, is echoed back untouched.
pub const EDITABLE_SECTION_TYPES: &[&str] = &["summary", "experience", "skills"];

/// A named block of a candidate document.
///
/// `section_type` is an opaque identifier ("experience", "publications", ...).
/// Only the three editable types carry any meaning to the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "type")]
    pub section_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: SectionContent,
    #[serde(default)]
    pub order: i32,
}

impl Section {
    pub fn is_editable(&self) -> bool {
        is_editable_type(&self.section_type)
    }
}

pub fn is_editable_type(section_type: &str) -> bool {
    EDITABLE_SECTION_TYPES.contains(&section_type)
}

/// Polymorphic section body: plain text, an ordered list of arbitrary items,
/// or a key-value object. Map key order is kept as supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionContent {
    Text(String),
    List(Vec<Value>),
    Map(Map<String, Value>),
}

impl Default for SectionContent {
    fn default() -> Self {
        SectionContent::Text(String::new())
    }
}

impl SectionContent {
    /// Canonical flattening shared by every consumer: text is used verbatim,
    /// structured content is serialized as compact JSON.
    pub fn flatten(&self) -> Cow<'_, str> {
        match self {
            SectionContent::Text(text) => Cow::Borrowed(text.as_str()),
            SectionContent::List(items) => {
                Cow::Owned(serde_json::to_string(items).unwrap_or_default())
            }
            SectionContent::Map(map) => Cow::Owned(serde_json::to_string(map).unwrap_or_default()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SectionContent::Text(text) => text.trim().is_empty(),
            SectionContent::List(items) => items.is_empty(),
            SectionContent::Map(map) => map.is_empty(),
        }
    }

    /// Short shape name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            SectionContent::Text(_) => "text",
            SectionContent::List(_) => "list",
            SectionContent::Map(_) => "map",
        }
    }
}

/// Flattens every section into one lowercase string, sections separated by a space.
pub fn flatten_sections(sections: &[Section]) -> String {
    sections
        .iter()
        .map(|s| s.content.flatten())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
