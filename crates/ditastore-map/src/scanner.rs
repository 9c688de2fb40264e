//! Reference scanner
//!
//! Finds topic references whose `href` uses the `m2:` scheme, in document
//! order.

use crate::document::{parse, MapDocument};
use crate::error::DocumentError;
use std::ops::Range;

/// Default element names treated as topic references
pub const DEFAULT_ELEMENTS: &[&str] = &["topicref"];

/// DITA class token marking topicref specializations
const TOPICREF_CLASS: &str = " map/topicref ";

const M2_PREFIX: &str = "m2:";

/// Non-owning handle to an `href` attribute of a map document
///
/// Holds the node's position in document order and the byte range of the
/// attribute value in the original text. The document itself is not borrowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRef {
    index: usize,
    element: String,
    href: String,
    value_range: Range<usize>,
    quote: char,
}

impl TopicRef {
    /// Position among the returned references
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Local element name
    #[inline]
    #[must_use]
    pub fn element(&self) -> &str {
        &self.element
    }

    /// Current `href` value, entities decoded
    #[inline]
    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Byte range of the raw value in the source text (quotes excluded)
    #[inline]
    #[must_use]
    pub fn value_range(&self) -> Range<usize> {
        self.value_range.clone()
    }

    /// Quote character delimiting the value
    #[inline]
    #[must_use]
    pub fn quote(&self) -> char {
        self.quote
    }
}

/// Selects `m2:` topic references from a document
#[derive(Debug, Clone)]
pub struct ReferenceScanner {
    elements: Vec<String>,
    match_specializations: bool,
}

impl Default for ReferenceScanner {
    fn default() -> Self {
        Self::new(DEFAULT_ELEMENTS.iter().copied())
    }
}

impl ReferenceScanner {
    /// Scanner for the given element local names (specializations matched)
    #[must_use]
    pub fn new<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elements: elements.into_iter().map(Into::into).collect(),
            match_specializations: true,
        }
    }

    /// Also match elements whose `class` contains ` map/topicref `
    ///
    /// Only `class` attributes written in the document are seen. DTD
    /// defaults are not applied, so a `<chapter>` that gets its class from
    /// the bookmap DTD is not matched; list such elements by name instead.
    #[inline]
    #[must_use]
    pub fn with_specializations(mut self, enabled: bool) -> Self {
        self.match_specializations = enabled;
        self
    }

    /// Element names matched by local name
    #[inline]
    #[must_use]
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Collect `m2:` references in document order
    ///
    /// # Errors
    /// Returns [`DocumentError::Syntax`] if the document text does not parse
    pub fn scan(&self, document: &MapDocument) -> Result<Vec<TopicRef>, DocumentError> {
        let text = document.text();
        let parsed = parse(document.name(), text)?;
        let bytes = text.as_bytes();

        let mut refs = Vec::new();
        for node in parsed.descendants().filter(|n| n.is_element()) {
            if !self.matches(&node) {
                continue;
            }
            let Some(attr) = node.attribute_node("href") else {
                continue;
            };
            if !attr.value().starts_with(M2_PREFIX) {
                continue;
            }

            let value_range = attr.range_value();
            let quote = value_range
                .start
                .checked_sub(1)
                .and_then(|i| bytes.get(i))
                .map_or('"', |&b| char::from(b));

            refs.push(TopicRef {
                index: refs.len(),
                element: node.tag_name().name().to_string(),
                href: attr.value().to_string(),
                value_range,
                quote,
            });
        }

        tracing::debug!(document = document.name(), count = refs.len(), "Scanned m2 references");
        Ok(refs)
    }

    fn matches(&self, node: &roxmltree::Node<'_, '_>) -> bool {
        let name = node.tag_name().name();
        if self.elements.iter().any(|e| e == name) {
            return true;
        }
        self.match_specializations
            && node
                .attribute("class")
                .is_some_and(|class| format!(" {class} ").contains(TOPICREF_CLASS))
    }
}
