//! Locating candidate nodes in a parsed page
//!
//! Plain CSS covers most locators. The catalog also lays values out as a
//! label cell followed by a value cell, which [`Locator::Labelled`] expresses
//! without the non-standard `:containsOwn` family of pseudo-classes.

use std::fmt;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A parsed CSS selector that remembers the text it was parsed from.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Css {
    source: String,
    selector: Selector,
}

impl Css {
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let selector = Selector::parse(source).map_err(|e| ConfigError::Selector {
            selector: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            selector,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn matches(&self, element: &ElementRef) -> bool {
        self.selector.matches(element)
    }
}

impl TryFrom<String> for Css {
    type Error = ConfigError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Self::parse(&source)
    }
}

impl From<Css> for String {
    fn from(css: Css) -> Self {
        css.source
    }
}

impl fmt::Debug for Css {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Css").field(&self.source).finish()
    }
}

impl PartialEq for Css {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Condition on an element's text. The `contains` forms ignore case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMatch {
    /// Own text equals the string exactly.
    Is(String),
    /// Own text contains the string.
    OwnContains(String),
    /// Full text, descendants included, contains the string.
    Contains(String),
}

impl TextMatch {
    pub fn accepts(&self, element: &ElementRef) -> bool {
        match self {
            Self::Is(s) => own_text(element) == *s,
            Self::OwnContains(s) => contains_ignore_case(&own_text(element), s),
            Self::Contains(s) => contains_ignore_case(&element_text(element), s),
        }
    }
}

fn contains_ignore_case(text: &str, needle: &str) -> bool {
    text.to_lowercase().contains(&needle.to_lowercase())
}

/// A deterministic query yielding candidate elements in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// Every element matching `selector`.
    Css { selector: Css },
    /// Elements matching `selector` whose text satisfies `text`.
    Text { selector: Css, text: TextMatch },
    /// For every `label` element whose text satisfies `text`, its next element
    /// sibling if it matches `sibling`, then that sibling's children matching
    /// `value`. Only direct children count, as in `label + sibling > value`.
    Labelled {
        label: Css,
        text: TextMatch,
        sibling: Css,
        value: Css,
    },
}

impl Locator {
    pub fn css(selector: &str) -> Result<Self, ConfigError> {
        Ok(Self::Css {
            selector: Css::parse(selector)?,
        })
    }

    pub fn text(selector: &str, text: TextMatch) -> Result<Self, ConfigError> {
        Ok(Self::Text {
            selector: Css::parse(selector)?,
            text,
        })
    }

    pub fn labelled(
        label: &str,
        text: TextMatch,
        sibling: &str,
        value: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self::Labelled {
            label: Css::parse(label)?,
            text,
            sibling: Css::parse(sibling)?,
            value: Css::parse(value)?,
        })
    }

    /// Apply to a document.
    pub fn locate<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        match self {
            Self::Css { selector } => document.select(selector.selector()).collect(),
            Self::Text { selector, text } => document
                .select(selector.selector())
                .filter(|el| text.accepts(el))
                .collect(),
            Self::Labelled {
                label,
                text,
                sibling,
                value,
            } => document
                .select(label.selector())
                .filter(|el| text.accepts(el))
                .filter_map(|el| next_element_sibling(&el))
                .filter(|sib| sibling.matches(sib))
                .flat_map(|sib| {
                    sib.select(value.selector())
                        .filter(|el| el.parent().is_some_and(|parent| parent.id() == sib.id()))
                        .collect::<Vec<_>>()
                })
                .collect(),
        }
    }
}

fn next_element_sibling<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// Visible text of an element and its descendants, whitespace-normalized.
pub fn element_text(element: &ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Text of an element's direct text children only, whitespace-normalized.
pub fn own_text(element: &ElementRef) -> String {
    let own: String = element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect();
    normalize_whitespace(&own)
}

/// Collapse whitespace runs to single spaces and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
