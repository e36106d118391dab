//! Data-driven element lookups for markup of unknown shape.
//!
//! A [`Locator`] finds candidate elements, a [`Rule`] pairs one locator with a
//! reader that turns the first match into a value, and a [`Chain`] tries rules
//! in order until one yields something.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Where to look for an element.
#[derive(Debug, Clone)]
pub enum Locator {
    /// Plain CSS selector.
    Css(Selector),
    /// Element whose `class` attribute matches `pattern`, optionally limited to `tag`.
    Class {
        tag: Option<Selector>,
        pattern: Regex,
    },
}

impl Locator {
    pub fn css(selector: &str) -> Option<Self> {
        Selector::parse(selector).ok().map(Locator::Css)
    }

    pub fn class(pattern: &str) -> Option<Self> {
        Regex::new(pattern).ok().map(|pattern| Locator::Class { tag: None, pattern })
    }

    pub fn tag_with_class(tag: &str, pattern: &str) -> Option<Self> {
        let tag = Selector::parse(tag).ok()?;
        let pattern = Regex::new(pattern).ok()?;
        Some(Locator::Class {
            tag: Some(tag),
            pattern,
        })
    }

    /// First match in document order.
    pub fn first<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        self.all(doc).into_iter().next()
    }

    /// Every match in document order.
    pub fn all<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        match self {
            Locator::Css(selector) => doc.select(selector).collect(),
            Locator::Class { tag, pattern } => {
                let matches_class = |el: &ElementRef<'a>| {
                    el.value()
                        .attr("class")
                        .is_some_and(|class| pattern.is_match(class))
                };
                match tag {
                    Some(tag) => doc.select(tag).filter(matches_class).collect(),
                    None => doc
                        .root_element()
                        .descendants()
                        .filter_map(ElementRef::wrap)
                        .filter(matches_class)
                        .collect(),
                }
            }
        }
    }
}

/// A locator plus the reader applied to its first match.
pub struct Rule<T> {
    pub name: &'static str,
    pub locator: Locator,
    pub read: fn(ElementRef<'_>) -> Option<T>,
}

impl<T> Rule<T> {
    pub fn apply(&self, doc: &Html) -> Option<T> {
        self.locator.first(doc).and_then(self.read)
    }
}

/// Ordered fallback rules; the first rule producing a value wins.
pub struct Chain<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Chain<T> {
    /// Rules whose locator failed to build are dropped.
    pub fn new(rules: impl IntoIterator<Item = Option<Rule<T>>>) -> Self {
        Self {
            rules: rules.into_iter().flatten().collect(),
        }
    }

    pub fn resolve(&self, doc: &Html) -> Option<T> {
        self.resolve_named(doc).map(|(_, value)| value)
    }

    /// Like [`Chain::resolve`], also reporting which rule matched.
    pub fn resolve_named(&self, doc: &Html) -> Option<(&'static str, T)> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(doc).map(|value| (rule.name, value)))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Builds a rule, or `None` if the locator could not be constructed.
pub fn rule<T>(
    name: &'static str,
    locator: Option<Locator>,
    read: fn(ElementRef<'_>) -> Option<T>,
) -> Option<Rule<T>> {
    locator.map(|locator| Rule {
        name,
        locator,
        read,
    })
}

/// Text content with whitespace runs collapsed and the ends trimmed.
pub fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Non-empty normalized text.
pub fn non_empty_text(element: ElementRef<'_>) -> Option<String> {
    Some(element_text(element)).filter(|text| !text.is_empty())
}

/// Trimmed, non-empty attribute value.
pub fn non_empty_attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
