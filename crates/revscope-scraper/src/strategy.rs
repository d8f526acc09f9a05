//! Prioritized selector strategies.
//!
//! Storefront markup drifts, so every lookup is expressed as an ordered list
//! of CSS selectors. The first selector that matches wins; when none match
//! the caller gets an explicit [`SelectorMatch::NoneMatched`].

use scraper::{ElementRef, Html, Selector};

/// Result of trying a prioritized selector list against a document.
#[derive(Debug)]
pub enum SelectorMatch<'a> {
    Matched {
        selector: &'static str,
        elements: Vec<ElementRef<'a>>,
    },
    NoneMatched,
}

impl<'a> SelectorMatch<'a> {
    #[must_use]
    pub fn elements(&self) -> &[ElementRef<'a>] {
        match self {
            SelectorMatch::Matched { elements, .. } => elements,
            SelectorMatch::NoneMatched => &[],
        }
    }

    #[must_use]
    pub fn selector(&self) -> Option<&'static str> {
        match self {
            SelectorMatch::Matched { selector, .. } => Some(selector),
            SelectorMatch::NoneMatched => None,
        }
    }
}

fn parse(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::debug!(selector, error = %err, "skipping unparseable selector");
            None
        }
    }
}

/// Returns every element matched by the first selector that matches anything.
#[must_use]
pub fn first_match<'a>(doc: &'a Html, selectors: &[&'static str]) -> SelectorMatch<'a> {
    for &selector in selectors {
        let Some(parsed) = parse(selector) else {
            continue;
        };
        let elements: Vec<ElementRef<'a>> = doc.select(&parsed).collect();
        if !elements.is_empty() {
            return SelectorMatch::Matched { selector, elements };
        }
    }
    SelectorMatch::NoneMatched
}

/// Returns the first selector in `selectors` present anywhere in `doc`.
#[must_use]
pub fn first_present(doc: &Html, selectors: &[&'static str]) -> Option<&'static str> {
    selectors
        .iter()
        .copied()
        .find(|selector| parse(selector).is_some_and(|parsed| doc.select(&parsed).next().is_some()))
}

/// `true` when `selector` matches at least one element of `doc`.
#[must_use]
pub fn is_present(doc: &Html, selector: &str) -> bool {
    parse(selector).is_some_and(|parsed| doc.select(&parsed).next().is_some())
}

/// First descendant of `element` matching `selector`.
#[must_use]
pub fn select_first<'a>(element: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let parsed = parse(selector)?;
    element.select(&parsed).next()
}

/// Every descendant of `element` matching `selector`.
#[must_use]
pub fn select_all<'a>(element: ElementRef<'a>, selector: &str) -> Vec<ElementRef<'a>> {
    parse(selector).map_or_else(Vec::new, |parsed| element.select(&parsed).collect())
}

/// First descendant matched by any selector in priority order.
#[must_use]
pub fn select_first_of<'a>(element: ElementRef<'a>, selectors: &[&str]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .find_map(|selector| select_first(element, selector))
}

/// Visible text of `element` with runs of whitespace collapsed to one space.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
