use std::time::Duration;

use scraper::{ElementRef, Html, Selector};

use crate::{NavError, WaitCondition};

/// Opaque handle of one open view (tab) of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewHandle(pub u64);

/// Snapshot of one element taken when it was located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    inner_html: String,
    outer_html: String,
}

impl Element {
    pub(crate) fn snapshot(element: ElementRef<'_>) -> Self {
        let value = element.value();
        Self {
            tag: value.name().to_ascii_lowercase(),
            attributes: value
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            text: collapse_whitespace(element.text()),
            inner_html: element.inner_html(),
            outer_html: element.html(),
        }
    }

    /// Build an element from a markup fragment; the first top-level element
    /// wins.
    pub fn from_html(fragment: &str) -> Option<Self> {
        let parsed = Html::parse_fragment(fragment);
        first_element(&parsed).map(Element::snapshot)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    pub fn outer_html(&self) -> &str {
        &self.outer_html
    }

    /// Descendants of this element matching `selector`, in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<Element>, NavError> {
        let selector = parse_selector(selector)?;
        let parsed = Html::parse_fragment(&self.outer_html);
        Ok(first_element(&parsed)
            .map(|root| root.select(&selector).map(Element::snapshot).collect())
            .unwrap_or_default())
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, NavError> {
    Selector::parse(selector).map_err(|_| NavError::InvalidSelector {
        selector: selector.to_string(),
    })
}

pub(crate) fn select_document(html: &str, selector: &str) -> Result<Vec<Element>, NavError> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    Ok(document.select(&selector).map(Element::snapshot).collect())
}

fn first_element(fragment: &Html) -> Option<ElementRef<'_>> {
    fragment
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .next()
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for word in parts.flat_map(str::split_whitespace) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Page and view control primitives of one navigation session.
///
/// Elements are snapshots: reading them never touches the page again, and
/// they stay readable after the session navigates elsewhere.
#[async_trait::async_trait]
pub trait Navigator: Send {
    /// Load `url` into the current view, opening a first view if none exist.
    async fn open(&mut self, url: &str) -> Result<(), NavError>;

    fn current_url(&self) -> Result<String, NavError>;

    fn find_one(&self, selector: &str) -> Result<Element, NavError> {
        self.find_all(selector)?
            .into_iter()
            .next()
            .ok_or_else(|| NavError::NotFound {
                selector: selector.to_string(),
            })
    }

    fn find_all(&self, selector: &str) -> Result<Vec<Element>, NavError>;

    fn find_in(&self, scope: &Element, selector: &str) -> Result<Element, NavError> {
        self.find_all_in(scope, selector)?
            .into_iter()
            .next()
            .ok_or_else(|| NavError::NotFound {
                selector: selector.to_string(),
            })
    }

    fn find_all_in(&self, scope: &Element, selector: &str) -> Result<Vec<Element>, NavError> {
        scope.select(selector)
    }

    /// Poll until `condition` holds. Returns the matched elements for
    /// presence conditions and nothing for view counts.
    async fn wait_for(
        &mut self,
        condition: &WaitCondition,
        timeout: Duration,
    ) -> Result<Vec<Element>, NavError>;

    fn list_views(&self) -> Vec<ViewHandle>;

    fn current_view(&self) -> Result<ViewHandle, NavError>;

    fn switch_view(&mut self, handle: ViewHandle) -> Result<(), NavError>;

    /// Close the current view. Another view must be switched to before the
    /// session is used again.
    fn close_current_view(&mut self) -> Result<(), NavError>;

    async fn click(&mut self, element: &Element) -> Result<(), NavError>;

    fn read_text(&self, element: &Element) -> String {
        element.text().to_string()
    }

    fn read_attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.attribute(name).map(str::to_string)
    }

    fn read_markup(&self, element: &Element) -> String {
        element.inner_html().to_string()
    }

    /// Release every view. The session is not used afterwards.
    async fn quit(&mut self);
}

/// Creates fresh navigation sessions for workers.
#[async_trait::async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: Navigator + 'static;

    async fn create(&self) -> Result<Self::Session, NavError>;
}
