use std::time::Duration;

use engine_logging::{engine_debug, engine_trace};
use pbp_core::resolve_href;
use tokio::time::Instant;

use crate::navigator::{select_document, Element, Navigator, ViewHandle};
use crate::{NavError, WaitCondition};

/// A page as delivered by a [`PageSource`], after redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPage {
    pub url: String,
    pub html: String,
}

/// Where a [`DomSession`] gets its documents from.
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    async fn load(&self, url: &str) -> Result<LoadedPage, NavError>;
}

#[derive(Debug)]
struct View {
    handle: ViewHandle,
    page: LoadedPage,
}

/// Navigator over static documents.
///
/// Views form an ordered list like browser tabs. Clicking an element
/// follows its link (or the first link inside it); `target="_blank"` links
/// open in a new view without switching to it. Elements without a link
/// target are script-only controls and clicking them does nothing.
pub struct DomSession<S> {
    source: S,
    views: Vec<View>,
    current: Option<usize>,
    next_handle: u64,
    poll_interval: Duration,
}

impl<S: PageSource> DomSession<S> {
    pub fn new(source: S, poll_interval: Duration) -> Self {
        Self {
            source,
            views: Vec::new(),
            current: None,
            next_handle: 1,
            poll_interval,
        }
    }

    fn current_page(&self) -> Result<&LoadedPage, NavError> {
        self.current
            .and_then(|idx| self.views.get(idx))
            .map(|view| &view.page)
            .ok_or(NavError::NoSuchView)
    }

    fn push_view(&mut self, page: LoadedPage) -> usize {
        let handle = ViewHandle(self.next_handle);
        self.next_handle += 1;
        self.views.push(View { handle, page });
        self.views.len() - 1
    }

    async fn reload_current(&mut self) -> Result<(), NavError> {
        let url = self.current_page()?.url.clone();
        let page = self.source.load(&url).await?;
        if let Some(view) = self.current.and_then(|idx| self.views.get_mut(idx)) {
            view.page = page;
        }
        Ok(())
    }

    fn check(&self, condition: &WaitCondition) -> Result<Option<Vec<Element>>, NavError> {
        match condition {
            WaitCondition::Present(selector) => {
                let found = self.find_all(selector)?;
                Ok((!found.is_empty()).then_some(found))
            }
            WaitCondition::ViewCount(count) => Ok((self.views.len() == *count).then(Vec::new)),
        }
    }
}

fn link_target(element: &Element) -> Result<Option<(String, bool)>, NavError> {
    let anchor = if element.attribute("href").is_some() {
        Some(element.clone())
    } else {
        element.select("a[href]")?.into_iter().next()
    };
    Ok(anchor.and_then(|a| {
        let blank = a
            .attribute("target")
            .is_some_and(|t| t.eq_ignore_ascii_case("_blank"));
        a.attribute("href").map(|href| (href.to_string(), blank))
    }))
}

#[async_trait::async_trait]
impl<S: PageSource> Navigator for DomSession<S> {
    async fn open(&mut self, url: &str) -> Result<(), NavError> {
        let page = self.source.load(url).await?;
        engine_trace!("opened {} (final {})", url, page.url);
        match self.current {
            Some(idx) => self.views[idx].page = page,
            None if self.views.is_empty() => {
                let idx = self.push_view(page);
                self.current = Some(idx);
            }
            None => return Err(NavError::NoSuchView),
        }
        Ok(())
    }

    fn current_url(&self) -> Result<String, NavError> {
        Ok(self.current_page()?.url.clone())
    }

    fn find_all(&self, selector: &str) -> Result<Vec<Element>, NavError> {
        select_document(&self.current_page()?.html, selector)
    }

    async fn wait_for(
        &mut self,
        condition: &WaitCondition,
        timeout: Duration,
    ) -> Result<Vec<Element>, NavError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(found) = self.check(condition)? {
                return Ok(found);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(NavError::Timeout {
                    condition: condition.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
            if matches!(condition, WaitCondition::Present(_)) {
                self.reload_current().await?;
            }
        }
    }

    fn list_views(&self) -> Vec<ViewHandle> {
        self.views.iter().map(|view| view.handle).collect()
    }

    fn current_view(&self) -> Result<ViewHandle, NavError> {
        self.current
            .and_then(|idx| self.views.get(idx))
            .map(|view| view.handle)
            .ok_or(NavError::NoSuchView)
    }

    fn switch_view(&mut self, handle: ViewHandle) -> Result<(), NavError> {
        let idx = self
            .views
            .iter()
            .position(|view| view.handle == handle)
            .ok_or(NavError::NoSuchView)?;
        self.current = Some(idx);
        Ok(())
    }

    fn close_current_view(&mut self) -> Result<(), NavError> {
        let idx = self.current.take().ok_or(NavError::NoSuchView)?;
        self.views.remove(idx);
        Ok(())
    }

    async fn click(&mut self, element: &Element) -> Result<(), NavError> {
        let Some((href, new_view)) = link_target(element)? else {
            engine_debug!("click on <{}> has no link target", element.tag());
            return Ok(());
        };
        let base = self.current_url()?;
        let url = resolve_href(&base, &href).ok_or_else(|| NavError::InvalidUrl(href.clone()))?;
        let page = self.source.load(&url).await?;
        if new_view {
            self.push_view(page);
        } else if let Some(idx) = self.current {
            self.views[idx].page = page;
        }
        Ok(())
    }

    async fn quit(&mut self) {
        self.views.clear();
        self.current = None;
    }
}
