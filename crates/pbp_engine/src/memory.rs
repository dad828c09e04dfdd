use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::dom::{DomSession, LoadedPage, PageSource};
use crate::navigator::SessionFactory;
use crate::NavError;

/// A fixed set of saved pages keyed by url, for offline replays.
///
/// Unknown urls answer like a 404. A url with a fragment falls back to the
/// page stored under the url without it.
#[derive(Debug, Clone, Default)]
pub struct MemorySite {
    pages: Arc<HashMap<String, String>>,
}

impl MemorySite {
    pub fn new<K, V>(pages: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pages: Arc::new(
                pages
                    .into_iter()
                    .map(|(url, html)| (url.into(), html.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait::async_trait]
impl PageSource for MemorySite {
    async fn load(&self, url: &str) -> Result<LoadedPage, NavError> {
        let without_fragment = url.split_once('#').map_or(url, |(head, _)| head);
        self.pages
            .get(url)
            .or_else(|| self.pages.get(without_fragment))
            .map(|html| LoadedPage {
                url: url.to_string(),
                html: html.clone(),
            })
            .ok_or_else(|| NavError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl SessionFactory for MemorySite {
    type Session = DomSession<MemorySite>;

    async fn create(&self) -> Result<Self::Session, NavError> {
        Ok(DomSession::new(self.clone(), Duration::from_millis(10)))
    }
}
