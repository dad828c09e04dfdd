use std::time::Duration;

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;

use crate::dom::{DomSession, LoadedPage, PageSource};
use crate::navigator::SessionFactory;
use crate::NavError;

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
    /// Delay between re-reads of the current page while waiting.
    pub poll_interval: Duration,
    pub user_agent: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
            poll_interval: Duration::from_millis(500),
            user_agent: None,
        }
    }
}

/// Loads pages over HTTP with one client per session.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    settings: HttpSettings,
}

impl HttpSource {
    pub fn new(settings: HttpSettings) -> Result<Self, NavError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit));
        if let Some(agent) = &settings.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder
            .build()
            .map_err(|err| NavError::Network(err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }
}

#[async_trait::async_trait]
impl PageSource for HttpSource {
    async fn load(&self, url: &str) -> Result<LoadedPage, NavError> {
        let parsed =
            reqwest::Url::parse(url).map_err(|err| NavError::InvalidUrl(format!("{url}: {err}")))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|err| map_reqwest_error(err, self.settings.request_timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NavError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(NavError::TooLarge {
                    max_bytes,
                    actual: Some(content_len),
                });
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(NavError::UnsupportedContentType(ct.to_string()));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|err| map_reqwest_error(err, self.settings.request_timeout))?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(NavError::TooLarge {
                    max_bytes,
                    actual: Some(next_len),
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        let html = decode_page(&bytes, content_type.as_deref())?;
        Ok(LoadedPage {
            url: final_url,
            html,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> NavError {
    if err.is_timeout() {
        return NavError::Timeout {
            condition: "http response".to_string(),
            timeout,
        };
    }
    NavError::Network(err.to_string())
}

/// Decode a page body: BOM first, then the Content-Type charset, then a
/// chardetng guess.
pub fn decode_page(bytes: &[u8], content_type: Option<&str>) -> Result<String, NavError> {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| {
            content_type
                .and_then(charset_label)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        });

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(NavError::Decode(encoding.name().to_string()));
    }
    Ok(text.into_owned())
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim_matches(&[' ', '"', '\''][..]).to_string())
    })
}

/// Opens [`DomSession`]s backed by HTTP, one client per session.
#[derive(Debug, Clone, Default)]
pub struct HttpSessionFactory {
    settings: HttpSettings,
}

impl HttpSessionFactory {
    pub fn new(settings: HttpSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl SessionFactory for HttpSessionFactory {
    type Session = DomSession<HttpSource>;

    async fn create(&self) -> Result<Self::Session, NavError> {
        let source = HttpSource::new(self.settings.clone())?;
        Ok(DomSession::new(source, self.settings.poll_interval))
    }
}
