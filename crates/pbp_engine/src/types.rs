use std::fmt;
use std::time::Duration;

use pbp_core::AssemblyError;

/// Failure of a single navigator primitive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    #[error("element not found: {selector}")]
    NotFound { selector: String },
    #[error("invalid selector: {selector}")]
    InvalidSelector { selector: String },
    #[error("timed out after {timeout:?} waiting for {condition}")]
    Timeout { condition: String, timeout: Duration },
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {status} for {url}")]
    HttpStatus { status: u16, url: String },
    #[error("response too large (max {max_bytes}, actual {actual:?})")]
    TooLarge { max_bytes: u64, actual: Option<u64> },
    #[error("unsupported content type {0}")]
    UnsupportedContentType(String),
    #[error("failed to decode page with {0}")]
    Decode(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("no such view")]
    NoSuchView,
    #[error("navigation session closed")]
    SessionClosed,
}

/// What the worker does with its session after a unit failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// The session may be unusable; replace it before the next unit.
    RestartSession,
    /// The failure is specific to the unit; keep the session.
    SkipUnit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Navigation(#[from] NavError),
    #[error("unexpected page shape: {0}")]
    DataShape(String),
    #[error("session unavailable: {0}")]
    Session(String),
}

impl From<AssemblyError> for ExtractError {
    fn from(err: AssemblyError) -> Self {
        ExtractError::DataShape(err.to_string())
    }
}

impl ExtractError {
    pub fn recovery(&self) -> Recovery {
        match self {
            ExtractError::Navigation(nav) => match nav {
                NavError::HttpStatus { status, .. } if *status >= 500 => Recovery::RestartSession,
                NavError::Timeout { .. } | NavError::Network(_) | NavError::SessionClosed => {
                    Recovery::RestartSession
                }
                NavError::HttpStatus { .. }
                | NavError::NotFound { .. }
                | NavError::InvalidSelector { .. }
                | NavError::InvalidUrl(_)
                | NavError::TooLarge { .. }
                | NavError::UnsupportedContentType(_)
                | NavError::Decode(_)
                | NavError::NoSuchView => Recovery::SkipUnit,
            },
            ExtractError::Session(_) => Recovery::RestartSession,
            ExtractError::DataShape(_) => Recovery::SkipUnit,
        }
    }
}

/// Result of processing one unit that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome<R> {
    Extracted(Vec<R>),
    /// The unit lacks the data the stage needs; nothing was extracted.
    Ineligible { reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    /// At least one element matches the selector.
    Present(String),
    /// Exactly this many views are open.
    ViewCount(usize),
}

impl WaitCondition {
    pub fn present(selector: impl Into<String>) -> Self {
        WaitCondition::Present(selector.into())
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitCondition::Present(selector) => write!(f, "presence of {selector}"),
            WaitCondition::ViewCount(count) => write!(f, "{count} open views"),
        }
    }
}
