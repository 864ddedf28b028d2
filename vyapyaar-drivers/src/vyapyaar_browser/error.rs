use fantoccini::error::{CmdError, ErrorStatus, NewSessionError};
use std::time::Duration;

/// Failures reported by the browser layer.
///
/// Variants carry rendered messages rather than `fantoccini` types so the
/// price extractor (and its test doubles) can construct and inspect them.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The WebDriver endpoint refused or failed to create a session.
    #[error("could not start browser session: {0}")]
    Session(String),

    /// The element reference no longer points into the current document.
    #[error("stale element reference: {0}")]
    StaleElement(String),

    /// Nothing matched `selector` within `timeout`.
    #[error("timed out after {timeout:?} waiting for element `{selector}`")]
    Timeout { selector: String, timeout: Duration },

    /// Re-locating by position found fewer elements than before.
    #[error("element #{index} matching `{selector}` is gone after re-render")]
    ElementGone { selector: String, index: usize },

    /// Any other WebDriver command failure.
    #[error("{0}")]
    Command(String),
}

impl DriverError {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleElement(_))
    }

    /// Attach the selector and bound to a wait that ran out of time.
    pub(crate) fn from_wait(err: CmdError, selector: &str, timeout: Duration) -> Self {
        match err {
            CmdError::WaitTimeout => Self::Timeout {
                selector: selector.to_string(),
                timeout,
            },
            other => other.into(),
        }
    }
}

impl From<CmdError> for DriverError {
    fn from(err: CmdError) -> Self {
        match &err {
            CmdError::Standard(wd) if wd.error == ErrorStatus::StaleElementReference => {
                Self::StaleElement(err.to_string())
            }
            _ => Self::Command(err.to_string()),
        }
    }
}

impl From<NewSessionError> for DriverError {
    fn from(err: NewSessionError) -> Self {
        Self::Session(err.to_string())
    }
}
