// src/driver/mod.rs
//
// The remote-interface contract the pipelines are written against. The
// production implementation drives a WebDriver endpoint (`webdriver`); tests
// run against an in-memory fake (`fake`).

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod webdriver;

#[cfg(test)]
pub mod fake;

pub use webdriver::{DriverConfig, WebDriverSession};

/// Failure taxonomy for the remote interface. `kind()` is what retry policies
/// predicate on.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("timed out after {timeout:?} waiting for `{selector}`")]
    Timeout { selector: String, timeout: Duration },

    #[error("element not interactable: {0}")]
    NotInteractable(String),

    #[error("session failure: {0}")]
    Session(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    NotInteractable,
    Session,
}

impl DriverError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriverError::Timeout { .. } => ErrorKind::Timeout,
            DriverError::NotInteractable(_) => ErrorKind::NotInteractable,
            DriverError::Session(_) => ErrorKind::Session,
        }
    }
}

/// One stateful browser session. Navigation mutates shared remote state, so a
/// session must only ever be driven sequentially.
#[async_trait]
pub trait Session: Send + Sync {
    type Elem: Element + Send;

    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// Bounded wait for a single element matching `selector`.
    async fn find_one(&self, selector: &str, timeout: Duration)
        -> Result<Self::Elem, DriverError>;

    /// Bounded wait for at least one element matching `selector`; returns all
    /// matches once any appear.
    async fn find_all(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<Self::Elem>, DriverError>;
}

#[async_trait]
pub trait Element: Send {
    async fn text(&mut self) -> Result<String, DriverError>;
    async fn click(&mut self) -> Result<(), DriverError>;
    async fn send_keys(&mut self, text: &str) -> Result<(), DriverError>;
}
