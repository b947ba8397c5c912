// src/driver/fake.rs
//
// In-memory stand-in for a browser session. Pages are keyed by URL; each page
// maps selectors to a single text value or to a list of row texts. Waits
// resolve immediately so tests stay fast.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{DriverError, Element, Session};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Navigated(String),
    Clicked(String),
    Typed { selector: String, keys: String },
}

#[derive(Debug, Default, Clone)]
pub struct FakePage {
    texts: HashMap<&'static str, String>,
    lists: HashMap<&'static str, Vec<String>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, selector: &'static str, value: &str) -> Self {
        self.texts.insert(selector, value.to_string());
        self
    }

    pub fn list(mut self, selector: &'static str, values: &[&str]) -> Self {
        self.lists
            .insert(selector, values.iter().map(|v| v.to_string()).collect());
        self
    }
}

#[derive(Default)]
struct Inner {
    pages: HashMap<String, FakePage>,
    dead_urls: HashSet<String>,
    current: Option<String>,
}

#[derive(Default)]
pub struct FakeSession {
    inner: Mutex<Inner>,
    log: Arc<Mutex<Vec<Interaction>>>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, page: FakePage) -> Self {
        self.inner.lock().unwrap().pages.insert(url.to_string(), page);
        self
    }

    /// Navigation to `url` fails with a session error.
    pub fn dead_url(self, url: &str) -> Self {
        self.inner.lock().unwrap().dead_urls.insert(url.to_string());
        self
    }

    pub fn interactions(&self) -> Vec<Interaction> {
        self.log.lock().unwrap().clone()
    }

    fn current_page(&self) -> Option<FakePage> {
        let inner = self.inner.lock().unwrap();
        inner
            .current
            .as_ref()
            .and_then(|url| inner.pages.get(url))
            .cloned()
    }
}

#[async_trait]
impl Session for FakeSession {
    type Elem = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.dead_urls.contains(url) {
            inner.current = None;
            return Err(DriverError::Session(format!("unreachable url {url}")));
        }
        inner.current = Some(url.to_string());
        drop(inner);
        self.log
            .lock()
            .unwrap()
            .push(Interaction::Navigated(url.to_string()));
        Ok(())
    }

    async fn find_one(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Elem, DriverError> {
        let page = self.current_page().ok_or_else(|| {
            DriverError::Session("no page loaded".to_string())
        })?;
        match page.texts.get(selector) {
            Some(text) => Ok(FakeElement {
                selector: selector.to_string(),
                text: text.clone(),
                log: Arc::clone(&self.log),
            }),
            None => Err(DriverError::Timeout {
                selector: selector.to_string(),
                timeout,
            }),
        }
    }

    async fn find_all(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<Self::Elem>, DriverError> {
        let page = self.current_page().ok_or_else(|| {
            DriverError::Session("no page loaded".to_string())
        })?;
        match page.lists.get(selector) {
            Some(rows) if !rows.is_empty() => Ok(rows
                .iter()
                .map(|text| FakeElement {
                    selector: selector.to_string(),
                    text: text.clone(),
                    log: Arc::clone(&self.log),
                })
                .collect()),
            _ => Err(DriverError::Timeout {
                selector: selector.to_string(),
                timeout,
            }),
        }
    }
}

pub struct FakeElement {
    selector: String,
    text: String,
    log: Arc<Mutex<Vec<Interaction>>>,
}

#[async_trait]
impl Element for FakeElement {
    async fn text(&mut self) -> Result<String, DriverError> {
        Ok(self.text.clone())
    }

    async fn click(&mut self) -> Result<(), DriverError> {
        self.log
            .lock()
            .unwrap()
            .push(Interaction::Clicked(self.selector.clone()));
        Ok(())
    }

    async fn send_keys(&mut self, text: &str) -> Result<(), DriverError> {
        self.log.lock().unwrap().push(Interaction::Typed {
            selector: self.selector.clone(),
            keys: text.to_string(),
        });
        Ok(())
    }
}
