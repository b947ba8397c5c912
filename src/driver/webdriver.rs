// src/driver/webdriver.rs

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{error::CmdError, Client, ClientBuilder, Locator};
use serde_json::json;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use super::{DriverError, Element, Session};

/// How often a bounded wait re-checks the page for its element.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// WebDriver endpoint, e.g. `http://localhost:9515`.
    pub webdriver_url: String,
    pub headless: bool,
    /// Where the browser drops any downloads it is asked to save.
    pub download_dir: PathBuf,
}

/// A probate-court browsing session backed by a chromedriver endpoint.
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    pub async fn connect(cfg: &DriverConfig) -> Result<Self, DriverError> {
        let mut args = vec![
            "--disable-logging".to_string(),
            "--start-maximized".to_string(),
            "--no-sandbox".to_string(),
        ];
        if cfg.headless {
            args.push("--headless=new".to_string());
            args.push("--disable-gpu".to_string());
            args.push("--disable-dev-shm-usage".to_string());
        }

        let mut chrome_opts = serde_json::Map::new();
        chrome_opts.insert("args".to_string(), json!(args));
        chrome_opts.insert(
            "prefs".to_string(),
            json!({
                "download.default_directory": cfg.download_dir.display().to_string(),
                "download.prompt_for_download": false,
                "download.directory_upgrade": true,
                "safebrowsing.enabled": true,
            }),
        );

        let mut caps = serde_json::Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::rustls()
            .capabilities(caps)
            .connect(&cfg.webdriver_url)
            .await
            .map_err(|e| DriverError::Session(e.to_string()))?;

        info!(url = %cfg.webdriver_url, headless = cfg.headless, "webdriver session established");
        Ok(Self { client })
    }

    /// End the browser session. Must run on every exit path.
    pub async fn close(self) -> Result<(), DriverError> {
        self.client
            .close()
            .await
            .map_err(|e| DriverError::Session(e.to_string()))
    }
}

/// `true` when the error only means the element is not on the page (yet),
/// which a bounded wait should absorb rather than surface.
fn is_absence(err: &CmdError) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("no such element") || msg.contains("unable to locate")
}

/// Map a raw WebDriver failure onto the retry taxonomy. Chromedriver reports
/// errors as prose, so classification goes by message.
fn classify(err: CmdError) -> DriverError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("click intercepted") || lower.contains("not interactable") {
        DriverError::NotInteractable(msg)
    } else if lower.contains("timeout") || lower.contains("timed out") {
        DriverError::Timeout {
            selector: String::new(),
            timeout: Duration::ZERO,
        }
    } else {
        DriverError::Session(msg)
    }
}

#[async_trait]
impl Session for WebDriverSession {
    type Elem = WebElement;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        debug!(%url, "navigating");
        self.client.clone().goto(url).await.map(|_| ()).map_err(classify)
    }

    async fn find_one(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Elem, DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.client.clone().find(Locator::XPath(selector)).await {
                Ok(el) => return Ok(WebElement { inner: el }),
                Err(err) if is_absence(&err) => {
                    if Instant::now() >= deadline {
                        return Err(DriverError::Timeout {
                            selector: selector.to_string(),
                            timeout,
                        });
                    }
                    sleep(POLL_INTERVAL).await;
                }
                Err(err) => return Err(classify(err)),
            }
        }
    }

    async fn find_all(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<Self::Elem>, DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.client.clone().find_all(Locator::XPath(selector)).await {
                Ok(els) if !els.is_empty() => {
                    return Ok(els
                        .into_iter()
                        .map(|inner| WebElement { inner })
                        .collect())
                }
                Ok(_) => {
                    if Instant::now() >= deadline {
                        return Err(DriverError::Timeout {
                            selector: selector.to_string(),
                            timeout,
                        });
                    }
                    sleep(POLL_INTERVAL).await;
                }
                Err(err) if is_absence(&err) => {
                    if Instant::now() >= deadline {
                        return Err(DriverError::Timeout {
                            selector: selector.to_string(),
                            timeout,
                        });
                    }
                    sleep(POLL_INTERVAL).await;
                }
                Err(err) => return Err(classify(err)),
            }
        }
    }
}

pub struct WebElement {
    inner: fantoccini::elements::Element,
}

// fantoccini handles are cheap clones over one underlying session.
#[async_trait]
impl Element for WebElement {
    async fn text(&mut self) -> Result<String, DriverError> {
        self.inner.clone().text().await.map_err(classify)
    }

    async fn click(&mut self) -> Result<(), DriverError> {
        self.inner.clone().click().await.map(|_| ()).map_err(classify)
    }

    async fn send_keys(&mut self, text: &str) -> Result<(), DriverError> {
        self.inner.clone().send_keys(text).await.map_err(classify)
    }
}
