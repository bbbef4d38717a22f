use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Result, ScraperError};

/// A bounded wait on a DOM condition ran out of time.
///
/// Not a [`ScraperError`]: callers decide whether a timeout is fatal
/// (e.g. the search box never appearing) or expected (the "Show more"
/// button disappearing once the result supply is exhausted).
#[derive(Debug)]
pub struct WaitTimeout {
    pub selector: String,
    pub waited: Duration,
}

impl fmt::Display for WaitTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "timed out after {:?} waiting for '{}'",
            self.waited, self.selector
        )
    }
}

/// Chrome switches used for every launch.
pub fn default_browser_args() -> Vec<&'static str> {
    vec![
        "--no-sandbox",
        "--disable-gpu",
        "--disable-dev-shm-usage",
        "--disable-extensions",
        "--disable-web-security",
        "--mute-audio",
        "--no-first-run",
        "--disable-default-apps",
        "--disable-sync",
        "--disable-background-networking",
        "--disable-blink-features=AutomationControlled",
    ]
}

/// The single browser session owned by one scraper run.
///
/// One `Browser`, one `Page`, no pooling: work items run strictly one
/// at a time and each gets a fresh session.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl BrowserSession {
    pub async fn launch(
        headless: bool,
        wait_timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Self> {
        info!("Launching browser (headless: {})", headless);

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1920, 1080)
            .args(default_browser_args());
        if !headless {
            builder = builder.with_head();
        }
        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::OpenSiteFailed(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::OpenSiteFailed(format!("Failed to launch browser: {}", e)))?;

        // drive the CDP event stream for the lifetime of the session
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    let msg = e.to_string();
                    // websocket deserialization noise from protocol version skew
                    if msg.contains("data did not match any variant") {
                        debug!("Ignoring CDP deserialization error: {}", e);
                    } else {
                        warn!("Browser handler error: {}", e);
                    }
                }
            }
            debug!("Browser handler task ended");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::OpenSiteFailed(format!("Failed to create page: {}", e)))?;

        info!("Browser session ready");
        Ok(Self {
            browser,
            page,
            handler_task,
            wait_timeout,
            poll_interval,
        })
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| ScraperError::Navigation(format!("Failed to navigate to {}: {}", url, e)))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| ScraperError::Navigation(format!("Navigation to {} did not settle: {}", url, e)))?;
        Ok(())
    }

    /// All elements currently matching `selector`. The underlying document
    /// is live; callers must re-query rather than hold on to handles.
    pub async fn find_all(&self, selector: &str) -> Result<Vec<Element>> {
        match self.page.find_elements(selector).await {
            Ok(elements) => Ok(elements),
            // no matches surfaces as an error in CDP; normalize to empty
            Err(chromiumoxide::error::CdpError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Poll for `selector` until it resolves or the bounded wait elapses.
    pub async fn wait_for(&self, selector: &str) -> std::result::Result<Element, WaitTimeout> {
        let deadline = Instant::now() + self.wait_timeout;
        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                return Ok(element);
            }
            if Instant::now() >= deadline {
                return Err(WaitTimeout {
                    selector: selector.to_string(),
                    waited: self.wait_timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Bounded wait for `selector`, then scroll it into view and click it.
    pub async fn click_when_ready(
        &self,
        selector: &str,
    ) -> std::result::Result<(), WaitTimeout> {
        let deadline = Instant::now() + self.wait_timeout;
        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                let clicked = async {
                    element.scroll_into_view().await?;
                    element.click().await?;
                    Ok::<_, chromiumoxide::error::CdpError>(())
                }
                .await;
                match clicked {
                    Ok(()) => return Ok(()),
                    Err(e) => debug!("Element '{}' not yet clickable: {}", selector, e),
                }
            }
            if Instant::now() >= deadline {
                return Err(WaitTimeout {
                    selector: selector.to_string(),
                    waited: self.wait_timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Bounded wait on a child of `element`, for optional sub-fields like
    /// article images that render lazily.
    pub async fn wait_for_child(
        &self,
        element: &Element,
        selector: &str,
    ) -> std::result::Result<Element, WaitTimeout> {
        let deadline = Instant::now() + self.wait_timeout;
        loop {
            if let Ok(child) = element.find_element(selector).await {
                return Ok(child);
            }
            if Instant::now() >= deadline {
                return Err(WaitTimeout {
                    selector: selector.to_string(),
                    waited: self.wait_timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Run a script in the page and deserialize its completion value.
    pub async fn evaluate<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T> {
        let value = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| ScraperError::Navigation(format!("Script evaluation failed: {}", e)))?
            .into_value::<T>()
            .map_err(|e| ScraperError::DataProcessing(format!("Unexpected script result: {}", e)))?;
        Ok(value)
    }

    pub async fn type_into(&self, element: &Element, text: &str) -> Result<()> {
        element
            .click()
            .await
            .map_err(|e| ScraperError::Navigation(format!("Failed to focus element: {}", e)))?;
        element
            .type_str(text)
            .await
            .map_err(|e| ScraperError::Navigation(format!("Failed to type into element: {}", e)))?;
        Ok(())
    }

    pub async fn press_enter(&self, element: &Element) -> Result<()> {
        element
            .press_key("Enter")
            .await
            .map_err(|e| ScraperError::Navigation(format!("Failed to press Enter: {}", e)))?;
        Ok(())
    }

    pub async fn close(self) -> Result<()> {
        let mut browser = self.browser;
        browser
            .close()
            .await
            .map_err(|e| ScraperError::CloseBrowserFailed(e.to_string()))?;
        let _ = browser.wait().await;
        self.handler_task.abort();
        info!("Browser closed successfully");
        Ok(())
    }
}
