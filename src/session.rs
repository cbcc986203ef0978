use crate::error::ScrapeError;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;
use url::Url;

/// One isolated browser tab bound to one target URL.
///
/// A session is either open or closed. Every operation fails with
/// `SessionClosed` after `close()`, and `close()` itself is idempotent so
/// callers can invoke it unconditionally on every exit path.
pub struct PageSession {
    client: Option<Client>,
    url: String,
}

impl PageSession {
    /// Connect to the WebDriver, open a tab and navigate to `target`.
    ///
    /// Waits only for DOM readiness, not a full render. A malformed URL
    /// fails before a tab is allocated; a navigation failure closes the
    /// tab and fails with `InvalidTarget`.
    pub async fn open(webdriver_url: &str, target: &str) -> Result<Self, ScrapeError> {
        let parsed = Url::parse(target)
            .map_err(|e| ScrapeError::InvalidTarget(format!("bad url '{target}': {e}")))?;

        let client = connect(webdriver_url).await?;
        ::log::debug!("Navigating to {}", parsed);

        match client.goto(parsed.as_str()).await {
            Ok(_) => Ok(Self {
                client: Some(client),
                url: parsed.into(),
            }),
            Err(e) => {
                ::log::warn!("Navigation to {} failed: {}", parsed, e);
                if let Err(close_err) = client.close().await {
                    ::log::warn!("Failed to close tab after bad navigation: {}", close_err);
                }
                Err(ScrapeError::InvalidTarget(format!(
                    "navigation to '{parsed}' failed: {e}"
                )))
            }
        }
    }

    /// URL this session was opened against
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Wait for a required element, failing with `ElementNotFound` when it
    /// does not appear within `timeout`
    pub async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<Element, ScrapeError> {
        let client = self.client()?;
        client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .map_err(|_| ScrapeError::ElementNotFound {
                selector: selector.to_string(),
                timeout,
            })
    }

    /// Existence probe: whether `selector` appears within `timeout`
    pub async fn is_present(&self, selector: &str, timeout: Duration) -> bool {
        self.wait_for(selector, timeout).await.is_ok()
    }

    /// Whether `selector` matches right now, without waiting
    pub async fn is_present_now(&self, selector: &str) -> Result<bool, ScrapeError> {
        Ok(self.count_now(selector).await? > 0)
    }

    /// Number of nodes currently matching `selector`
    pub async fn count_now(&self, selector: &str) -> Result<usize, ScrapeError> {
        let client = self.client()?;
        let elements = client.find_all(Locator::Css(selector)).await?;
        Ok(elements.len())
    }

    /// Text content of the first match, or `None` when absent
    pub async fn text_of(&self, selector: &str) -> Result<Option<String>, ScrapeError> {
        let client = self.client()?;
        match client.find(Locator::Css(selector)).await {
            Ok(element) => Ok(Some(element.text().await?)),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Text content of every node matching `selector`, in document order.
    ///
    /// A node whose text cannot be read is recorded as `None` rather than
    /// failing the whole read.
    pub async fn texts_of(&self, selector: &str) -> Result<Vec<Option<String>>, ScrapeError> {
        let client = self.client()?;
        let elements = client.find_all(Locator::Css(selector)).await?;

        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            texts.push(element.text().await.ok());
        }
        Ok(texts)
    }

    /// Click the first match if one exists right now
    pub async fn click_if_present(&self, selector: &str) -> Result<bool, ScrapeError> {
        let client = self.client()?;
        match client.find(Locator::Css(selector)).await {
            Ok(element) => {
                // Click failures here are expected when the control is
                // mid-transition; the caller polls again
                if let Err(e) = element.click().await {
                    ::log::debug!("Click on '{}' failed: {}", selector, e);
                }
                Ok(true)
            }
            Err(e) if e.is_no_such_element() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Scroll the current document by a vertical delta
    pub async fn scroll_by(&self, delta: i64) -> Result<(), ScrapeError> {
        let client = self.client()?;
        client
            .execute("window.scrollBy(0, arguments[0]);", vec![json!(delta)])
            .await?;
        Ok(())
    }

    /// Full source of the current document
    pub async fn source(&self) -> Result<String, ScrapeError> {
        let client = self.client()?;
        Ok(client.source().await?)
    }

    /// Switch the session's querying context into an embedded frame.
    ///
    /// Fails with `FrameNotFound` when no node matches the selector.
    pub async fn enter_frame(&mut self, selector: &str) -> Result<(), ScrapeError> {
        let client = self.client()?;
        let frame = match client.find(Locator::Css(selector)).await {
            Ok(element) => element,
            Err(e) if e.is_no_such_element() => {
                return Err(ScrapeError::FrameNotFound(selector.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        frame.enter_frame().await?;
        Ok(())
    }

    /// Switch the querying context back to the parent document
    pub async fn leave_frame(&mut self) -> Result<(), ScrapeError> {
        let client = self.client.take().ok_or(ScrapeError::SessionClosed)?;
        match client.enter_parent_frame().await {
            Ok(()) => {
                self.client = Some(client);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Release the tab. Safe to call multiple times.
    pub async fn close(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close session for {}: {}", self.url, e);
            } else {
                ::log::debug!("Closed session for {}", self.url);
            }
        }
    }

    fn client(&self) -> Result<&Client, ScrapeError> {
        self.client.as_ref().ok_or(ScrapeError::SessionClosed)
    }
}

/// Connects to the WebDriver instance, trying common fallback ports when
/// the configured URL refuses the connection
async fn connect(webdriver_url: &str) -> Result<Client, ScrapeError> {
    let first_err = match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            e
        }
    };

    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://localhost:4444", // Selenium/geckodriver default
        "http://127.0.0.1:4444", // Try with IP instead of localhost
    ];

    for url in fallback_urls.iter() {
        if *url == webdriver_url {
            continue; // Skip if it's the same as the one we already tried
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!("Failed to connect to any WebDriver server");
    ::log::error!("Make sure a WebDriver server is running or set WEBDRIVER_URL");
    Err(first_err.into())
}
