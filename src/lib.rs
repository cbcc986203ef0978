#![allow(async_fn_in_trait)]

// Re-export modules
pub mod config;
pub mod error;
pub mod extract;
pub mod paginate;
pub mod results;
pub mod scrape;
pub mod session;
pub mod stabilize;

// Re-export commonly used types for convenience
pub use config::ScoutConfig;
pub use error::ScrapeError;
pub use results::{FeatureRow, ListingItem, ProductDetails, ProductInfo, ProductReviews, Review};

use std::path::Path;

/// Entry point for the extraction engine.
///
/// Each fetch call owns exactly one browser session for its duration and
/// tears it down on every exit path. Independent targets can be fetched
/// concurrently; sessions share no state.
pub struct Scout {
    config: ScoutConfig,
}

impl Scout {
    /// Create a scout with the default configuration
    pub fn new() -> Self {
        Self {
            config: ScoutConfig::default(),
        }
    }

    /// Apply a configuration
    pub fn with_config(mut self, config: ScoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file<P: AsRef<Path>>(
        mut self,
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        self.config = ScoutConfig::from_file(path)?;
        Ok(self)
    }

    /// Override the WebDriver URL
    pub fn with_webdriver_url(mut self, url: &str) -> Self {
        self.config.webdriver_url = url.to_string();
        self
    }

    /// Override the listing page ceiling
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }

    /// Search the listing grid and collect `{title, price, link}` results
    /// across up to `max_pages` result pages
    pub async fn fetch_listing(&self, query: &str) -> Result<Vec<ListingItem>, ScrapeError> {
        scrape::listing::fetch_listing(&self.runtime_config(), query).await
    }

    /// Scrape `{title, price}` from a single product page
    pub async fn fetch_product_info(&self, url: &str) -> Result<ProductInfo, ScrapeError> {
        scrape::product::fetch_product_info(&self.runtime_config(), url).await
    }

    /// Scrape all user reviews from a product page
    pub async fn fetch_reviews(&self, url: &str) -> Result<ProductReviews, ScrapeError> {
        scrape::reviews::fetch_reviews(&self.runtime_config(), url).await
    }

    /// Scrape the detail view: title, price, description, feature table
    pub async fn fetch_details(&self, url: &str) -> Result<ProductDetails, ScrapeError> {
        scrape::details::fetch_details(&self.runtime_config(), url).await
    }

    /// Fetch product info for several independent targets concurrently.
    ///
    /// Each target gets its own session and its own typed outcome; one
    /// target's failure never blocks or corrupts another's result.
    pub async fn fetch_product_info_many(
        &self,
        urls: &[String],
    ) -> Vec<(String, Result<ProductInfo, ScrapeError>)> {
        let mut handles = Vec::with_capacity(urls.len());
        for url in urls {
            let config = self.runtime_config();
            let url = url.clone();
            handles.push((
                url.clone(),
                tokio::spawn(async move {
                    scrape::product::fetch_product_info(&config, &url).await
                }),
            ));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (url, handle) in handles {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    ::log::error!("Fetch task for {} aborted: {}", url, e);
                    Err(ScrapeError::ExtractionFailed(format!("fetch task aborted: {e}")))
                }
            };
            results.push((url, outcome));
        }
        results
    }

    /// Effective configuration for one call, with the WEBDRIVER_URL
    /// environment variable taking precedence over the configured value
    fn runtime_config(&self) -> ScoutConfig {
        let mut config = self.config.clone();
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                config.webdriver_url = webdriver_url;
            }
        }
        config
    }
}

impl Default for Scout {
    fn default() -> Self {
        Self::new()
    }
}
