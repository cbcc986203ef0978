use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Configuration for the extraction engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Base URL that listing search queries are joined onto
    #[serde(default = "default_base_search_url")]
    pub base_search_url: String,

    /// Hard ceiling on result pages visited per listing search
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Wait budget for the product-title marker, in milliseconds
    #[serde(default = "default_title_wait_ms")]
    pub title_wait_ms: u64,

    /// Wait budget for the buy-button marker on product-info pages
    #[serde(default = "default_product_marker_wait_ms")]
    pub product_marker_wait_ms: u64,

    /// Wait budget for the reviews-section marker
    #[serde(default = "default_reviews_marker_wait_ms")]
    pub reviews_marker_wait_ms: u64,

    /// Wait budget for the next-page control on listing pages
    #[serde(default = "default_next_wait_ms")]
    pub next_wait_ms: u64,

    /// Review count at or below which reviews are read straight off the
    /// main document instead of scrolling the embedded frame
    #[serde(default = "default_direct_extract_threshold")]
    pub direct_extract_threshold: u32,

    /// Scroll-stabilization tuning
    #[serde(default)]
    pub stabilize: StabilizeConfig,

    /// CSS selector contracts for the target site
    #[serde(default)]
    pub selectors: SiteSelectors,
}

/// Tuning for the scroll-stabilization loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilizeConfig {
    /// Consecutive no-growth probes required before the list is considered
    /// fully materialized
    #[serde(default = "default_max_idle_rounds")]
    pub max_idle_rounds: u32,

    /// Pause between scroll bursts and the re-count, in milliseconds
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Vertical scroll delta issued per wheel event, in pixels
    #[serde(default = "default_scroll_step")]
    pub scroll_step: i64,

    /// Total budget for the reviews container to open, in milliseconds
    #[serde(default = "default_open_budget_ms")]
    pub open_budget_ms: u64,

    /// Pause between container-open trigger attempts, in milliseconds
    #[serde(default = "default_open_poll_ms")]
    pub open_poll_ms: u64,
}

/// CSS selector contracts for one storefront layout.
///
/// Defaults target MercadoLibre; any of them can be overridden from a
/// config file when the site ships a redesign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSelectors {
    /// Marker proving the page is a product page
    #[serde(default = "default_product_title")]
    pub product_title: String,

    /// Secondary product-page marker (the buy button renders late)
    #[serde(default = "default_buy_button")]
    pub buy_button: String,

    /// Marker proving the page carries a reviews section
    #[serde(default = "default_reviews_header")]
    pub reviews_header: String,

    /// Coarse review-count element; first whitespace token is the count
    #[serde(default = "default_review_count")]
    pub review_count: String,

    /// Element present only when the product has zero reviews
    #[serde(default = "default_no_reviews_label")]
    pub no_reviews_label: String,

    /// One review comment node, valid in both the main document and the
    /// embedded reviews frame
    #[serde(default = "default_comment")]
    pub comment: String,

    /// Trigger that opens the full reviews container
    #[serde(default = "default_show_more")]
    pub show_more: String,

    /// Marker that appears once the reviews container has opened
    #[serde(default = "default_container_marker")]
    pub container_marker: String,

    /// The embedded frame hosting the full review list
    #[serde(default = "default_reviews_frame")]
    pub reviews_frame: String,

    /// One grid cell on a listing results page
    #[serde(default = "default_listing_item")]
    pub listing_item: String,

    /// Title/link anchor inside a grid cell
    #[serde(default = "default_listing_link")]
    pub listing_link: String,

    /// Price fraction inside a grid cell
    #[serde(default = "default_listing_price")]
    pub listing_price: String,

    /// Pagination next-page control
    #[serde(default = "default_next_button")]
    pub next_button: String,

    /// Price fraction on a product page (the non-discounted figure)
    #[serde(default = "default_product_price")]
    pub product_price: String,

    /// Product description block
    #[serde(default = "default_description")]
    pub description: String,

    /// One row of the feature table
    #[serde(default = "default_feature_row")]
    pub feature_row: String,

    /// Feature-name cell within a row
    #[serde(default = "default_feature_name")]
    pub feature_name: String,

    /// Feature-value cell within a row
    #[serde(default = "default_feature_value")]
    pub feature_value: String,
}

impl ScoutConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn title_wait(&self) -> Duration {
        Duration::from_millis(self.title_wait_ms)
    }

    pub fn product_marker_wait(&self) -> Duration {
        Duration::from_millis(self.product_marker_wait_ms)
    }

    pub fn reviews_marker_wait(&self) -> Duration {
        Duration::from_millis(self.reviews_marker_wait_ms)
    }

    pub fn next_wait(&self) -> Duration {
        Duration::from_millis(self.next_wait_ms)
    }
}

impl StabilizeConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn open_budget(&self) -> Duration {
        Duration::from_millis(self.open_budget_ms)
    }

    pub fn open_poll(&self) -> Duration {
        Duration::from_millis(self.open_poll_ms)
    }
}

impl Default for ScoutConfig {
    fn default() -> Self {
        // serde defaults and programmatic defaults must agree
        serde_json::from_str("{}").expect("empty config must deserialize")
    }
}

impl Default for StabilizeConfig {
    fn default() -> Self {
        serde_json::from_str("{}").expect("empty config must deserialize")
    }
}

impl Default for SiteSelectors {
    fn default() -> Self {
        serde_json::from_str("{}").expect("empty config must deserialize")
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_base_search_url() -> String {
    "https://listado.mercadolibre.com.mx/".to_string()
}

fn default_max_pages() -> usize {
    10
}

fn default_title_wait_ms() -> u64 {
    5000
}

fn default_product_marker_wait_ms() -> u64 {
    10000
}

fn default_reviews_marker_wait_ms() -> u64 {
    2000
}

fn default_next_wait_ms() -> u64 {
    5000
}

fn default_direct_extract_threshold() -> u32 {
    5
}

fn default_max_idle_rounds() -> u32 {
    5
}

fn default_settle_ms() -> u64 {
    1000
}

fn default_scroll_step() -> i64 {
    10000
}

fn default_open_budget_ms() -> u64 {
    8000
}

fn default_open_poll_ms() -> u64 {
    250
}

fn default_product_title() -> String {
    "h1.ui-pdp-title".to_string()
}

fn default_buy_button() -> String {
    "span.andes-button__content".to_string()
}

fn default_reviews_header() -> String {
    ".ui-review-capability__header__title".to_string()
}

fn default_review_count() -> String {
    ".total-opinion".to_string()
}

fn default_no_reviews_label() -> String {
    "h3.ui-reviews-label".to_string()
}

fn default_comment() -> String {
    "[data-testid=\"comment-content-component\"]".to_string()
}

fn default_show_more() -> String {
    ".show-more-click".to_string()
}

fn default_container_marker() -> String {
    ".andes-modal__scroll".to_string()
}

fn default_reviews_frame() -> String {
    "#ui-pdp-iframe-reviews".to_string()
}

fn default_listing_item() -> String {
    ".ui-search-layout__item".to_string()
}

fn default_listing_link() -> String {
    "h3 a".to_string()
}

fn default_listing_price() -> String {
    "span.andes-money-amount--cents-superscript span.andes-money-amount__fraction".to_string()
}

fn default_next_button() -> String {
    ".andes-pagination__button.andes-pagination__button--next".to_string()
}

fn default_product_price() -> String {
    "span[style=\"font-size:36px\"] .andes-money-amount__fraction".to_string()
}

fn default_description() -> String {
    ".ui-pdp-description__content".to_string()
}

fn default_feature_row() -> String {
    ".andes-table__body .andes-table__row".to_string()
}

fn default_feature_name() -> String {
    ".andes-table__header__container".to_string()
}

fn default_feature_value() -> String {
    ".andes-table__column--value".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_yields_defaults() {
        let config: ScoutConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(config.max_pages, 10);
        assert_eq!(config.direct_extract_threshold, 5);
        assert_eq!(config.stabilize.max_idle_rounds, 5);
        assert_eq!(config.stabilize.settle_ms, 1000);
        assert_eq!(config.selectors.product_title, "h1.ui-pdp-title");
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let json = r#"{
            "max_pages": 3,
            "stabilize": { "max_idle_rounds": 2 },
            "selectors": { "product_title": "h1.title" }
        }"#;
        let config: ScoutConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.stabilize.max_idle_rounds, 2);
        // Untouched fields fall back to their defaults
        assert_eq!(config.stabilize.scroll_step, 10000);
        assert_eq!(config.selectors.product_title, "h1.title");
        assert_eq!(config.selectors.next_button.contains("pagination"), true);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = ScoutConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: ScoutConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.webdriver_url, config.webdriver_url);
        assert_eq!(back.selectors.comment, config.selectors.comment);
    }
}
