use crate::config::{ScoutConfig, SiteSelectors};
use crate::error::ScrapeError;
use crate::extract::{self, parse_price};
use crate::results::ProductInfo;
use crate::session::PageSession;
use scraper::Html;

/// Scrape title and price from a single product page.
///
/// The buy-button marker must appear within its budget to prove the target
/// really is a product page; a page that loads but lacks it, or that lacks
/// a parseable title or price, fails with `InvalidTarget`.
pub async fn fetch_product_info(
    config: &ScoutConfig,
    url: &str,
) -> Result<ProductInfo, ScrapeError> {
    let mut session = PageSession::open(&config.webdriver_url, url).await?;
    let result = scrape_info(&session, config).await;
    session.close().await;
    result
}

async fn scrape_info(
    session: &PageSession,
    config: &ScoutConfig,
) -> Result<ProductInfo, ScrapeError> {
    let sel = &config.selectors;

    if !session
        .is_present(&sel.buy_button, config.product_marker_wait())
        .await
    {
        return Err(ScrapeError::InvalidTarget(
            "product marker never appeared".to_string(),
        ));
    }

    let source = session.source().await?;
    let (title, price) = read_info(&source, sel)?;

    match (title, price) {
        (Some(title), Some(price)) => {
            ::log::debug!("Product info for {}: {} @ {}", session.url(), title, price);
            Ok(ProductInfo { title, price })
        }
        _ => Err(ScrapeError::InvalidTarget(
            "page has no readable title or price".to_string(),
        )),
    }
}

/// Read title and parsed price out of a page-source snapshot
fn read_info(
    source: &str,
    sel: &SiteSelectors,
) -> Result<(Option<String>, Option<f64>), ScrapeError> {
    let doc = Html::parse_document(source);
    let title = extract::select_text(&doc, &sel.product_title)?;
    let price = extract::select_text(&doc, &sel.product_price)?
        .as_deref()
        .and_then(parse_price);
    Ok((title, price))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_PAGE: &str = r#"
        <h1 class="ui-pdp-title">Laptop 32GB</h1>
        <span style="font-size:36px">
          <span class="andes-money-amount__fraction">12,499</span>
        </span>
        <span class="andes-button__content">Comprar ahora</span>
    "#;

    #[test]
    fn test_read_info_parses_title_and_price() {
        let sel = SiteSelectors::default();
        let (title, price) = read_info(PRODUCT_PAGE, &sel).unwrap();
        assert_eq!(title, Some("Laptop 32GB".to_string()));
        assert_eq!(price, Some(12499.0));
    }

    #[test]
    fn test_read_info_missing_price_node() {
        let sel = SiteSelectors::default();
        let source = r#"<h1 class="ui-pdp-title">Laptop 32GB</h1>"#;
        let (title, price) = read_info(source, &sel).unwrap();
        assert_eq!(title, Some("Laptop 32GB".to_string()));
        assert_eq!(price, None);
    }

    #[test]
    fn test_read_info_unparseable_price_is_missing() {
        let sel = SiteSelectors::default();
        let source = r#"
            <h1 class="ui-pdp-title">Laptop</h1>
            <span style="font-size:36px">
              <span class="andes-money-amount__fraction">consultar</span>
            </span>
        "#;
        let (_, price) = read_info(source, &sel).unwrap();
        assert_eq!(price, None);
    }
}
