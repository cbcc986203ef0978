use crate::config::{ScoutConfig, SiteSelectors};
use crate::error::ScrapeError;
use crate::extract::{self, parse_price};
use crate::results::{FeatureRow, ProductDetails};
use crate::session::PageSession;
use scraper::{Html, Selector};

/// Scrape the detail view of a product page: title, price, description and
/// the feature table.
///
/// Only the product-title marker is required; price and description are
/// nullable in the result, and a feature row missing a cell keeps an empty
/// string in that cell rather than being dropped.
pub async fn fetch_details(config: &ScoutConfig, url: &str) -> Result<ProductDetails, ScrapeError> {
    let mut session = PageSession::open(&config.webdriver_url, url).await?;
    let result = scrape_details(&session, config).await;
    session.close().await;
    result
}

async fn scrape_details(
    session: &PageSession,
    config: &ScoutConfig,
) -> Result<ProductDetails, ScrapeError> {
    let sel = &config.selectors;

    if !session
        .is_present(&sel.product_title, config.reviews_marker_wait())
        .await
    {
        return Err(ScrapeError::InvalidTarget(
            "product title marker never appeared".to_string(),
        ));
    }

    let source = session.source().await?;
    read_details(&source, sel)
}

/// Read the full detail set out of a page-source snapshot
fn read_details(source: &str, sel: &SiteSelectors) -> Result<ProductDetails, ScrapeError> {
    let doc = Html::parse_document(source);

    let title = extract::select_text(&doc, &sel.product_title)?.ok_or_else(|| {
        ScrapeError::InvalidTarget("page has no readable title".to_string())
    })?;
    let price = extract::select_text(&doc, &sel.product_price)?
        .as_deref()
        .and_then(parse_price);
    let description = extract::select_text(&doc, &sel.description)?;
    let features = read_feature_rows(&doc, sel)?;

    Ok(ProductDetails {
        title,
        price,
        description,
        features,
    })
}

/// Collect the feature table as ordered name/value pairs
fn read_feature_rows(doc: &Html, sel: &SiteSelectors) -> Result<Vec<FeatureRow>, ScrapeError> {
    let row_sel = parse(&sel.feature_row)?;
    let name_sel = parse(&sel.feature_name)?;
    let value_sel = parse(&sel.feature_value)?;

    let rows = doc
        .select(&row_sel)
        .map(|row| FeatureRow {
            feature: cell_text(row, &name_sel),
            value: cell_text(row, &value_sel),
        })
        .collect();
    Ok(rows)
}

fn cell_text(row: scraper::ElementRef<'_>, sel: &Selector) -> String {
    row.select(sel)
        .next()
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn parse(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector)
        .map_err(|e| ScrapeError::ExtractionFailed(format!("bad selector '{selector}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAILS_PAGE: &str = r#"
        <h1 class="ui-pdp-title">Laptop 32GB</h1>
        <span style="font-size:36px">
          <span class="andes-money-amount__fraction">12,499</span>
        </span>
        <p class="ui-pdp-description__content">A very fast laptop.</p>
        <table>
          <tbody class="andes-table__body">
            <tr class="andes-table__row">
              <th><div class="andes-table__header__container">RAM</div></th>
              <td class="andes-table__column--value">32 GB</td>
            </tr>
            <tr class="andes-table__row">
              <th><div class="andes-table__header__container">Marca</div></th>
            </tr>
            <tr class="andes-table__row">
              <td class="andes-table__column--value">orphan value</td>
            </tr>
          </tbody>
        </table>
    "#;

    #[test]
    fn test_read_details_full_page() {
        let details = read_details(DETAILS_PAGE, &SiteSelectors::default()).unwrap();
        assert_eq!(details.title, "Laptop 32GB");
        assert_eq!(details.price, Some(12499.0));
        assert_eq!(details.description, Some("A very fast laptop.".to_string()));
    }

    #[test]
    fn test_feature_rows_keep_rows_with_missing_cells() {
        let details = read_details(DETAILS_PAGE, &SiteSelectors::default()).unwrap();
        assert_eq!(
            details.features,
            vec![
                FeatureRow {
                    feature: "RAM".to_string(),
                    value: "32 GB".to_string(),
                },
                FeatureRow {
                    feature: "Marca".to_string(),
                    value: String::new(),
                },
                FeatureRow {
                    feature: String::new(),
                    value: "orphan value".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_read_details_without_optional_sections() {
        let source = r#"<h1 class="ui-pdp-title">Bare product</h1>"#;
        let details = read_details(source, &SiteSelectors::default()).unwrap();
        assert_eq!(details.title, "Bare product");
        assert_eq!(details.price, None);
        assert_eq!(details.description, None);
        assert!(details.features.is_empty());
    }

    #[test]
    fn test_read_details_missing_title_is_invalid_target() {
        let err = read_details("<p>nothing here</p>", &SiteSelectors::default()).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidTarget(_)));
    }
}
