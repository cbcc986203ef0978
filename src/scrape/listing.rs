use crate::config::ScoutConfig;
use crate::error::ScrapeError;
use crate::extract::{self, FieldSpec};
use crate::paginate::{self, PageCursor};
use crate::results::ListingItem;
use crate::session::PageSession;
use url::Url;

/// Search the listing grid for `query` and collect results across pages.
///
/// A query matching nothing but decorative grid nodes yields an empty
/// vector, not an error.
pub async fn fetch_listing(
    config: &ScoutConfig,
    query: &str,
) -> Result<Vec<ListingItem>, ScrapeError> {
    let url = search_url(&config.base_search_url, query)?;
    ::log::info!("Listing search: {}", url);

    let mut session = PageSession::open(&config.webdriver_url, url.as_str()).await?;
    let result = crawl_pages(&mut session, config).await;
    session.close().await;
    result
}

/// Build the search URL: spaces in the query become dashes, then the slug
/// is joined onto the configured base
fn search_url(base: &str, query: &str) -> Result<Url, ScrapeError> {
    let slug = query.trim().replace(' ', "-");
    Url::parse(base)
        .and_then(|b| b.join(&slug))
        .map_err(|e| ScrapeError::InvalidTarget(format!("bad search url for '{query}': {e}")))
}

async fn crawl_pages(
    session: &mut PageSession,
    config: &ScoutConfig,
) -> Result<Vec<ListingItem>, ScrapeError> {
    let sel = &config.selectors;
    let fields = vec![
        FieldSpec::text("title", &sel.listing_link),
        FieldSpec::text("price", &sel.listing_price),
        FieldSpec::attr("link", &sel.listing_link, "href"),
    ];

    let mut cursor = ListingCursor { session, config };
    let items = paginate::collect(
        &mut cursor,
        &sel.listing_item,
        &fields,
        &["title", "price", "link"],
        config.max_pages,
    )
    .await?;

    // A raw price that survives extraction can still be an unsupported
    // format; such items are excluded, never returned with a null price
    let listings: Vec<ListingItem> = items
        .iter()
        .filter_map(|item| {
            let price = extract::parse_price(item.get("price")?)?;
            Some(ListingItem {
                title: item.get("title")?.to_string(),
                price,
                link: item.get("link")?.to_string(),
            })
        })
        .collect();

    ::log::info!("Listing search produced {} items", listings.len());
    Ok(listings)
}

/// Live cursor over a listing session's result pages
struct ListingCursor<'a> {
    session: &'a PageSession,
    config: &'a ScoutConfig,
}

impl PageCursor for ListingCursor<'_> {
    async fn page_source(&mut self) -> Result<String, ScrapeError> {
        self.session.source().await
    }

    async fn advance(&mut self) -> Result<bool, ScrapeError> {
        let sel = &self.config.selectors;
        let next = match self
            .session
            .wait_for(&sel.next_button, self.config.next_wait())
            .await
        {
            Ok(element) => element,
            Err(ScrapeError::ElementNotFound { .. }) => return Ok(false),
            Err(e) => return Err(e),
        };

        next.click().await?;

        // Give the next grid a chance to render before it is re-read
        let _ = self
            .session
            .is_present(&sel.listing_item, self.config.next_wait())
            .await;
        Ok(true)
    }
}
