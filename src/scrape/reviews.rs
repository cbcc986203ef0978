use crate::config::{ScoutConfig, SiteSelectors};
use crate::error::ScrapeError;
use crate::results::{ProductReviews, shape_reviews};
use crate::session::PageSession;
use crate::stabilize::{self, LiveScrollProbe};

/// Fallback title when the marker is present but its text is unreadable
const NO_TITLE: &str = "NO TITLE PROVIDED";

/// Scrape all user reviews from a product page.
///
/// Small review sets are read straight off the main document. Larger sets
/// only materialize inside an embedded frame that loads lazily on scroll,
/// so the frame is stabilized before the single extraction pass.
pub async fn fetch_reviews(config: &ScoutConfig, url: &str) -> Result<ProductReviews, ScrapeError> {
    let mut session = PageSession::open(&config.webdriver_url, url).await?;
    let result = scrape_reviews(&mut session, config).await;
    session.close().await;
    result
}

async fn scrape_reviews(
    session: &mut PageSession,
    config: &ScoutConfig,
) -> Result<ProductReviews, ScrapeError> {
    let sel = &config.selectors;

    // Prove this is a product page at all
    if !session
        .is_present(&sel.product_title, config.title_wait())
        .await
    {
        return Err(ScrapeError::InvalidTarget(
            "product title marker never appeared".to_string(),
        ));
    }

    // Then that it carries a reviews section
    if !session
        .is_present(&sel.reviews_header, config.reviews_marker_wait())
        .await
    {
        return Err(ScrapeError::NoReviews);
    }

    let count = review_count(session, sel).await?;
    if count == Some(0) {
        return Err(ScrapeError::NoReviewsAvailable);
    }

    let product_title = session
        .text_of(&sel.product_title)
        .await?
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let raw = match count {
        Some(n) if n <= config.direct_extract_threshold => {
            ::log::debug!("{} reviews, extracting directly", n);
            session.texts_of(&sel.comment).await?
        }
        // Unknown counts take the stabilization path as well: an
        // unreadable counter usually means the full widget is in play
        _ => stabilized_comments(session, config).await?,
    };

    Ok(ProductReviews {
        product_title,
        reviews: shape_reviews(raw),
    })
}

/// Coarse review-count signal.
///
/// `Some(0)` when the zero-reviews label is showing, `None` when the
/// counter exists but its first token does not parse.
async fn review_count(
    session: &PageSession,
    sel: &SiteSelectors,
) -> Result<Option<u32>, ScrapeError> {
    if session.is_present_now(&sel.no_reviews_label).await? {
        return Ok(Some(0));
    }

    let text = session.text_of(&sel.review_count).await?;
    Ok(text.and_then(|t| {
        t.split_whitespace()
            .next()
            .and_then(|token| token.replace(',', "").parse().ok())
    }))
}

/// Open the full reviews container, stabilize the embedded frame's lazy
/// list, then read every comment in discovery order
async fn stabilized_comments(
    session: &mut PageSession,
    config: &ScoutConfig,
) -> Result<Vec<Option<String>>, ScrapeError> {
    let sel = config.selectors.clone();

    stabilize::open_container(session, &sel.show_more, &sel.container_marker, &config.stabilize)
        .await?;
    session.enter_frame(&sel.reviews_frame).await?;

    // Focus inside the frame so scroll deltas land on its document
    session.click_if_present("html").await?;

    let mut probe = LiveScrollProbe {
        session,
        item_selector: &sel.comment,
        scroll_step: config.stabilize.scroll_step,
    };
    let materialized = stabilize::stabilize(&mut probe, &config.stabilize).await?;
    ::log::debug!("Reviews frame stabilized at {} comments", materialized);

    let raw = session.texts_of(&sel.comment).await?;
    session.leave_frame().await?;
    Ok(raw)
}

#[cfg(test)]
mod tests {
    /// Parsing of the counter's leading token, mirroring review_count
    fn parse_count(text: &str) -> Option<u32> {
        text.split_whitespace()
            .next()
            .and_then(|token| token.replace(',', "").parse().ok())
    }

    #[test]
    fn test_count_token_parses_plain_number() {
        assert_eq!(parse_count("120 opiniones"), Some(120));
        assert_eq!(parse_count("3 opiniones"), Some(3));
    }

    #[test]
    fn test_count_token_parses_thousands_separator() {
        assert_eq!(parse_count("1,204 opiniones"), Some(1204));
    }

    #[test]
    fn test_count_token_garbage_is_unknown() {
        assert_eq!(parse_count("muchas opiniones"), None);
        assert_eq!(parse_count(""), None);
    }
}
