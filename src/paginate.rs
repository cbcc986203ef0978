use crate::error::ScrapeError;
use crate::extract::{self, ExtractedItem, FieldSpec};
use scraper::Html;

/// A sequence of result pages that can be read and advanced.
///
/// The live implementation drives a browser tab; tests feed scripted page
/// sources instead.
pub trait PageCursor {
    /// Source of the page currently showing
    async fn page_source(&mut self) -> Result<String, ScrapeError>;

    /// Activate the next-page control. Returns `false` when the control is
    /// absent, which ends the crawl normally.
    async fn advance(&mut self) -> Result<bool, ScrapeError>;
}

/// Progress through a bounded pagination crawl
#[derive(Debug, Default)]
pub struct PaginationState {
    pub page_index: usize,
    pub accumulated: Vec<ExtractedItem>,
}

/// Extract every result page reachable through the next-page control.
///
/// Stops when the control disappears or `max_pages` pages have been read;
/// the ceiling also bounds adversarial or cyclic pagination. A page whose
/// extraction fails structurally aborts the whole crawl: unlike a single
/// malformed grid item, a whole-page failure is systemic and is not masked.
pub async fn collect<C: PageCursor>(
    cursor: &mut C,
    container_selector: &str,
    fields: &[FieldSpec],
    required: &[&str],
    max_pages: usize,
) -> Result<Vec<ExtractedItem>, ScrapeError> {
    let mut state = PaginationState::default();

    while state.page_index < max_pages {
        state.page_index += 1;

        let source = cursor.page_source().await?;
        let items = extract_page(&source, container_selector, fields, required)?;
        ::log::info!(
            "Page {}: {} items ({} total)",
            state.page_index,
            items.len(),
            state.accumulated.len() + items.len()
        );
        state.accumulated.extend(items);

        if state.page_index >= max_pages {
            ::log::info!("Reached page ceiling of {}", max_pages);
            break;
        }

        if !cursor.advance().await? {
            ::log::debug!("No next-page control after page {}", state.page_index);
            break;
        }
    }

    Ok(state.accumulated)
}

/// Parse one page source and run the batch extractor over it
fn extract_page(
    source: &str,
    container_selector: &str,
    fields: &[FieldSpec],
    required: &[&str],
) -> Result<Vec<ExtractedItem>, ScrapeError> {
    let doc = Html::parse_document(source);
    extract::extract_all(&doc, container_selector, fields, required)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_items(titles: &[&str]) -> String {
        let cells: String = titles
            .iter()
            .map(|t| {
                format!(
                    r#"<li class="cell"><h3><a href="/p/{t}">{t}</a></h3><span class="price">100</span></li>"#
                )
            })
            .collect();
        format!("<ol>{cells}</ol>")
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("title", "h3 a"),
            FieldSpec::text("price", "span.price"),
            FieldSpec::attr("link", "h3 a", "href"),
        ]
    }

    /// Cursor over scripted pages; `has_next` reports whether a next
    /// control exists after the current page
    struct FakeCursor {
        pages: Vec<String>,
        current: usize,
        advances: usize,
        endless_next: bool,
    }

    impl FakeCursor {
        fn new(pages: Vec<String>, endless_next: bool) -> Self {
            Self {
                pages,
                current: 0,
                advances: 0,
                endless_next,
            }
        }
    }

    impl PageCursor for FakeCursor {
        async fn page_source(&mut self) -> Result<String, ScrapeError> {
            Ok(self.pages[self.current.min(self.pages.len() - 1)].clone())
        }

        async fn advance(&mut self) -> Result<bool, ScrapeError> {
            if !self.endless_next && self.current + 1 >= self.pages.len() {
                return Ok(false);
            }
            self.advances += 1;
            self.current += 1;
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_collect_ends_when_next_control_absent() {
        let pages = vec![
            page_with_items(&["a", "b"]),
            page_with_items(&["c"]),
        ];
        let mut cursor = FakeCursor::new(pages, false);
        let items = collect(&mut cursor, "li.cell", &fields(), &["title", "link"], 10)
            .await
            .unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(cursor.advances, 1);
        assert_eq!(items[2].get("title"), Some("c"));
    }

    #[tokio::test]
    async fn test_collect_hard_stops_at_max_pages() {
        // The next control never disappears
        let mut cursor = FakeCursor::new(vec![page_with_items(&["x"])], true);
        let items = collect(&mut cursor, "li.cell", &fields(), &["title"], 4)
            .await
            .unwrap();

        assert_eq!(items.len(), 4);
        // Never more than max_pages - 1 advances for max_pages pages
        assert_eq!(cursor.advances, 3);
    }

    #[tokio::test]
    async fn test_collect_single_page_ceiling_never_advances() {
        let mut cursor = FakeCursor::new(vec![page_with_items(&["x"])], true);
        let items = collect(&mut cursor, "li.cell", &fields(), &["title"], 1)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(cursor.advances, 0);
    }

    #[tokio::test]
    async fn test_collect_aborts_whole_crawl_on_bad_selector() {
        let mut cursor = FakeCursor::new(vec![page_with_items(&["x"])], false);
        let err = collect(&mut cursor, "li..cell", &fields(), &["title"], 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::ExtractionFailed(_)));
    }

    #[tokio::test]
    async fn test_collect_accumulates_in_page_order() {
        let pages = vec![
            page_with_items(&["a"]),
            page_with_items(&["b"]),
            page_with_items(&["c"]),
        ];
        let mut cursor = FakeCursor::new(pages, false);
        let items = collect(&mut cursor, "li.cell", &fields(), &["title"], 10)
            .await
            .unwrap();

        let titles: Vec<_> = items.iter().map(|i| i.get("title").unwrap()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }
}
