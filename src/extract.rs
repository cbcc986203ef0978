use crate::error::ScrapeError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

/// Where a field's value comes from within its matched node
#[derive(Debug, Clone)]
pub enum FieldSource {
    /// Concatenated text content of the node
    Text,
    /// A named attribute of the node
    Attr(String),
}

/// Contract for reading one named field out of an item node
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field name in the resulting item
    pub name: String,

    /// CSS selector, scoped to the item's container node
    pub selector: String,

    /// Text content or a named attribute
    pub source: FieldSource,
}

impl FieldSpec {
    pub fn text(name: &str, selector: &str) -> Self {
        Self {
            name: name.to_string(),
            selector: selector.to_string(),
            source: FieldSource::Text,
        }
    }

    pub fn attr(name: &str, selector: &str, attr: &str) -> Self {
        Self {
            name: name.to_string(),
            selector: selector.to_string(),
            source: FieldSource::Attr(attr.to_string()),
        }
    }
}

/// One extracted item: field name to optional value.
///
/// A field that was absent or empty on the page is present in the map with
/// a `None` value. Absence is a normal data outcome here, not a fault.
#[derive(Debug, Clone, Default)]
pub struct ExtractedItem {
    fields: BTreeMap<String, Option<String>>,
}

impl ExtractedItem {
    /// The field's value, or `None` if it was missing on the page
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_deref())
    }

    /// Whether the field was recorded as missing
    pub fn is_missing(&self, name: &str) -> bool {
        self.get(name).is_none()
    }

    fn insert(&mut self, name: &str, value: Option<String>) {
        self.fields.insert(name.to_string(), value);
    }
}

/// Read every field spec against one item node.
///
/// Per-field failure (no matching child, missing attribute, empty text)
/// records the field as missing rather than aborting the item.
pub fn extract(root: ElementRef<'_>, fields: &[(FieldSpec, Selector)]) -> ExtractedItem {
    let mut item = ExtractedItem::default();

    for (spec, selector) in fields {
        let value = root.select(selector).next().and_then(|node| match &spec.source {
            FieldSource::Text => non_empty(node.text().collect::<String>()),
            FieldSource::Attr(attr) => node.value().attr(attr).map(|v| v.to_string()),
        });
        item.insert(&spec.name, value);
    }

    item
}

/// Extract one item per container node in the document.
///
/// Any container missing one of `required` is silently skipped: listing
/// grids mix real results with promotional nodes that match the same CSS
/// shape but lack the expected children, and those must not poison the
/// batch. An invalid selector is a whole-page failure and aborts.
pub fn extract_all(
    doc: &Html,
    container_selector: &str,
    fields: &[FieldSpec],
    required: &[&str],
) -> Result<Vec<ExtractedItem>, ScrapeError> {
    let container = parse_selector(container_selector)?;
    let compiled = compile_fields(fields)?;

    let mut items = Vec::new();
    let mut skipped = 0usize;

    for node in doc.select(&container) {
        let item = extract(node, &compiled);
        if required.iter().any(|name| item.is_missing(name)) {
            // Decorative or malformed grid node
            skipped += 1;
            continue;
        }
        items.push(item);
    }

    ::log::debug!(
        "Extracted {} items from '{}' ({} skipped)",
        items.len(),
        container_selector,
        skipped
    );

    Ok(items)
}

/// Text content of the first node matching `selector`, if any
pub fn select_text(doc: &Html, selector: &str) -> Result<Option<String>, ScrapeError> {
    let sel = parse_selector(selector)?;
    Ok(doc
        .select(&sel)
        .next()
        .and_then(|node| non_empty(node.text().collect::<String>())))
}

/// Parse a displayed price into a numeric amount.
///
/// Strips dollar signs, comma thousands separators and whitespace. Any
/// other formatting is an unsupported locale and yields a missing field.
pub fn parse_price(raw: &str) -> Option<f64> {
    let stripped = Regex::new(r"[$,\s]")
        .expect("static pattern")
        .replace_all(raw, "")
        .into_owned();

    if stripped.is_empty() {
        return None;
    }
    stripped.parse::<f64>().ok()
}

/// Compile field specs, failing the whole extraction on a bad selector
pub fn compile_fields(fields: &[FieldSpec]) -> Result<Vec<(FieldSpec, Selector)>, ScrapeError> {
    fields
        .iter()
        .map(|spec| Ok((spec.clone(), parse_selector(&spec.selector)?)))
        .collect()
}

fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector)
        .map_err(|e| ScrapeError::ExtractionFailed(format!("bad selector '{selector}': {e}")))
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_GRID: &str = r#"
        <ol>
          <li class="item">
            <h3><a href="/p/1">Laptop 32GB</a></h3>
            <span class="price">12,499</span>
          </li>
          <li class="item">
            <div class="ad-banner">Sponsored</div>
          </li>
          <li class="item">
            <h3><a href="/p/2">Laptop 16GB</a></h3>
            <span class="price">$8,999</span>
          </li>
          <li class="item">
            <h3><a href="/p/3">Mystery deal</a></h3>
          </li>
        </ol>
    "#;

    fn listing_fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("title", "h3 a"),
            FieldSpec::text("price", "span.price"),
            FieldSpec::attr("link", "h3 a", "href"),
        ]
    }

    #[test]
    fn test_extract_all_skips_decorative_nodes() {
        let doc = Html::parse_document(LISTING_GRID);
        let items =
            extract_all(&doc, "li.item", &listing_fields(), &["title", "price", "link"]).unwrap();

        // The ad banner and the priceless item are dropped, not surfaced
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("title"), Some("Laptop 32GB"));
        assert_eq!(items[0].get("link"), Some("/p/1"));
        assert_eq!(items[1].get("price"), Some("$8,999"));
    }

    #[test]
    fn test_extract_all_with_no_required_fields_keeps_everything() {
        let doc = Html::parse_document(LISTING_GRID);
        let items = extract_all(&doc, "li.item", &listing_fields(), &[]).unwrap();

        assert_eq!(items.len(), 4);
        assert!(items[1].is_missing("title"));
        assert!(items[3].is_missing("price"));
        assert_eq!(items[3].get("title"), Some("Mystery deal"));
    }

    #[test]
    fn test_extract_all_only_decorations_yields_empty_not_error() {
        let doc = Html::parse_document(r#"<li class="item"><em>ad</em></li>"#);
        let items =
            extract_all(&doc, "li.item", &listing_fields(), &["title", "link"]).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_extract_all_bad_selector_is_whole_page_failure() {
        let doc = Html::parse_document(LISTING_GRID);
        let err = extract_all(&doc, "li..item", &listing_fields(), &[]).unwrap_err();
        assert!(matches!(err, ScrapeError::ExtractionFailed(_)));
    }

    #[test]
    fn test_select_text_missing_node_is_none() {
        let doc = Html::parse_document("<p>hi</p>");
        assert_eq!(select_text(&doc, "h1").unwrap(), None);
        assert_eq!(select_text(&doc, "p").unwrap(), Some("hi".to_string()));
    }

    #[test]
    fn test_whitespace_only_text_counts_as_missing() {
        let doc = Html::parse_document("<h1>   </h1>");
        assert_eq!(select_text(&doc, "h1").unwrap(), None);
    }

    #[test]
    fn test_parse_price_strips_separators_and_currency() {
        assert_eq!(parse_price("12,499"), Some(12499.0));
        assert_eq!(parse_price("$8,999"), Some(8999.0));
        assert_eq!(parse_price(" 1,234,567 "), Some(1234567.0));
        assert_eq!(parse_price("499.50"), Some(499.5));
    }

    #[test]
    fn test_parse_price_unsupported_formats_are_missing() {
        // Other locales are an explicit unsupported-format case
        assert_eq!(parse_price("1.234.567,89"), None);
        assert_eq!(parse_price("€1200"), None);
        assert_eq!(parse_price("gratis"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("  "), None);
    }
}
