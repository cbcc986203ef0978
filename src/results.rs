use serde::{Deserialize, Serialize};

/// One result from a listing search page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingItem {
    /// Product title as shown in the grid
    pub title: String,

    /// Parsed numeric price
    pub price: f64,

    /// Absolute link to the product page
    pub link: String,
}

/// Title and price scraped from a single product page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub title: String,
    pub price: f64,
}

/// A single user review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Sequential id starting at 1, in discovery order
    pub id: u32,

    /// Trimmed review text
    pub comment: String,
}

/// All reviews collected for one product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductReviews {
    pub product_title: String,
    pub reviews: Vec<Review>,
}

/// One row of the product feature table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub feature: String,
    pub value: String,
}

/// Full detail view of a product page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetails {
    pub title: String,

    /// Absent when the price node is missing or unparseable
    pub price: Option<f64>,

    /// Absent when the page carries no description block
    pub description: Option<String>,

    /// Feature rows in table order; a row missing a cell keeps an empty
    /// string in that cell rather than being dropped
    pub features: Vec<FeatureRow>,
}

/// Build the ordered review sequence from raw comment texts.
///
/// Null comments are dropped, surviving comments are trimmed and numbered
/// from 1 in discovery order. Duplicate comment texts are kept as-is.
pub fn shape_reviews(raw: Vec<Option<String>>) -> Vec<Review> {
    raw.into_iter()
        .flatten()
        .map(|c| c.trim().to_string())
        .enumerate()
        .map(|(i, comment)| Review {
            id: (i + 1) as u32,
            comment,
        })
        .collect()
}
