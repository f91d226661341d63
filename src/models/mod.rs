use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Product record ────────────────────────────────────────────────────────────

/// One laptop from the catalogue listing.
///
/// Field order doubles as the CSV column order — `PRODUCT_FIELDS` and
/// `to_record` must stay in sync with it. Reordering fields is a breaking
/// change for anything consuming `products.csv`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub rating: u8,
    pub num_of_reviews: u32,
    pub additional_info: AdditionalInfo,
    pub url: String,
}

/// CSV header, in declaration order of `Product`.
pub const PRODUCT_FIELDS: [&str; 7] = [
    "title",
    "description",
    "price",
    "rating",
    "num_of_reviews",
    "additional_info",
    "url",
];

/// Per-configuration data discovered on the detail page.
///
/// `hdd_prices` maps a swatch label ("128", "256", …) to the price shown
/// after selecting it. Disabled swatches never appear. BTreeMap keeps the
/// serialized cell stable across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdditionalInfo {
    pub hdd_prices: BTreeMap<String, f64>,
}

impl AdditionalInfo {
    /// Text rendering used for the single CSV cell.
    pub fn render(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Product {
    /// One CSV row, columns matching `PRODUCT_FIELDS`.
    pub fn to_record(&self) -> [String; 7] {
        [
            self.title.clone(),
            self.description.clone(),
            self.price.to_string(),
            self.rating.to_string(),
            self.num_of_reviews.to_string(),
            self.additional_info.render(),
            self.url.clone(),
        ]
    }
}

// ── Raw listing card ──────────────────────────────────────────────────────────

/// What the static listing markup yields for one card, before the detail
/// page has been visited. `href` is page-relative.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub rating: u8,
    pub num_of_reviews: u32,
    pub href: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_matches_declared_column_order() {
        let product = Product {
            title: "Asus VivoBook".into(),
            description: "14 inch".into(),
            price: 295.99,
            rating: 3,
            num_of_reviews: 14,
            additional_info: AdditionalInfo::default(),
            url: "https://webscraper.io/test-sites/e-commerce/static/product/31".into(),
        };
        let record = product.to_record();
        assert_eq!(record.len(), PRODUCT_FIELDS.len());
        assert_eq!(record[0], "Asus VivoBook");
        assert_eq!(record[2], "295.99");
        assert_eq!(record[4], "14");
    }

    #[test]
    fn additional_info_renders_sorted_labels() {
        let mut info = AdditionalInfo::default();
        info.hdd_prices.insert("512".into(), 499.99);
        info.hdd_prices.insert("128".into(), 416.99);
        assert_eq!(info.render(), r#"{"hdd_prices":{"128":416.99,"512":499.99}}"#);
    }
}
