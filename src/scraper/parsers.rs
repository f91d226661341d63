//! Static-markup extraction: pagination bound and product cards.

use crate::models::ProductCard;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::warn;

// ── Selectors ─────────────────────────────────────────────────────────────────

mod sel {
    use super::*;

    pub static THUMBNAIL: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".thumbnail").unwrap());
    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".title").unwrap());
    pub static DESCRIPTION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".description").unwrap());
    pub static PRICE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".price").unwrap());
    pub static RATING: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("[data-rating]").unwrap());
    pub static REVIEWS: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".ratings > p.pull-right").unwrap());
    pub static PAGINATION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".pagination").unwrap());
    pub static PAGE_ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("product card is missing its `{0}` anchor")]
    MissingAnchor(&'static str),
    #[error("could not parse {field} from {text:?}")]
    InvalidNumber { field: &'static str, text: String },
}

// ── Pagination resolver ───────────────────────────────────────────────────────

/// Total page count declared by the first listing page.
///
/// No pagination control means a single page. Otherwise the total is the
/// numeric label of the second-to-last item — the last one is the "next"
/// arrow, not a page number. A control that is present but unreadable
/// degrades to 1 page; pages beyond the first are then skipped, which the
/// run log makes visible.
pub fn resolve_page_count(html: &str) -> u32 {
    let doc = Html::parse_document(html);

    let Some(pagination) = doc.select(&sel::PAGINATION).next() else {
        return 1;
    };

    let items: Vec<ElementRef> = pagination.select(&sel::PAGE_ITEM).collect();
    let total = items
        .len()
        .checked_sub(2)
        .and_then(|i| items.get(i))
        .map(|li| element_text(*li))
        .and_then(|label| label.trim().parse::<u32>().ok())
        .filter(|n| *n >= 1);

    match total {
        Some(n) => n,
        None => {
            warn!("Pagination control present but unreadable — assuming a single page");
            1
        }
    }
}

// ── Product card extractor ────────────────────────────────────────────────────

/// All product cards on one listing page, in document order.
pub fn parse_listing_page(html: &str) -> Result<Vec<ProductCard>, ParseError> {
    let doc = Html::parse_document(html);
    doc.select(&sel::THUMBNAIL).map(parse_product_card).collect()
}

/// One `.thumbnail` fragment → `ProductCard`. Pure transform; any missing
/// anchor fails this card rather than yielding a partial record.
pub fn parse_product_card(card: ElementRef) -> Result<ProductCard, ParseError> {
    let title_el = card
        .select(&sel::TITLE)
        .next()
        .ok_or(ParseError::MissingAnchor(".title"))?;

    // The `title` attribute carries the full name; the visible text is
    // truncated with an ellipsis on narrow cards.
    let title = title_el
        .value()
        .attr("title")
        .ok_or(ParseError::MissingAnchor(".title[title]"))?
        .to_string();

    let href = title_el
        .value()
        .attr("href")
        .ok_or(ParseError::MissingAnchor(".title[href]"))?
        .to_string();

    let description = card
        .select(&sel::DESCRIPTION)
        .next()
        .map(element_text)
        .ok_or(ParseError::MissingAnchor(".description"))?;

    let price_text = card
        .select(&sel::PRICE)
        .next()
        .map(element_text)
        .ok_or(ParseError::MissingAnchor(".price"))?;
    let price = parse_price(&price_text)?;

    let rating_text = card
        .select(&sel::RATING)
        .next()
        .and_then(|el| el.value().attr("data-rating"))
        .ok_or(ParseError::MissingAnchor("[data-rating]"))?;
    let rating = rating_text
        .parse()
        .map_err(|_| ParseError::InvalidNumber {
            field: "rating",
            text: rating_text.to_string(),
        })?;

    let reviews_text = card
        .select(&sel::REVIEWS)
        .next()
        .map(element_text)
        .ok_or(ParseError::MissingAnchor(".ratings > p.pull-right"))?;
    let num_of_reviews = reviews_text
        .split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| ParseError::InvalidNumber {
            field: "num_of_reviews",
            text: reviews_text.clone(),
        })?;

    Ok(ProductCard {
        title,
        description,
        price,
        rating,
        num_of_reviews,
        href,
    })
}

/// Parse a displayed price: leading currency symbol stripped, the rest must
/// be a plain decimal. Thousands separators are not tolerated.
pub fn parse_price(text: &str) -> Result<f64, ParseError> {
    let digits = text.strip_prefix('$').unwrap_or(text);
    digits.parse().map_err(|_| ParseError::InvalidNumber {
        field: "price",
        text: text.to_string(),
    })
}

fn element_text(el: ElementRef) -> String {
    el.text().collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = r#"
        <div class="thumbnail">
            <h4 class="pull-right price">$999.99</h4>
            <h4><a href="/test-sites/e-commerce/static/product/31" class="title"
                   title="Asus VivoBook X441NA-GA190">Asus VivoBook X4...</a></h4>
            <p class="description">Asus VivoBook X441NA-GA190, 14", Celeron N3450, 4GB</p>
            <div class="ratings">
                <p class="pull-right">7 reviews</p>
                <p data-rating="3"></p>
            </div>
        </div>"#;

    fn single_card(html: &str) -> Result<ProductCard, ParseError> {
        let doc = Html::parse_document(html);
        let card = doc.select(&sel::THUMBNAIL).next().expect("fixture card");
        parse_product_card(card)
    }

    #[test]
    fn card_fields_extracted() {
        let card = single_card(CARD).unwrap();
        // Full title from the attribute, not the ellipsised anchor text.
        assert_eq!(card.title, "Asus VivoBook X441NA-GA190");
        assert_eq!(card.description, "Asus VivoBook X441NA-GA190, 14\", Celeron N3450, 4GB");
        assert_eq!(card.price, 999.99);
        assert_eq!(card.rating, 3);
        assert_eq!(card.num_of_reviews, 7);
        assert_eq!(card.href, "/test-sites/e-commerce/static/product/31");
    }

    #[test]
    fn price_with_thousands_separator_is_rejected() {
        assert_eq!(parse_price("$999.99"), Ok(999.99));
        assert!(matches!(
            parse_price("$1,099.99"),
            Err(ParseError::InvalidNumber { field: "price", .. })
        ));
    }

    #[test]
    fn missing_rating_is_a_hard_failure() {
        let html = CARD.replace(r#" data-rating="3""#, "");
        assert_eq!(
            single_card(&html),
            Err(ParseError::MissingAnchor("[data-rating]"))
        );
    }

    #[test]
    fn missing_title_anchor_is_a_hard_failure() {
        let html = CARD.replace("class=\"title\"", "class=\"name\"");
        assert_eq!(single_card(&html), Err(ParseError::MissingAnchor(".title")));
    }

    #[test]
    fn listing_page_preserves_document_order() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            CARD,
            CARD.replace("Asus VivoBook X441NA-GA190", "Lenovo V110")
        );
        let cards = parse_listing_page(&html).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].title, "Asus VivoBook X441NA-GA190");
        assert_eq!(cards[1].title, "Lenovo V110");
    }

    #[test]
    fn page_count_defaults_to_one_without_pagination() {
        assert_eq!(resolve_page_count("<html><body></body></html>"), 1);
    }

    #[test]
    fn page_count_reads_second_to_last_item() {
        let html = r#"
            <ul class="pagination">
                <li><a>1</a></li>
                <li><a>2</a></li>
                <li><a rel="next">»</a></li>
            </ul>"#;
        assert_eq!(resolve_page_count(html), 2);
    }

    #[test]
    fn unreadable_pagination_degrades_to_one_page() {
        let html = r#"<ul class="pagination"><li><a>»</a></li></ul>"#;
        assert_eq!(resolve_page_count(html), 1);

        let html = r#"<ul class="pagination"><li><a>next</a></li><li><a>prev</a></li></ul>"#;
        assert_eq!(resolve_page_count(html), 1);
    }
}
