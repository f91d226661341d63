pub mod http_client;
pub mod parsers;
pub mod variants;

use crate::config::ScraperConfig;
use crate::models::{AdditionalInfo, Product, ProductCard};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;
use url::Url;

use self::http_client::HttpClient;
use self::parsers::{parse_listing_page, resolve_page_count};
use self::variants::{resolve_hdd_prices, ProductPage};

// ── Fetch seam ────────────────────────────────────────────────────────────────

/// Retrieval channel for listing pages, swappable for fixtures in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<String>;
}

/// HTTP-backed listing retrieval. Deliberately independent of the WebDriver
/// session, which the variant resolver leaves parked on detail pages.
pub struct ListingFetcher {
    client: HttpClient,
    listing_url: Url,
}

impl ListingFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .with_context(|| format!("Bad base URL {:?}", config.base_url))?;
        let listing_url = base
            .join(&config.listing_path)
            .with_context(|| format!("Bad listing path {:?}", config.listing_path))?;

        Ok(Self {
            client: HttpClient::new(config)?,
            listing_url,
        })
    }
}

#[async_trait]
impl PageFetcher for ListingFetcher {
    async fn fetch_page(&self, page: u32) -> Result<String> {
        let url = if page <= 1 {
            self.listing_url.clone()
        } else {
            let mut url = self.listing_url.clone();
            url.query_pairs_mut().append_pair("page", &page.to_string());
            url
        };

        self.client
            .get_text(url.as_str())
            .await
            .with_context(|| format!("Failed to fetch listing page {}", page))
    }
}

// ── Listing walker ────────────────────────────────────────────────────────────

/// Walks the paginated listing into one ordered product collection:
/// page 1 decides the page count, pages come in ascending order, cards in
/// document order, and every card is enriched with its variant prices
/// before the next page is fetched.
pub struct ListingWalker<F> {
    fetcher: F,
    base_url: Url,
    max_click_attempts: u32,
}

impl<F: PageFetcher> ListingWalker<F> {
    pub fn new(fetcher: F, base_url: Url, max_click_attempts: u32) -> Self {
        Self {
            fetcher,
            base_url,
            max_click_attempts,
        }
    }

    /// The complete catalogue. Fail-fast: the first card or variant failure
    /// aborts the walk with context naming the page.
    pub async fn collect_products<P: ProductPage + ?Sized>(
        &self,
        session: &mut P,
    ) -> Result<Vec<Product>> {
        info!("Start parsing the laptop listing");

        let html = self.fetcher.fetch_page(1).await?;
        let total_pages = resolve_page_count(&html);
        info!("Listing spans {} page(s)", total_pages);

        let mut products = Vec::new();
        self.extract_page(1, &html, session, &mut products).await?;

        for page in 2..=total_pages {
            let html = self.fetcher.fetch_page(page).await?;
            self.extract_page(page, &html, session, &mut products)
                .await?;
        }

        info!("Collected {} products", products.len());
        Ok(products)
    }

    async fn extract_page<P: ProductPage + ?Sized>(
        &self,
        page: u32,
        html: &str,
        session: &mut P,
        out: &mut Vec<Product>,
    ) -> Result<()> {
        info!("Parsing page {}", page);

        let cards = parse_listing_page(html).with_context(|| format!("listing page {}", page))?;
        for card in cards {
            let product = self
                .enrich(card, session)
                .await
                .with_context(|| format!("product on page {}", page))?;
            out.push(product);
        }
        Ok(())
    }

    async fn enrich<P: ProductPage + ?Sized>(
        &self,
        card: ProductCard,
        session: &mut P,
    ) -> Result<Product> {
        let url = self
            .base_url
            .join(&card.href)
            .with_context(|| format!("bad href {:?} on card {:?}", card.href, card.title))?;

        let hdd_prices = resolve_hdd_prices(session, url.as_str(), self.max_click_attempts)
            .await
            .with_context(|| format!("variant prices for {:?}", card.title))?;

        Ok(Product {
            title: card.title,
            description: card.description,
            price: card.price,
            rating: card.rating,
            num_of_reviews: card.num_of_reviews,
            additional_info: AdditionalInfo { hdd_prices },
            url: url.into(),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::variants::{ClickOutcome, SwatchOption};
    use super::*;
    use std::sync::Mutex;

    struct StubFetcher {
        pages: Vec<String>,
        fetched: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch_page(&self, page: u32) -> Result<String> {
            self.fetched.lock().unwrap().push(page);
            Ok(self.pages[(page - 1) as usize].clone())
        }
    }

    struct StubSession {
        opened: Vec<String>,
    }

    #[async_trait]
    impl ProductPage for StubSession {
        async fn open(&mut self, url: &str) -> Result<()> {
            self.opened.push(url.to_string());
            Ok(())
        }

        async fn swatch_options(&mut self) -> Result<Vec<SwatchOption>> {
            Ok(vec![SwatchOption {
                label: "128".into(),
                disabled: false,
            }])
        }

        async fn select_swatch(&mut self, _label: &str) -> Result<ClickOutcome> {
            Ok(ClickOutcome::Clicked)
        }

        async fn displayed_price(&mut self) -> Result<String> {
            Ok("$416.99".into())
        }
    }

    fn card(title: &str, id: u32) -> String {
        format!(
            r#"<div class="thumbnail">
                <h4 class="pull-right price">$99.99</h4>
                <h4><a href="/product/{id}" class="title" title="{title}">{title}</a></h4>
                <p class="description">desc</p>
                <div class="ratings">
                    <p class="pull-right">7 reviews</p>
                    <p data-rating="4"></p>
                </div>
            </div>"#
        )
    }

    fn pagination(total: u32) -> String {
        let mut items: String = (1..=total).map(|n| format!("<li><a>{n}</a></li>")).collect();
        items.push_str("<li><a>\u{bb}</a></li>");
        format!(r#"<ul class="pagination">{items}</ul>"#)
    }

    fn walker(pages: Vec<String>) -> ListingWalker<StubFetcher> {
        let fetcher = StubFetcher {
            pages,
            fetched: Mutex::new(Vec::new()),
        };
        ListingWalker::new(fetcher, Url::parse("https://example.com/").unwrap(), 5)
    }

    #[tokio::test]
    async fn walks_every_declared_page_in_order() {
        let pages = vec![
            format!("<body>{}{}{}</body>", card("A", 1), card("B", 2), pagination(3)),
            format!("<body>{}{}</body>", card("C", 3), pagination(3)),
            format!("<body>{}{}</body>", card("D", 4), pagination(3)),
        ];
        let walker = walker(pages);
        let mut session = StubSession { opened: Vec::new() };

        let products = walker.collect_products(&mut session).await.unwrap();

        assert_eq!(walker.fetcher.fetched.lock().unwrap().as_slice(), &[1, 2, 3]);
        let titles: Vec<_> = products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C", "D"]);
        // Detail URLs are absolute and visited in the same order.
        assert_eq!(products[0].url, "https://example.com/product/1");
        assert_eq!(session.opened.len(), 4);
        assert_eq!(products[0].additional_info.hdd_prices["128"], 416.99);
    }

    #[tokio::test]
    async fn listing_without_pagination_is_a_single_fetch() {
        let walker = walker(vec![format!("<body>{}</body>", card("Solo", 9))]);
        let mut session = StubSession { opened: Vec::new() };

        let products = walker.collect_products(&mut session).await.unwrap();

        assert_eq!(walker.fetcher.fetched.lock().unwrap().as_slice(), &[1]);
        assert_eq!(products.len(), 1);
    }

    #[tokio::test]
    async fn broken_card_aborts_the_whole_walk() {
        let broken = card("Broken", 5).replace(r#" data-rating="4""#, "");
        let pages = vec![
            format!("<body>{}{}</body>", card("A", 1), pagination(2)),
            format!("<body>{}{}</body>", broken, pagination(2)),
        ];
        let walker = walker(pages);
        let mut session = StubSession { opened: Vec::new() };

        let err = walker.collect_products(&mut session).await.unwrap_err();

        assert!(format!("{err:#}").contains("listing page 2"));
        // Page 2 was reached, but nothing past the failure.
        assert_eq!(walker.fetcher.fetched.lock().unwrap().as_slice(), &[1, 2]);
    }
}
