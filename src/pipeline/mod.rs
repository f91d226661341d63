//! Pipeline orchestrator: ties the listing walk, the browser session and
//! the CSV writer together.
//!
//! `run()` is strictly sequential: one listing page at a time, one product
//! at a time, one swatch at a time. The WebDriver session is acquired here,
//! lent to the walk, and closed on every path — including a failed walk —
//! before the result propagates. The CSV is written only after the whole
//! walk succeeded, so a failing run leaves no partial output file.

use crate::config::AppConfig;
use crate::scraper::variants::{ProductPage, WebDriverPage};
use crate::scraper::{ListingFetcher, ListingWalker, PageFetcher};
use crate::writer::write_products;
use anyhow::{Context, Result};
use fantoccini::ClientBuilder;
use std::path::Path;
use tracing::{info, warn};
use url::Url;

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<PipelineStats> {
        let fetcher = ListingFetcher::new(&self.config.scraper)
            .context("Failed to build listing fetcher")?;
        let base_url = Url::parse(&self.config.scraper.base_url)
            .context("Bad base URL in configuration")?;
        let walker = ListingWalker::new(
            fetcher,
            base_url,
            self.config.webdriver.max_click_attempts,
        );

        info!("Connecting to WebDriver at {}", self.config.webdriver.url);
        let client = ClientBuilder::native()
            .connect(&self.config.webdriver.url)
            .await
            .with_context(|| {
                format!("Failed to connect to WebDriver at {}", self.config.webdriver.url)
            })?;

        let result = {
            let mut session = WebDriverPage::new(&client);
            scrape_to_csv(&walker, &mut session, &self.config.output.csv_path).await
        };

        if let Err(e) = client.close().await {
            warn!("Closing WebDriver session: {}", e);
        }

        result
    }
}

/// Walk the whole listing, then write the CSV — in that order. A failed
/// walk returns before the output path is touched, so no partial file can
/// appear.
async fn scrape_to_csv<F, P>(
    walker: &ListingWalker<F>,
    session: &mut P,
    csv_path: &Path,
) -> Result<PipelineStats>
where
    F: PageFetcher,
    P: ProductPage + ?Sized,
{
    let products = walker.collect_products(session).await?;

    let variant_prices = products
        .iter()
        .map(|p| p.additional_info.hdd_prices.len())
        .sum();
    let products_written = write_products(csv_path, &products)?;

    Ok(PipelineStats {
        products_written,
        variant_prices,
    })
}

#[derive(Debug)]
pub struct PipelineStats {
    pub products_written: usize,
    pub variant_prices: usize,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
