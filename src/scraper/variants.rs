//! Browser-driven variant price resolution.
//!
//! Per-configuration prices never appear in the static listing markup; they
//! render only after a swatch on the detail page is clicked. The resolver
//! drives a WebDriver session through each enabled swatch and records the
//! price shown for it.

use crate::scraper::parsers::parse_price;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::{Client, Locator};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

const SWATCH_PANEL: &str = ".swatches";
const PRICE: &str = ".price";

#[derive(Debug, Error)]
pub enum VariantError {
    #[error("no swatch panel found on {url}")]
    MissingPanel { url: String },
    #[error("click on swatch {label:?} still intercepted after {attempts} attempts")]
    ClickRetriesExhausted { label: String, attempts: u32 },
}

/// One selectable configuration control on a detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct SwatchOption {
    pub label: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    Clicked,
    /// An overlapping element swallowed the click. Transient; retry.
    Intercepted,
}

/// The browser operations the resolver consumes: navigate, enumerate the
/// swatch controls, select one, read the displayed price. Keeping this a
/// trait keeps the retry/skip logic testable without a live session.
#[async_trait]
pub trait ProductPage: Send {
    async fn open(&mut self, url: &str) -> Result<()>;
    /// All swatch options in control order. Fails with
    /// `VariantError::MissingPanel` when the container is absent.
    async fn swatch_options(&mut self) -> Result<Vec<SwatchOption>>;
    async fn select_swatch(&mut self, label: &str) -> Result<ClickOutcome>;
    async fn displayed_price(&mut self) -> Result<String>;
}

/// Resolve the configuration → price mapping for one product.
///
/// Disabled swatches are omitted entirely, not recorded as null or zero.
/// The session is left on the detail page; callers must not assume it still
/// shows the listing.
pub async fn resolve_hdd_prices<P: ProductPage + ?Sized>(
    page: &mut P,
    url: &str,
    max_click_attempts: u32,
) -> Result<BTreeMap<String, f64>> {
    page.open(url)
        .await
        .with_context(|| format!("navigate to {url}"))?;

    let mut prices = BTreeMap::new();

    for option in page.swatch_options().await? {
        if option.disabled {
            debug!("Swatch {:?} disabled — skipping", option.label);
            continue;
        }

        select_with_retry(page, &option.label, max_click_attempts).await?;

        let text = page.displayed_price().await?;
        let price = parse_price(&text)
            .with_context(|| format!("price shown after selecting {:?}", option.label))?;
        prices.insert(option.label, price);
    }

    Ok(prices)
}

/// Repeat an intercepted click against the same swatch, up to the attempt
/// cap. Anything other than an interception propagates immediately.
async fn select_with_retry<P: ProductPage + ?Sized>(
    page: &mut P,
    label: &str,
    max_attempts: u32,
) -> Result<()> {
    for attempt in 1..=max_attempts {
        match page.select_swatch(label).await? {
            ClickOutcome::Clicked => return Ok(()),
            ClickOutcome::Intercepted => {
                debug!("Click on swatch {:?} intercepted (attempt {})", label, attempt);
            }
        }
    }

    Err(VariantError::ClickRetriesExhausted {
        label: label.to_string(),
        attempts: max_attempts,
    }
    .into())
}

// ── WebDriver implementation ──────────────────────────────────────────────────

pub struct WebDriverPage<'a> {
    client: &'a Client,
    current_url: String,
}

impl<'a> WebDriverPage<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            current_url: String::new(),
        }
    }
}

#[async_trait]
impl ProductPage for WebDriverPage<'_> {
    async fn open(&mut self, url: &str) -> Result<()> {
        self.client
            .goto(url)
            .await
            .with_context(|| format!("WebDriver navigation to {url}"))?;
        self.current_url = url.to_string();
        Ok(())
    }

    async fn swatch_options(&mut self) -> Result<Vec<SwatchOption>> {
        let panel = match self.client.find(Locator::Css(SWATCH_PANEL)).await {
            Ok(panel) => panel,
            Err(e) if e.is_no_such_element() => {
                return Err(VariantError::MissingPanel {
                    url: self.current_url.clone(),
                }
                .into());
            }
            Err(e) => return Err(e).context("locating swatch panel"),
        };

        let mut options = Vec::new();
        for button in panel.find_all(Locator::Css("button")).await? {
            let label = button
                .prop("value")
                .await?
                .with_context(|| format!("swatch button without a value on {}", self.current_url))?;
            let disabled = button.attr("disabled").await?.is_some();
            options.push(SwatchOption { label, disabled });
        }
        Ok(options)
    }

    async fn select_swatch(&mut self, label: &str) -> Result<ClickOutcome> {
        // Labels are site-controlled text; match on the value property
        // instead of interpolating them into a CSS selector.
        let panel = self
            .client
            .find(Locator::Css(SWATCH_PANEL))
            .await
            .context("swatch panel disappeared")?;

        let mut target = None;
        for button in panel.find_all(Locator::Css("button")).await? {
            if button.prop("value").await?.as_deref() == Some(label) {
                target = Some(button);
                break;
            }
        }
        let button = target.with_context(|| format!("swatch {label:?} no longer present"))?;

        match button.click().await {
            Ok(()) => Ok(ClickOutcome::Clicked),
            Err(CmdError::Standard(w)) if w.error == ErrorStatus::ElementClickIntercepted => {
                Ok(ClickOutcome::Intercepted)
            }
            Err(e) => Err(e).with_context(|| format!("clicking swatch {label:?}")),
        }
    }

    async fn displayed_price(&mut self) -> Result<String> {
        let el = self
            .client
            .find(Locator::Css(PRICE))
            .await
            .context("no price element after selecting a swatch")?;
        Ok(el.text().await?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
