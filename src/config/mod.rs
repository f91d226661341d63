use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub webdriver: WebDriverConfig,
    pub output: OutputConfig,
}

/// Listing retrieval configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the paginated listing, joined onto `base_url`.
    #[serde(default = "default_listing_path")]
    pub listing_path: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Browser session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebDriverConfig {
    #[serde(default = "default_webdriver_url")]
    pub url: String,

    /// Cap on re-clicking a swatch whose click keeps getting intercepted.
    #[serde(default = "default_max_click_attempts")]
    pub max_click_attempts: u32,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://webscraper.io/".to_string()
}
fn default_listing_path() -> String {
    "test-sites/e-commerce/static/computers/laptops".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_request_delay_ms() -> u64 {
    300
}
fn default_jitter_ms() -> u64 {
    200
}
fn default_max_retries() -> u32 {
    3
}
fn default_user_agent() -> String {
    "laptops-etl/0.1 (catalogue snapshot tool)".to_string()
}
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}
fn default_max_click_attempts() -> u32 {
    25
}
fn default_csv_path() -> PathBuf {
    PathBuf::from("products.csv")
}
fn default_log_path() -> PathBuf {
    PathBuf::from("parser.log")
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("LAPTOPS").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|_| AppConfig::default());
        Ok(app_cfg)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig {
                base_url: default_base_url(),
                listing_path: default_listing_path(),
                timeout_secs: default_timeout_secs(),
                request_delay_ms: default_request_delay_ms(),
                jitter_ms: default_jitter_ms(),
                max_retries: default_max_retries(),
                user_agent: default_user_agent(),
            },
            webdriver: WebDriverConfig {
                url: default_webdriver_url(),
                max_click_attempts: default_max_click_attempts(),
            },
            output: OutputConfig {
                csv_path: default_csv_path(),
                log_path: default_log_path(),
            },
        }
    }
}
