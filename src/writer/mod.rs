//! CSV output for the scraped catalogue.

use crate::models::{Product, PRODUCT_FIELDS};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Write the whole collection to `path`, replacing any previous run's file.
///
/// Header and columns follow `PRODUCT_FIELDS` exactly. This runs only after
/// a fully successful walk, so a failed run never leaves a partial file.
pub fn write_products(path: &Path, products: &[Product]) -> Result<usize> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Could not create {:?}", path))?;

    writer.write_record(PRODUCT_FIELDS)?;
    for product in products {
        writer.write_record(product.to_record())?;
    }
    writer.flush().context("Flushing CSV output")?;

    info!("Wrote {} products to {:?}", products.len(), path);
    Ok(products.len())
}
