//! Live spot-table abstractions

use anyhow::Result;
use async_trait::async_trait;

/// A single row parsed from the live price table.
///
/// The label is free text from the page with the unit suffix stripped; it is
/// only canonicalized to a [`crate::core::Metal`] at resolution time. The
/// price is already converted to USD per gram.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotQuote {
    pub label: String,
    pub price_per_gram: f64,
}

#[async_trait]
pub trait SpotPriceProvider: Send + Sync {
    async fn fetch_spot(&self) -> Result<Vec<SpotQuote>>;
}
