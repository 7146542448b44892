//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod history;
pub mod log;
pub mod metal;
pub mod resolve;
pub mod spot;
pub mod valuation;

// Re-export main types for cleaner imports
pub use history::{HistoricalSeries, HistoryProvider};
pub use metal::{GRAMS_PER_TROY_OUNCE, Metal};
pub use resolve::{PriceSource, ResolvedPrice, resolve_prices};
pub use spot::{SpotPriceProvider, SpotQuote};
pub use valuation::{Valuation, appraise};
