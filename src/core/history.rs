//! Historical close-price series

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One year of daily closes for a ticker, ascending by date.
///
/// Immutable once fetched. An empty series is the degraded form every
/// provider failure collapses into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub ticker: String,
    pub daily_closes: Vec<(NaiveDate, f64)>,
}

impl HistoricalSeries {
    pub fn new(ticker: &str, mut daily_closes: Vec<(NaiveDate, f64)>) -> Self {
        daily_closes.sort_by_key(|(date, _)| *date);
        daily_closes.dedup_by_key(|(date, _)| *date);
        Self {
            ticker: ticker.to_string(),
            daily_closes,
        }
    }

    pub fn empty(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            daily_closes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.daily_closes.is_empty()
    }

    /// Most recent close, per ounce as quoted by the provider.
    pub fn latest_close(&self) -> Option<f64> {
        self.daily_closes.last().map(|(_, close)| *close)
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.daily_closes.last().map(|(date, _)| *date)
    }

    /// Percent change from the close nearest to `days` ago to the latest close.
    pub fn change_over(&self, days: i64) -> Option<f64> {
        let (latest_date, latest_close) = self.daily_closes.last()?;
        let target = *latest_date - chrono::Duration::days(days);
        let (_, reference) = self
            .daily_closes
            .iter()
            .find(|(date, _)| *date >= target)?;
        if *reference <= 0.0 {
            return None;
        }
        Some(((latest_close - reference) / reference) * 100.0)
    }

    pub fn high(&self) -> Option<f64> {
        self.daily_closes
            .iter()
            .map(|(_, close)| *close)
            .fold(None, |acc, c| Some(acc.map_or(c, |a: f64| a.max(c))))
    }

    pub fn low(&self) -> Option<f64> {
        self.daily_closes
            .iter()
            .map(|(_, close)| *close)
            .fold(None, |acc, c| Some(acc.map_or(c, |a: f64| a.min(c))))
    }
}

#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn fetch_history(&self, ticker: &str) -> Result<HistoricalSeries>;
}
