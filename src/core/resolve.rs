//! Price resolution: merge the two sources into one trusted price per metal

use crate::core::history::HistoricalSeries;
use crate::core::metal::{GRAMS_PER_TROY_OUNCE, Metal};
use crate::core::spot::SpotQuote;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Live,
    HistoricalFallback,
    Unavailable,
}

impl Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PriceSource::Live => "live",
                PriceSource::HistoricalFallback => "historical",
                PriceSource::Unavailable => "unavailable",
            }
        )
    }
}

/// The final USD-per-gram price for one metal in one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPrice {
    pub metal: Metal,
    pub price_per_gram: f64,
    pub source: PriceSource,
}

impl ResolvedPrice {
    pub fn is_available(&self) -> bool {
        self.source != PriceSource::Unavailable
    }
}

/// Resolves one price per requested metal.
///
/// Per metal: a spot quote whose label canonicalizes to the metal wins
/// (already per gram); otherwise the most recent historical close converted
/// from the per-ounce quote; otherwise the metal is marked unavailable with
/// a zero price. Pure function of its inputs.
pub fn resolve_prices(
    metals: &[Metal],
    spot: &[SpotQuote],
    histories: &HashMap<Metal, HistoricalSeries>,
) -> BTreeMap<Metal, ResolvedPrice> {
    metals
        .iter()
        .map(|&metal| {
            let live = spot
                .iter()
                .find(|quote| Metal::from_label(&quote.label) == Some(metal));

            let resolved = if let Some(quote) = live {
                ResolvedPrice {
                    metal,
                    price_per_gram: quote.price_per_gram,
                    source: PriceSource::Live,
                }
            } else if let Some(close) = histories.get(&metal).and_then(|h| h.latest_close()) {
                ResolvedPrice {
                    metal,
                    price_per_gram: close / GRAMS_PER_TROY_OUNCE,
                    source: PriceSource::HistoricalFallback,
                }
            } else {
                ResolvedPrice {
                    metal,
                    price_per_gram: 0.0,
                    source: PriceSource::Unavailable,
                }
            };
            (metal, resolved)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn quote(label: &str, price_per_gram: f64) -> SpotQuote {
        SpotQuote {
            label: label.to_string(),
            price_per_gram,
        }
    }

    fn series(ticker: &str, closes: &[f64]) -> HistoricalSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        HistoricalSeries::new(
            ticker,
            closes
                .iter()
                .enumerate()
                .map(|(i, close)| (start + chrono::Duration::days(i as i64), *close))
                .collect(),
        )
    }

    #[test]
    fn test_live_quote_wins_over_history() {
        let spot = vec![quote("Gold", 65.0)];
        let histories = HashMap::from([(Metal::Gold, series("GC=F", &[1850.0]))]);

        let resolved = resolve_prices(&[Metal::Gold], &spot, &histories);
        let gold = &resolved[&Metal::Gold];
        assert_eq!(gold.source, PriceSource::Live);
        assert_eq!(gold.price_per_gram, 65.0);
    }

    #[test]
    fn test_live_label_matching_is_case_insensitive() {
        let spot = vec![quote("GOLD", 64.0), quote(" silver ", 0.8)];

        let resolved = resolve_prices(&[Metal::Gold, Metal::Silver], &spot, &HashMap::new());
        assert_eq!(resolved[&Metal::Gold].source, PriceSource::Live);
        assert_eq!(resolved[&Metal::Silver].source, PriceSource::Live);
        assert_eq!(resolved[&Metal::Silver].price_per_gram, 0.8);
    }

    #[test]
    fn test_falls_back_to_latest_historical_close() {
        let histories = HashMap::from([(Metal::Gold, series("GC=F", &[1800.0, 1850.0]))]);

        let resolved = resolve_prices(&[Metal::Gold], &[], &histories);
        let gold = &resolved[&Metal::Gold];
        assert_eq!(gold.source, PriceSource::HistoricalFallback);
        assert!((gold.price_per_gram - 1850.0 / GRAMS_PER_TROY_OUNCE).abs() < 1e-9);
    }

    #[test]
    fn test_empty_history_does_not_count_as_fallback() {
        let histories = HashMap::from([(Metal::Palladium, HistoricalSeries::empty("PA=F"))]);

        let resolved = resolve_prices(&[Metal::Palladium], &[], &histories);
        let palladium = &resolved[&Metal::Palladium];
        assert_eq!(palladium.source, PriceSource::Unavailable);
        assert_eq!(palladium.price_per_gram, 0.0);
        assert!(!palladium.is_available());
    }

    #[test]
    fn test_one_resolved_price_per_requested_metal() {
        let spot = vec![quote("Gold", 65.0), quote("Rhodium", 150.0)];
        let histories = HashMap::from([(Metal::Silver, series("SI=F", &[22.4]))]);

        let resolved = resolve_prices(&Metal::ALL, &spot, &histories);
        assert_eq!(resolved.len(), Metal::ALL.len());
        assert_eq!(resolved[&Metal::Gold].source, PriceSource::Live);
        assert_eq!(resolved[&Metal::Silver].source, PriceSource::HistoricalFallback);
        assert_eq!(resolved[&Metal::Platinum].source, PriceSource::Unavailable);
        assert_eq!(resolved[&Metal::Palladium].source, PriceSource::Unavailable);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let spot = vec![quote("Silver", 0.85)];
        let histories = HashMap::from([(Metal::Gold, series("GC=F", &[1850.0]))]);

        let first = resolve_prices(&Metal::ALL, &spot, &histories);
        let second = resolve_prices(&Metal::ALL, &spot, &histories);
        assert_eq!(first, second);
    }
}
