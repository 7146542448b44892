//! One dashboard refresh: fetch both sources, degrade softly, resolve.

use crate::core::config::AppConfig;
use crate::core::history::{HistoricalSeries, HistoryProvider};
use crate::core::metal::Metal;
use crate::core::resolve::{ResolvedPrice, resolve_prices};
use crate::core::spot::SpotPriceProvider;
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Everything one refresh produces. Nothing here is mutated after creation
/// and nothing outlives the view render.
#[derive(Debug)]
pub struct MarketSnapshot {
    pub resolved: BTreeMap<Metal, ResolvedPrice>,
    pub histories: HashMap<Metal, HistoricalSeries>,
    /// True when the live table was unreachable or unparseable and the
    /// resolution ran on historical closes alone.
    pub spot_degraded: bool,
}

/// Fetches the spot table and the per-metal historical series concurrently,
/// then resolves one price per tracked metal.
///
/// Both sources fail soft: a fetch error becomes an empty input plus a
/// warning, never a fatal error. `on_fetch` is invoked as each source
/// completes, for progress reporting.
pub async fn fetch_snapshot(
    config: &AppConfig,
    spot_provider: &dyn SpotPriceProvider,
    history_provider: &dyn HistoryProvider,
    on_fetch: &(dyn Fn() + Sync),
) -> MarketSnapshot {
    let spot_fut = async {
        let result = spot_provider.fetch_spot().await;
        on_fetch();
        result
    };

    let history_futs = join_all(config.metals.iter().map(|&metal| {
        let ticker = config.ticker(metal);
        async move {
            let series = match history_provider.fetch_history(&ticker).await {
                Ok(series) => series,
                Err(e) => {
                    warn!("Couldn't fetch {} data: {}", ticker, e);
                    HistoricalSeries::empty(&ticker)
                }
            };
            on_fetch();
            (metal, series)
        }
    }));

    let (spot_result, history_results) = futures::join!(spot_fut, history_futs);

    let (spot, spot_degraded) = match spot_result {
        Ok(quotes) => (quotes, false),
        Err(e) => {
            warn!("Couldn't scrape live prices: {}", e);
            (Vec::new(), true)
        }
    };

    let histories: HashMap<Metal, HistoricalSeries> = history_results.into_iter().collect();
    let resolved = resolve_prices(&config.metals, &spot, &histories);

    MarketSnapshot {
        resolved,
        histories,
        spot_degraded,
    }
}
