use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::core::cache::Cache;
use crate::core::history::{HistoricalSeries, HistoryProvider};

// YahooFinanceProvider implementation for HistoryProvider
pub struct YahooFinanceProvider {
    base_url: String,
    cache: Arc<Cache<String, HistoricalSeries>>,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, HistoricalSeries>>) -> Self {
        YahooFinanceProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Vec<ChartItem>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

fn daily_closes(item: &ChartItem) -> Vec<(NaiveDate, f64)> {
    let (Some(timestamps), Some(closes)) = (
        item.timestamp.as_ref(),
        item.indicators
            .as_ref()
            .and_then(|inds| inds.quote.first())
            .and_then(|q| q.close.as_ref()),
    ) else {
        return Vec::new();
    };

    timestamps
        .iter()
        .zip(closes.iter())
        .filter_map(|(ts, close)| {
            let close = (*close)?;
            let date = Utc.timestamp_opt(*ts, 0).single()?.date_naive();
            Some((date, close))
        })
        .collect()
}

#[async_trait]
impl HistoryProvider for YahooFinanceProvider {
    #[instrument(
        name = "YahooHistoryFetch",
        skip(self),
        fields(ticker = %ticker)
    )]
    async fn fetch_history(&self, ticker: &str) -> Result<HistoricalSeries> {
        if let Some(cached) = self.cache.get(&ticker.to_string()).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1y",
            self.base_url, ticker
        );
        debug!("Requesting historical data from {}", url);

        let client = reqwest::Client::builder().user_agent("karat/1.0").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for ticker: {} URL: {}", e, ticker, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for ticker: {}",
                response.status(),
                ticker
            ));
        }

        let data = response.json::<YahooChartResponse>().await?;
        let item = data
            .chart
            .result
            .first()
            .ok_or_else(|| anyhow!("No chart data found for ticker: {}", ticker))?;

        let series = HistoricalSeries::new(ticker, daily_closes(item));
        debug!("Fetched {} daily closes", series.daily_closes.len());

        self.cache.put(ticker.to_string(), series.clone()).await;

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(ticker: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/v8/finance/chart/{ticker}");

        Mock::given(method("GET"))
            .and(path(request_path))
            .and(query_param("interval", "1d"))
            .and(query_param("range", "1y"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_history_fetch() {
        let now = Utc::now();
        let ts_old = (now - chrono::Duration::days(300)).timestamp();
        let ts_new = (now - chrono::Duration::days(1)).timestamp();

        let mock_response = format!(
            r#"{{
                "chart": {{
                    "result": [{{
                        "meta": {{ "regularMarketPrice": 1850.0, "currency": "USD" }},
                        "timestamp": [{ts_old}, {ts_new}],
                        "indicators": {{
                            "quote": [{{
                                "close": [1790.5, 1850.0]
                            }}]
                        }}
                    }}]
                }}
            }}"#,
        );

        let mock_server = create_mock_server("GC=F", &mock_response).await;
        let cache = Arc::new(Cache::new());

        let provider = YahooFinanceProvider::new(&mock_server.uri(), cache);
        let series = provider.fetch_history("GC=F").await.unwrap();

        assert_eq!(series.ticker, "GC=F");
        assert_eq!(series.daily_closes.len(), 2);
        assert_eq!(series.latest_close(), Some(1850.0));
    }

    #[tokio::test]
    async fn test_null_closes_are_dropped() {
        let now = Utc::now();
        let ts_a = (now - chrono::Duration::days(3)).timestamp();
        let ts_b = (now - chrono::Duration::days(2)).timestamp();
        let ts_c = (now - chrono::Duration::days(1)).timestamp();

        let mock_response = format!(
            r#"{{
                "chart": {{
                    "result": [{{
                        "timestamp": [{ts_a}, {ts_b}, {ts_c}],
                        "indicators": {{
                            "quote": [{{
                                "close": [22.3, null, 22.4]
                            }}]
                        }}
                    }}]
                }}
            }}"#,
        );

        let mock_server = create_mock_server("SI=F", &mock_response).await;
        let cache = Arc::new(Cache::new());

        let provider = YahooFinanceProvider::new(&mock_server.uri(), cache);
        let series = provider.fetch_history("SI=F").await.unwrap();
        assert_eq!(series.daily_closes.len(), 2);
        assert_eq!(series.latest_close(), Some(22.4));
    }

    #[tokio::test]
    async fn test_missing_bars_yield_empty_series() {
        // Meta-only payloads happen for halted symbols; not an error, just no bars.
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": { "regularMarketPrice": 950.0, "currency": "USD" }
                }]
            }
        }"#;

        let mock_server = create_mock_server("PL=F", mock_response).await;
        let cache = Arc::new(Cache::new());

        let provider = YahooFinanceProvider::new(&mock_server.uri(), cache);
        let series = provider.fetch_history("PL=F").await.unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn test_no_chart_result_data() {
        let mock_response = r#"{"chart": {"result": []}}"#;
        let mock_server = create_mock_server("INVALID", mock_response).await;
        let cache = Arc::new(Cache::new());

        let provider = YahooFinanceProvider::new(&mock_server.uri(), cache);
        let result = provider.fetch_history("INVALID").await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "No chart data found for ticker: INVALID"
        );
    }

    #[tokio::test]
    async fn test_history_api_error_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/GC=F"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        let cache = Arc::new(Cache::new());

        let provider = YahooFinanceProvider::new(&mock_server.uri(), cache);
        let result = provider.fetch_history("GC=F").await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for ticker: GC=F"
        );
    }
}
