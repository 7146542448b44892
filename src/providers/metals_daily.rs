use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::cache::Cache;
use crate::core::metal::GRAMS_PER_TROY_OUNCE;
use crate::core::spot::{SpotPriceProvider, SpotQuote};

/// Rows qualify only when their label carries this marker; everything else
/// in the table (headers, per-kilo rows, ads) is skipped.
const UNIT_MARKER: &str = "USD/OZ";

/// Upper bound on the whole page fetch. The fetch fails soft past this.
const PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Returns the inner content of every `tag` block, case-insensitively and
/// tolerant of attributes. Unclosed blocks are dropped rather than guessed at.
fn tag_blocks<'a>(html: &'a str, tag: &str) -> Vec<&'a str> {
    let lower = html.to_ascii_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}");
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(found) = lower[pos..].find(open.as_str()) {
        let start = pos + found;
        let after = start + open.len();
        // "<tr" must not swallow "<track" and friends
        let is_tag = matches!(
            lower.as_bytes().get(after).copied(),
            Some(b'>' | b' ' | b'\t' | b'\n' | b'\r' | b'/')
        );
        if !is_tag {
            pos = after;
            continue;
        }
        let Some(open_end) = lower[after..].find('>') else {
            break;
        };
        let content_start = after + open_end + 1;
        let Some(end) = lower[content_start..].find(close.as_str()) else {
            break;
        };
        let content_end = content_start + end;
        blocks.push(&html[content_start..content_end]);
        pos = content_end + close.len();
    }
    blocks
}

/// Flattens a cell fragment to plain text: tags dropped, common entities
/// decoded, whitespace collapsed.
fn cell_text(fragment: &str) -> String {
    let mut text = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#39;", "'")
        .replace("&quot;", "\"");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses one table row into a spot quote.
///
/// Cell 0 is the label and must contain the unit marker. The ask price sits
/// in cell 2, or cell 1 when the table only carries two columns. Thousands
/// separators are stripped. Any row that fails to parse yields `None`.
fn parse_quote_row(cells: &[String]) -> Option<SpotQuote> {
    let label = cells.first()?;
    let upper = label.to_ascii_uppercase();
    let marker_at = upper.find(UNIT_MARKER)?;

    let ask = match cells.len() {
        0 | 1 => return None,
        2 => &cells[1],
        _ => &cells[2],
    };
    let price_per_ounce: f64 = ask
        .replace(',', "")
        .trim()
        .trim_start_matches('$')
        .parse()
        .ok()?;
    if !price_per_ounce.is_finite() || price_per_ounce < 0.0 {
        return None;
    }

    let mut name = String::with_capacity(label.len());
    name.push_str(&label[..marker_at]);
    name.push_str(&label[marker_at + UNIT_MARKER.len()..]);

    Some(SpotQuote {
        label: name.trim().to_string(),
        price_per_gram: price_per_ounce / GRAMS_PER_TROY_OUNCE,
    })
}

/// Walks every table row in the document and keeps the rows that parse.
pub(crate) fn parse_spot_table(html: &str) -> Vec<SpotQuote> {
    tag_blocks(html, "tr")
        .into_iter()
        .filter_map(|row| {
            let cells: Vec<String> = tag_blocks(row, "td")
                .into_iter()
                .map(cell_text)
                .collect();
            parse_quote_row(&cells)
        })
        .collect()
}

/// Scrapes the MetalsDaily live-prices page.
///
/// The page is plain HTML, so a bounded HTTP GET replaces the headless
/// browser a rendered page would need; callers only see the
/// `SpotPriceProvider` contract either way.
pub struct MetalsDailyProvider {
    url: String,
    cache: Arc<Cache<String, Vec<SpotQuote>>>,
}

impl MetalsDailyProvider {
    pub fn new(url: &str, cache: Arc<Cache<String, Vec<SpotQuote>>>) -> Self {
        MetalsDailyProvider {
            url: url.to_string(),
            cache,
        }
    }
}

#[async_trait]
impl SpotPriceProvider for MetalsDailyProvider {
    #[instrument(name = "SpotTableFetch", skip(self), fields(url = %self.url))]
    async fn fetch_spot(&self) -> Result<Vec<SpotQuote>> {
        if let Some(cached) = self.cache.get(&self.url).await {
            return Ok(cached);
        }

        debug!("Requesting spot table from {}", self.url);
        let client = reqwest::Client::builder()
            .user_agent("karat/1.0")
            .timeout(PAGE_TIMEOUT)
            .build()?;
        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for spot table URL: {}", e, self.url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for spot table URL: {}",
                response.status(),
                self.url
            ));
        }

        let html = response.text().await?;
        if !html.to_ascii_lowercase().contains("<table") {
            return Err(anyhow!("No price table found at {}", self.url));
        }

        let quotes = parse_spot_table(&html);
        if quotes.is_empty() {
            return Err(anyhow!("No spot quotes parsed from {}", self.url));
        }
        debug!("Parsed {} spot quotes", quotes.len());

        self.cache.put(self.url.clone(), quotes.clone()).await;
        Ok(quotes)
    }
}
