use super::ui;
use crate::core::config::AppConfig;
use crate::core::history::HistoryProvider;
use crate::core::resolve::PriceSource;
use crate::core::spot::SpotPriceProvider;
use crate::market;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment, Color};

fn source_cell(source: PriceSource) -> Cell {
    match source {
        PriceSource::Live => Cell::new("live").fg(Color::Green),
        PriceSource::HistoricalFallback => Cell::new("historical").fg(Color::Yellow),
        PriceSource::Unavailable => Cell::new("unavailable").fg(Color::Red),
    }
}

pub async fn run(
    config: &AppConfig,
    spot_provider: &dyn SpotPriceProvider,
    history_provider: &dyn HistoryProvider,
) -> Result<()> {
    // One tick per history fetch plus one for the spot table
    let pb = ui::new_progress_bar(config.metals.len() as u64 + 1, true);
    pb.set_message("Fetching prices...");
    let snapshot =
        market::fetch_snapshot(config, spot_provider, history_provider, &|| pb.inc(1)).await;
    pb.finish_and_clear();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Metal"),
        ui::header_cell("Price (USD/g)"),
        ui::header_cell("Source"),
    ]);

    for price in snapshot.resolved.values() {
        let price_cell = if price.is_available() {
            Cell::new(format!("${:.2}", price.price_per_gram)).set_alignment(CellAlignment::Right)
        } else {
            ui::na_cell(true)
        };
        table.add_row(vec![
            Cell::new(price.metal.name()),
            price_cell,
            source_cell(price.source),
        ]);
    }

    println!(
        "{}\n",
        ui::style_text("Current Prices per Gram", ui::StyleType::Title)
    );
    println!("{table}");

    if snapshot.spot_degraded {
        println!(
            "\n{}",
            ui::style_text(
                "Live spot table unavailable, prices fall back to historical closes",
                ui::StyleType::Warning
            )
        );
    }

    Ok(())
}
