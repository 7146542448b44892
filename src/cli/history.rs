use super::ui;
use crate::core::config::AppConfig;
use crate::core::history::{HistoricalSeries, HistoryProvider};
use crate::core::metal::Metal;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};
use futures::future::join_all;
use tracing::warn;

fn series_row(metal: Metal, series: &HistoricalSeries) -> Vec<Cell> {
    let close_cell = ui::format_optional_cell(series.latest_close(), |c| format!("{c:.2}"));
    let as_of_cell = ui::format_optional_cell(series.latest_date(), |d| d.to_string());
    let week = series
        .change_over(7)
        .map_or(ui::na_cell(false), ui::change_cell);
    let month = series
        .change_over(30)
        .map_or(ui::na_cell(false), ui::change_cell);
    let year = series
        .change_over(365)
        .map_or(ui::na_cell(false), ui::change_cell);
    let low = ui::format_optional_cell(series.low(), |v| format!("{v:.2}"));
    let high = ui::format_optional_cell(series.high(), |v| format!("{v:.2}"));

    vec![
        Cell::new(metal.name()),
        Cell::new(&series.ticker).set_alignment(CellAlignment::Right),
        close_cell,
        as_of_cell,
        week,
        month,
        year,
        low,
        high,
    ]
}

/// Renders a trailing-1-year summary per metal: the terminal counterpart of
/// a price chart.
pub async fn run(config: &AppConfig, history_provider: &dyn HistoryProvider) -> Result<()> {
    let pb = ui::new_progress_bar(config.metals.len() as u64, false);
    let series_futures = config.metals.iter().map(|&metal| {
        let ticker = config.ticker(metal);
        let pb_clone = pb.clone();
        async move {
            let res = history_provider.fetch_history(&ticker).await;
            pb_clone.inc(1);
            (metal, ticker, res)
        }
    });
    let results = join_all(series_futures).await;
    pb.finish_and_clear();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Metal"),
        ui::header_cell("Ticker"),
        ui::header_cell("Last Close (USD/oz)"),
        ui::header_cell("As Of"),
        ui::header_cell("1W"),
        ui::header_cell("1M"),
        ui::header_cell("1Y"),
        ui::header_cell("52w Low"),
        ui::header_cell("52w High"),
    ]);

    let mut any_failed = false;
    for (metal, ticker, result) in results {
        match result {
            Ok(series) => table.add_row(series_row(metal, &series)),
            Err(e) => {
                warn!("Couldn't fetch {} data: {}", ticker, e);
                any_failed = true;
                let mut row = vec![
                    Cell::new(metal.name()),
                    Cell::new(&ticker).set_alignment(CellAlignment::Right),
                ];
                row.extend(std::iter::repeat_with(|| ui::na_cell(true)).take(7));
                table.add_row(row)
            }
        };
    }

    println!(
        "{}\n",
        ui::style_text("Historical Prices (1 Year)", ui::StyleType::Title)
    );
    println!("{table}");

    if any_failed {
        println!(
            "\n{}",
            ui::style_text(
                "Some series could not be fetched, run with --verbose for details",
                ui::StyleType::Warning
            )
        );
    }

    Ok(())
}
