use super::ui;
use crate::core::config::AppConfig;
use crate::core::history::HistoryProvider;
use crate::core::metal::Metal;
use crate::core::spot::SpotPriceProvider;
use crate::core::valuation::appraise;
use crate::market;
use anyhow::Result;

pub async fn run(
    config: &AppConfig,
    spot_provider: &dyn SpotPriceProvider,
    history_provider: &dyn HistoryProvider,
    metal_arg: &str,
    weight_grams: f64,
) -> Result<()> {
    // Input problems are rejected before any network work happens.
    let metal: Metal = metal_arg.parse()?;
    if !config.metals.contains(&metal) {
        anyhow::bail!(
            "{} is not a tracked metal (tracked: {})",
            metal,
            config
                .metals
                .iter()
                .map(Metal::name)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    if weight_grams <= 0.0 || !weight_grams.is_finite() {
        anyhow::bail!("Weight must be a positive number of grams");
    }

    let pb = ui::new_progress_bar(config.metals.len() as u64 + 1, true);
    pb.set_message("Fetching prices...");
    let snapshot =
        market::fetch_snapshot(config, spot_provider, history_provider, &|| pb.inc(1)).await;
    pb.finish_and_clear();

    let price = &snapshot.resolved[&metal];
    let valuation = appraise(price, weight_grams)?;

    if valuation.meaningful {
        println!(
            "{}",
            ui::style_text(
                &format!("Estimated {} jewelry value: ${:.2}", metal, valuation.value),
                ui::StyleType::Success
            )
        );
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "{:.2} g at ${:.2}/g ({} price)",
                    valuation.weight_grams, price.price_per_gram, price.source
                ),
                ui::StyleType::Subtle
            )
        );
    } else {
        println!(
            "{}",
            ui::style_text(
                &format!("No price available for {metal}, the estimate would be meaningless"),
                ui::StyleType::Warning
            )
        );
    }

    Ok(())
}
