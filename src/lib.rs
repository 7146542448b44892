pub mod cli;
pub mod core;
pub mod market;
pub mod providers;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Prices,
    History,
    Value { metal: String, weight_grams: f64 },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Metal price dashboard starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    // Caches shared by the providers; they live for exactly this refresh.
    let spot_cache = Arc::new(Cache::new());
    let history_cache = Arc::new(Cache::new());

    let spot_url = config
        .providers
        .spot
        .as_ref()
        .map_or("https://www.metalsdaily.com/live-prices/pgms/", |p| &p.url);
    let spot_provider =
        providers::metals_daily::MetalsDailyProvider::new(spot_url, Arc::clone(&spot_cache));

    let yahoo_base_url = config
        .providers
        .yahoo
        .as_ref()
        .map_or("https://query1.finance.yahoo.com", |p| &p.base_url);
    let history_provider = providers::yahoo_finance::YahooFinanceProvider::new(
        yahoo_base_url,
        Arc::clone(&history_cache),
    );

    match command {
        AppCommand::Prices => cli::prices::run(&config, &spot_provider, &history_provider).await,
        AppCommand::History => cli::history::run(&config, &history_provider).await,
        AppCommand::Value {
            metal,
            weight_grams,
        } => cli::value::run(&config, &spot_provider, &history_provider, &metal, weight_grams).await,
    }
}
