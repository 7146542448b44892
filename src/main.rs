use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use karat::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for karat::AppCommand {
    fn from(cmd: Commands) -> karat::AppCommand {
        match cmd {
            Commands::Prices => karat::AppCommand::Prices,
            Commands::History => karat::AppCommand::History,
            Commands::Value { metal, weight } => karat::AppCommand::Value {
                metal,
                weight_grams: weight,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the current price per gram for each tracked metal
    Prices,
    /// Display one year of historical price statistics
    History,
    /// Estimate the value of a jewelry item by weight
    Value {
        /// Metal the item is made of, e.g. gold
        metal: String,
        /// Weight in grams
        weight: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => karat::cli::setup::setup(),
        Some(cmd) => karat::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
