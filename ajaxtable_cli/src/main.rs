mod commands;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ajaxtable_lib::AppConfig;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "ajaxtable")]
#[command(about = "Drive server-rendered list views through their partial-refresh endpoints")]
struct Cli {
    /// Path to the tables config file
    #[arg(long, default_value = "ajaxtable.toml", global = true)]
    config: PathBuf,

    /// Output format: table or json
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load one page of a table
    Page(commands::page::PageArgs),
    /// Re-fetch the current page of a table
    Reload(commands::page::ReloadArgs),
    /// Apply filters and load the first page of results
    Search(commands::search::SearchArgs),
    /// Print the request URL for a page without fetching it
    Url(commands::url::UrlArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ajaxtable=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };

    let mut config = AppConfig::from_path(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    config.apply_env();

    match &cli.command {
        Commands::Page(args) => commands::page::run(args, &config, &format).await?,
        Commands::Reload(args) => commands::page::run_reload(args, &config, &format).await?,
        Commands::Search(args) => commands::search::run(args, &config, &format).await?,
        Commands::Url(args) => commands::url::run(args, &config)?,
    }

    Ok(())
}
