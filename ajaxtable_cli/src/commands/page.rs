//! The `page` and `reload` subcommands.

use std::time::Duration;

use anyhow::Result;
use ajaxtable_lib::AppConfig;
use clap::Args;

use super::{mount, report, TableArgs};
use crate::output::{print_report, OutputFormat};

#[derive(Args)]
pub struct PageArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// Page number to load (accepts the same text a jump-to-page box would)
    #[arg(long)]
    pub page: String,
}

#[derive(Args)]
pub struct ReloadArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// Wait this many milliseconds before re-fetching
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,
}

pub async fn run(args: &PageArgs, config: &AppConfig, format: &OutputFormat) -> Result<()> {
    let mounted = mount(&args.table, config)?;
    let outcome = mounted.table.jump_to(&args.page).await;
    print_report(&report(&mounted, outcome)?, format)
}

pub async fn run_reload(
    args: &ReloadArgs,
    config: &AppConfig,
    format: &OutputFormat,
) -> Result<()> {
    let mounted = mount(&args.table, config)?;
    let outcome = mounted
        .table
        .reload(Duration::from_millis(args.delay_ms))
        .await;
    print_report(&report(&mounted, outcome)?, format)
}
