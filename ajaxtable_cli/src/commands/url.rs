//! The `url` subcommand: shows which request a page change would issue.

use anyhow::{bail, Result};
use ajaxtable_lib::{AppConfig, Client, ListQuery, Query};
use clap::Args;

use super::TableArgs;

#[derive(Args)]
pub struct UrlArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// Page number to build the request for
    #[arg(long, default_value_t = 1)]
    pub page: u32,
}

pub fn run(args: &UrlArgs, config: &AppConfig) -> Result<()> {
    if args.page == 0 {
        bail!("page numbers start at 1");
    }
    let table = args.table.resolve(config)?;
    let location = args.table.location(table)?;
    let query = ListQuery::from_url(&location, table.per_page, &table.searchable).with_page(args.page);
    let client = Client::with_options(config.client_options());
    println!("{}", client.list_url(&table.base_url, &query)?);
    Ok(())
}
