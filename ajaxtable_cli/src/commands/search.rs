//! The `search` subcommand: applies filters through the search endpoint.

use anyhow::{bail, Result};
use ajaxtable_lib::AppConfig;
use clap::Args;

use super::{mount, report, TableArgs};
use crate::output::{print_report, OutputFormat};

#[derive(Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// Filter as key=value; repeat for several filters
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    /// Clear all filters instead of applying new ones
    #[arg(long, conflicts_with = "filters")]
    pub reset: bool,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

pub async fn run(args: &SearchArgs, config: &AppConfig, format: &OutputFormat) -> Result<()> {
    if !args.reset && args.filters.is_empty() {
        bail!("pass at least one --filter, or --reset");
    }
    let mounted = mount(&args.table, config)?;
    let outcome = if args.reset {
        mounted.table.reset_filters().await
    } else {
        mounted.table.apply_filters(args.filters.clone()).await
    };
    print_report(&report(&mounted, outcome)?, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_filter_splits_on_first_equals() {
        assert_eq!(
            parse_filter("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_filter(" status = done ").unwrap(),
            ("status".to_string(), "done".to_string())
        );
    }

    #[test]
    fn parse_filter_rejects_missing_key() {
        assert!(parse_filter("=done").is_err());
        assert!(parse_filter("done").is_err());
    }
}
