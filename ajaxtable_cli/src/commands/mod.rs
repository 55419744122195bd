//! CLI subcommand implementations.
//!
//! Each command mounts the configured table on an in-memory page whose
//! address bar starts at `--location` (or the table's base URL), runs one
//! operation, and reports what the page looks like afterwards.

pub mod page;
pub mod search;
pub mod url;

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use ajaxtable_lib::{
    AjaxTable, AppConfig, Client, Dom, History, Host, LoadOutcome, MemoryDom, MemoryHistory,
    TableConfig,
};
use clap::Args;

use crate::output::Report;

/// Arguments shared by every command that targets a table.
#[derive(Args)]
pub struct TableArgs {
    /// Table name or container selector from the config file
    #[arg(long)]
    pub table: String,

    /// Page URL the table is mounted on (defaults to the table's base URL)
    #[arg(long)]
    pub location: Option<String>,
}

impl TableArgs {
    pub fn resolve<'a>(&self, config: &'a AppConfig) -> Result<&'a TableConfig> {
        config.table(&self.table).ok_or_else(|| {
            let known: Vec<&str> = config.tables.iter().map(|t| t.name()).collect();
            anyhow!(
                "unknown table '{}' (configured: {})",
                self.table,
                known.join(", ")
            )
        })
    }

    pub fn location(&self, table: &TableConfig) -> Result<::url::Url> {
        match &self.location {
            Some(raw) => Ok(::url::Url::parse(raw)?),
            None => Ok(table.base_url.clone()),
        }
    }
}

/// A table mounted on a fresh in-memory page.
pub struct Mounted {
    pub table: AjaxTable,
    pub dom: Arc<MemoryDom>,
    pub history: Arc<MemoryHistory>,
}

pub fn mount(args: &TableArgs, config: &AppConfig) -> Result<Mounted> {
    let table_config = args.resolve(config)?.clone();
    let location = args.location(&table_config)?;

    let mut dom = MemoryDom::new().with_container(&table_config.container, "");
    for element_id in table_config.stats.values() {
        dom = dom.with_element(element_id, "-");
    }
    let dom = Arc::new(dom);
    let history = Arc::new(MemoryHistory::new(location));
    let host = Host::new(
        Client::with_options(config.client_options()),
        Arc::clone(&dom) as Arc<dyn Dom>,
        Arc::clone(&history) as Arc<dyn History>,
    );
    let table = AjaxTable::initialize(table_config, &host, None)?;
    Ok(Mounted {
        table,
        dom,
        history,
    })
}

/// Turns the page state after an operation into a printable report, failing
/// the command when the operation did not render anything.
pub fn report(mounted: &Mounted, outcome: LoadOutcome) -> Result<Report> {
    let page = match outcome {
        LoadOutcome::Rendered { page } => page,
        LoadOutcome::Rejected => bail!("page rejected: out of range or not a number"),
        LoadOutcome::Superseded => bail!("request superseded by a newer one"),
        LoadOutcome::FellBack { url } => bail!("request failed; a browser would now load {}", url),
        LoadOutcome::Failed => bail!("request failed; list left unchanged"),
    };
    let container = mounted.table.container();
    let stats = mounted
        .table
        .config()
        .stats
        .iter()
        .map(|(field, id)| (field.clone(), mounted.dom.text(id).unwrap_or_default()))
        .collect();
    Ok(Report {
        table: mounted.table.config().name().to_string(),
        page,
        location: mounted.history.location().to_string(),
        max_page: mounted.dom.max_page(container),
        stats,
        html: mounted.dom.inner_html(container).unwrap_or_default(),
    })
}
