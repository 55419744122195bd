use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

/// What the mounted page shows after an operation.
#[derive(Serialize, Debug)]
pub struct Report {
    pub table: String,
    pub page: u32,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_page: Option<u32>,
    pub stats: BTreeMap<String, String>,
    pub html: String,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn report_rows(report: &Report) -> Vec<FieldRow> {
    let mut rows = vec![
        FieldRow {
            field: "Table".into(),
            value: report.table.clone(),
        },
        FieldRow {
            field: "Page".into(),
            value: match report.max_page {
                Some(max) => format!("{} of {}", report.page, max),
                None => report.page.to_string(),
            },
        },
        FieldRow {
            field: "Location".into(),
            value: report.location.clone(),
        },
    ];
    for (field, value) in report.stats.iter() {
        rows.push(FieldRow {
            field: format!("stats.{}", field),
            value: value.clone(),
        });
    }
    rows
}

pub fn print_report(report: &Report, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let table = Table::new(report_rows(report))
                .with(Style::rounded())
                .to_string();
            println!("{}", table);
            println!("{}", report.html);
            Ok(())
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
