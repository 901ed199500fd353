use crate::{OutputFormat, csv_field};
use anyhow::Result;
use kestrel_core::summary::TransactionSummary;

/// Parse a capture-end response into its properties
pub fn parse_summary(raw: &str) -> Result<TransactionSummary> {
    tracing::debug!("Parsing transaction summary from command line");
    Ok(TransactionSummary::parse(raw)?)
}

pub fn execute(raw: &str, property: Option<&str>, format: OutputFormat) -> Result<()> {
    let summary = parse_summary(raw)?;

    if let Some(name) = property {
        // Absent and null look the same to callers
        match summary.get(name) {
            Some(value) => println!("{}", value),
            None => println!("null"),
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => output_json(&summary)?,
        OutputFormat::Table => output_table(&summary),
        OutputFormat::Pretty => output_pretty(&summary),
    }

    Ok(())
}

fn output_pretty(summary: &TransactionSummary) {
    use console::style;

    println!("\n{}", style("Transaction Summary").bold().cyan());
    println!("{}", style("===================").cyan());

    let width = summary.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in summary.iter() {
        let shown = match value {
            Some(v) => v.to_string(),
            None => style("null").dim().to_string(),
        };
        println!("  {:width$}  {}", key, shown, width = width);
    }

    println!();
}

fn output_json(summary: &TransactionSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    println!("{}", json);
    Ok(())
}

fn output_table(summary: &TransactionSummary) {
    println!("Property,Value");
    for (key, value) in summary.iter() {
        println!("{},{}", key, csv_field(value.unwrap_or("")));
    }
}
