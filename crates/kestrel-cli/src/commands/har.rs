use crate::OutputFormat;
use anyhow::Result;
use kestrel_core::analysis::{HarMetrics, MetricsAnalyzer};
use kestrel_core::api::ReporterEndpoint;
use kestrel_core::config::Config;
use kestrel_core::filter::EntryFilter;
use kestrel_core::har::HarRetriever;
use std::path::{Path, PathBuf};

/// Download a transaction's HAR archive, returning the written path
pub fn download(
    config: &Config,
    transaction_id: &str,
    name: &str,
    output_dir: Option<&Path>,
) -> Result<PathBuf> {
    let mut retriever = HarRetriever::new(ReporterEndpoint::from_config(config)?)?;
    if let Some(dir) = output_dir {
        retriever = retriever.with_output_dir(dir);
    }

    Ok(retriever.download(transaction_id, name)?)
}

/// Compute network metrics for a local HAR file
pub fn compute_metrics(file: &Path, filter: EntryFilter) -> Result<HarMetrics> {
    tracing::debug!("Computing metrics for HAR file: {}", file.display());

    if !filter.is_empty() {
        tracing::debug!("Applying entry filter: {:?}", filter);
    }

    Ok(MetricsAnalyzer::with_filter(filter).aggregate(file)?)
}

pub fn execute_download(
    config: &Config,
    transaction_id: &str,
    name: &str,
    output_dir: Option<&Path>,
) -> Result<()> {
    tracing::info!("Downloading HAR for transaction: {}", transaction_id);

    let path = download(config, transaction_id, name, output_dir)?;
    println!("{}", path.display());

    Ok(())
}

pub fn execute_metrics(file: &Path, filter: EntryFilter, format: OutputFormat) -> Result<()> {
    tracing::info!("Computing HAR metrics: {}", file.display());

    let metrics = compute_metrics(file, filter)?;
    output(&metrics, file, format)
}

/// Download then compute metrics in one step
pub fn execute_fetch(
    config: &Config,
    transaction_id: &str,
    name: &str,
    output_dir: Option<&Path>,
    filter: EntryFilter,
    format: OutputFormat,
) -> Result<()> {
    let path = download(config, transaction_id, name, output_dir)?;
    let metrics = compute_metrics(&path, filter)?;
    output(&metrics, &path, format)
}

fn output(metrics: &HarMetrics, file: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(metrics)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            println!("Metric,Value");
            println!("Network Calls,{}", metrics.count);
            println!("Total Time (s),{}", metrics.total_seconds);
        }
        OutputFormat::Pretty => {
            use console::style;

            println!("\n{}", style("HAR Network Metrics").bold().cyan());
            println!("{}", style("===================").cyan());
            println!("  File: {}", file.display());
            for line in metrics.report_lines() {
                println!("  {}", line);
            }
            println!();
        }
    }

    Ok(())
}
