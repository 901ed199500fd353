use crate::{OutputFormat, csv_field};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use kestrel_core::api::{PollConfig, ReporterClient, ReporterEndpoint, TransactionRecord};
use kestrel_core::config::Config;
use std::time::{Duration, Instant};

/// How a record is fetched
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Poll until the requested properties exist
    pub wait: bool,
    pub timeout: Duration,
}

/// Fetch a transaction record, optionally waiting for `properties` to be
/// aggregated
pub fn fetch_record(
    config: &Config,
    transaction_id: &str,
    properties: &[String],
    options: FetchOptions,
) -> Result<TransactionRecord> {
    let client = ReporterClient::new(ReporterEndpoint::from_config(config)?)?;

    if !options.wait {
        return Ok(client.fetch_record(transaction_id)?);
    }

    let poll = PollConfig::default().with_timeout(options.timeout);
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!("Waiting for transaction {} to aggregate...", transaction_id));

    let result = wait_for_all(&client, transaction_id, properties, &poll);
    spinner.finish_and_clear();
    result
}

/// Wait for each requested property in turn, all within one
/// `poll.timeout` deadline. Records only gain properties, so the last
/// fetch holds them all.
fn wait_for_all(
    client: &ReporterClient,
    transaction_id: &str,
    properties: &[String],
    poll: &PollConfig,
) -> Result<TransactionRecord> {
    let deadline = Instant::now() + poll.timeout;
    let mut last = None;
    for property in properties {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let poll = poll.with_timeout(remaining);
        last = Some(client.wait_for_property(transaction_id, property, &poll)?);
    }

    match last {
        Some(record) => Ok(record),
        None => Ok(client.fetch_record(transaction_id)?),
    }
}

pub fn execute(
    config: &Config,
    transaction_id: &str,
    properties: &[String],
    options: FetchOptions,
    format: OutputFormat,
) -> Result<()> {
    tracing::info!("Fetching transaction record: {}", transaction_id);

    let record = fetch_record(config, transaction_id, properties, options)?;

    // Every requested property must be present
    let selected: Vec<(String, String)> = properties
        .iter()
        .map(|name| -> Result<(String, String)> { Ok((name.clone(), record.property(name)?)) })
        .collect::<Result<_>>()?;

    if selected.len() == 1 && format == OutputFormat::Pretty {
        println!("{}", selected[0].1);
        return Ok(());
    }

    let rows: Vec<(String, String)> = if selected.is_empty() {
        record
            .keys()
            .map(|k| -> Result<(String, String)> { Ok((k.to_string(), record.property(k)?)) })
            .collect::<Result<_>>()?
    } else {
        selected
    };

    match format {
        OutputFormat::Json => output_json(&record, &rows, properties.is_empty())?,
        OutputFormat::Table => output_table(&rows),
        OutputFormat::Pretty => output_pretty(transaction_id, &rows),
    }

    Ok(())
}

fn output_pretty(transaction_id: &str, rows: &[(String, String)]) {
    use console::style;

    println!(
        "\n{}",
        style(format!("Transaction {}", transaction_id)).bold().cyan()
    );

    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in rows {
        println!("  {:width$}  {}", key, value, width = width);
    }

    println!();
}

fn output_json(record: &TransactionRecord, rows: &[(String, String)], whole: bool) -> Result<()> {
    let json = if whole {
        serde_json::to_string_pretty(record)?
    } else {
        let selected: serde_json::Map<String, serde_json::Value> = rows
            .iter()
            .map(|(k, _)| (k.clone(), record.get(k).cloned().unwrap_or_default()))
            .collect();
        serde_json::to_string_pretty(&selected)?
    };
    println!("{}", json);
    Ok(())
}

fn output_table(rows: &[(String, String)]) {
    println!("Property,Value");
    for (key, value) in rows {
        println!("{},{}", key, csv_field(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use kestrel_core::Error;
    use serde_json::json;

    #[test]
    fn test_wait_for_all_shares_one_deadline() {
        // Arrange: each fetch takes 600 ms and the record never gains `memAvg`
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/reporter/api/transactions/slow");
            then.status(200)
                .delay(Duration::from_millis(600))
                .json_body(json!({"speedIndex": 1500}));
        });
        let endpoint = ReporterEndpoint::new(&server.base_url(), "key").unwrap();
        let client = ReporterClient::new(endpoint).unwrap();
        let poll = PollConfig::default()
            .with_timeout(Duration::from_millis(1000))
            .with_initial_interval(Duration::from_millis(300));
        let properties = vec!["speedIndex".to_string(), "memAvg".to_string()];

        // Act
        let result = wait_for_all(&client, "slow", &properties, &poll);

        // Assert: the second property only gets what is left of the deadline,
        // so it gives up after a single fetch
        assert!(matches!(
            result.unwrap_err().downcast_ref::<Error>(),
            Some(Error::Timeout { .. })
        ));
        mock.assert_hits(2);
    }
}
