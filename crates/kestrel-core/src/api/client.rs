use super::{PollConfig, ReporterEndpoint, TransactionRecord};
use crate::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use std::time::Instant;

/// Client for `GET <base>/reporter/api/transactions/<id>`.
///
/// Nothing is cached: every lookup fetches the full record again.
#[derive(Debug, Clone)]
pub struct ReporterClient {
    http: Client,
    endpoint: ReporterEndpoint,
}

impl ReporterClient {
    pub fn new(endpoint: ReporterEndpoint) -> Result<Self> {
        let http = Client::builder()
            .user_agent(format!("kestrel/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http_client(http, endpoint))
    }

    pub fn with_http_client(http: Client, endpoint: ReporterEndpoint) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &ReporterEndpoint {
        &self.endpoint
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Fetch the whole transaction record
    pub fn fetch_record(&self, transaction_id: &str) -> Result<TransactionRecord> {
        let url = self.endpoint.transaction_url(transaction_id)?;
        tracing::debug!("Fetching transaction record: {}", url);

        let response = self
            .http
            .get(url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", self.endpoint.access_key()))
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text()?;
        let record = TransactionRecord::from_json(&body)?;

        tracing::info!(
            "Fetched transaction record {} with {} properties",
            transaction_id,
            record.len()
        );
        Ok(record)
    }

    /// Fetch a single property as a string
    pub fn fetch_property(&self, transaction_id: &str, property: &str) -> Result<String> {
        self.fetch_record(transaction_id)?.property(property)
    }

    /// Poll until the record carries `property`, backing off between
    /// attempts. Only "not aggregated yet" outcomes are retried; any other
    /// error is returned immediately.
    pub fn wait_for_property(
        &self,
        transaction_id: &str,
        property: &str,
        poll: &PollConfig,
    ) -> Result<TransactionRecord> {
        let started = Instant::now();
        let mut attempt = 0u32;

        loop {
            let outcome = self
                .fetch_record(transaction_id)
                .and_then(|record| {
                    if record.contains(property) {
                        Ok(record)
                    } else {
                        Err(Error::MissingProperty(property.to_string()))
                    }
                });

            match outcome {
                Ok(record) => {
                    tracing::info!(
                        "Property '{}' available after {} attempt(s)",
                        property,
                        attempt + 1
                    );
                    return Ok(record);
                }
                Err(e) if e.is_not_ready() => {
                    let elapsed = started.elapsed();
                    let wait = poll.interval(attempt);
                    if elapsed + wait > poll.timeout {
                        return Err(Error::Timeout {
                            transaction_id: transaction_id.to_string(),
                            property: property.to_string(),
                            waited_ms: elapsed.as_millis(),
                            last_error: e.to_string(),
                        });
                    }

                    tracing::debug!(
                        "Transaction {} not ready ({}), retrying in {:?}",
                        transaction_id,
                        e,
                        wait
                    );
                    std::thread::sleep(wait);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
