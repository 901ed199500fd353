use crate::api::{ReporterClient, ReporterEndpoint};
use crate::{Error, Result};
use chrono::{Local, NaiveDateTime};
use reqwest::blocking::{Client, Response};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default download directory, relative to the working directory
pub const HAR_DIR: &str = "har_files";

/// Timestamp appended to downloaded file names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// `{name}_{yyyy-MM-dd_HH:mm:ss}.har`
pub fn har_file_name(name: &str, timestamp: NaiveDateTime) -> String {
    format!("{}_{}.har", name, timestamp.format(TIMESTAMP_FORMAT))
}

/// Downloads transaction HAR archives from
/// `GET <base>/reporter/api/transactions/<id>/har?token=<access key>`.
///
/// Files are never overwritten on purpose, never modified after the
/// download, and never deleted. Two downloads with the same name within the
/// same second land on the same path.
#[derive(Debug, Clone)]
pub struct HarRetriever {
    http: Client,
    endpoint: ReporterEndpoint,
    output_dir: PathBuf,
}

impl HarRetriever {
    pub fn new(endpoint: ReporterEndpoint) -> Result<Self> {
        let http = Client::builder()
            .user_agent(format!("kestrel/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            output_dir: PathBuf::from(HAR_DIR),
        })
    }

    /// Reuse the HTTP client and endpoint of an API client
    pub fn from_client(client: &ReporterClient) -> Self {
        Self {
            http: client.http().clone(),
            endpoint: client.endpoint().clone(),
            output_dir: PathBuf::from(HAR_DIR),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Download the archive, stamping the file with the current local time
    pub fn download(&self, transaction_id: &str, file_name: &str) -> Result<PathBuf> {
        self.download_at(transaction_id, file_name, Local::now().naive_local())
    }

    /// Download the archive, stamping the file with `timestamp`
    pub fn download_at(
        &self,
        transaction_id: &str,
        file_name: &str,
        timestamp: NaiveDateTime,
    ) -> Result<PathBuf> {
        let url = self.endpoint.har_url(transaction_id)?;
        tracing::debug!("Downloading HAR for transaction {}", transaction_id);

        let response = self.http.get(url.clone()).send()?;

        let status = response.status();
        if !status.is_success() {
            let mut shown = url;
            shown.set_query(None);
            return Err(Error::Status {
                status: status.as_u16(),
                url: shown.to_string(),
            });
        }

        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(har_file_name(file_name, timestamp));

        match stream_to_file(response, &path) {
            Ok(bytes) => {
                tracing::info!("Wrote {} byte HAR file to {}", bytes, path.display());
                Ok(path)
            }
            Err(e) => {
                tracing::warn!("HAR download failed, removing {}: {}", path.display(), e);
                if path.exists() {
                    let _ = fs::remove_file(&path);
                }
                Err(e)
            }
        }
    }
}

fn stream_to_file(mut response: Response, path: &Path) -> Result<u64> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let bytes = response.copy_to(&mut writer)?;
    writer.flush()?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_har_file_name() {
        let timestamp = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 42)
            .unwrap();

        assert_eq!(
            har_file_name("login_page_load_time", timestamp),
            "login_page_load_time_2024-03-09_07:05:42.har"
        );
    }
}
