use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request to {url} returned HTTP {status}")]
    Status { status: u16, url: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Property not found: {0}")]
    MissingProperty(String),

    #[error("Malformed HAR archive: {0}")]
    MalformedArchive(String),

    #[error("Failed to access HAR file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed transaction summary: {0}")]
    MalformedSummary(String),

    #[error("Missing configuration value: {0}")]
    MissingConfig(String),

    #[error("Invalid API endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(
        "Timed out after {waited_ms} ms waiting for '{property}' on transaction {transaction_id} (last error: {last_error})"
    )]
    Timeout {
        transaction_id: String,
        property: String,
        waited_ms: u128,
        /// Why the final attempt was not ready
        last_error: String,
    },
}

impl Error {
    /// True for outcomes that mean the reporting API has not finished
    /// aggregating the transaction yet.
    pub fn is_not_ready(&self) -> bool {
        match self {
            Error::Status { status, .. } => *status == 404,
            Error::MalformedResponse(_) | Error::MissingProperty(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
