//! The slice of the HAR format that metrics are computed from.
//!
//! Only `log.entries[].time` is required. Everything else a HAR producer
//! writes is ignored, apart from a few optional request details that
//! entry filters can use.

use serde::{Deserialize, Serialize};

/// Top-level HAR object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingArchive {
    pub log: TimingLog,
}

/// HAR log, reduced to its entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingLog {
    pub entries: Vec<TimedEntry>,
}

/// One network call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedEntry {
    /// Total elapsed time of the request in milliseconds
    pub time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestLine>,
    /// Chrome DevTools resource type (`xhr`, `fetch`, `document`, ...)
    #[serde(
        rename = "_resourceType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_type: Option<String>,
}

/// Method and URL of the request behind an entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestLine {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub url: String,
}

impl TimedEntry {
    pub fn method(&self) -> Option<&str> {
        self.request.as_ref().map(|r| r.method.as_str())
    }

    pub fn url(&self) -> Option<&str> {
        self.request.as_ref().map(|r| r.url.as_str())
    }
}
