//! The synchronous transaction summary returned when a capture ends.

mod parser;

pub use parser::{SummaryParser, TRANSACTION_INFO_PREFIX};

use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const TRANSACTION_NAME: &str = "transactionName";
pub const TRANSACTION_ID: &str = "transactionId";
pub const APP_NAME: &str = "appName";
pub const APP_VERSION: &str = "appVersion";
pub const LINK: &str = "link";

/// Properties parsed from a capture-end response, in source order.
///
/// The key set is open: every key present in the response is kept. A
/// value written as the literal `null` is stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionSummary {
    properties: IndexMap<String, Option<String>>,
}

impl TransactionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw capture-end response
    pub fn parse(raw: &str) -> Result<Self> {
        SummaryParser::parse(raw)
    }

    /// Insert a property, replacing any previous value for the key
    pub(crate) fn insert(&mut self, key: String, value: Option<String>) {
        if self.properties.contains_key(&key) {
            tracing::debug!("Duplicate summary key '{}', keeping last value", key);
        }
        self.properties.insert(key, value);
    }

    /// Exact, case-sensitive lookup. Absent keys and `null` values both
    /// yield `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(|v| v.as_deref())
    }

    /// Lookup for a property the caller cannot proceed without
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| Error::MissingProperty(name.to_string()))
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn transaction_name(&self) -> Option<&str> {
        self.get(TRANSACTION_NAME)
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.get(TRANSACTION_ID)
    }

    pub fn app_name(&self) -> Option<&str> {
        self.get(APP_NAME)
    }

    pub fn app_version(&self) -> Option<&str> {
        self.get(APP_VERSION)
    }

    /// Link to the transaction report
    pub fn link(&self) -> Option<&str> {
        self.get(LINK)
    }
}

impl FromStr for TransactionSummary {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SummaryParser::parse(s)
    }
}
