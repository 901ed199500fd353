use crate::config::{self, Config};
use crate::{Error, Result};
use url::Url;

const TRANSACTIONS_PATH: [&str; 3] = ["reporter", "api", "transactions"];

/// Base URL and access key of the reporting API
#[derive(Clone)]
pub struct ReporterEndpoint {
    base_url: Url,
    access_key: String,
}

impl ReporterEndpoint {
    pub fn new(base_url: &str, access_key: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidEndpoint(format!(
                "'{}' cannot be used as an API base URL",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            access_key: access_key.into(),
        })
    }

    /// Build from `urlForAPIs` and `accessKey`
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.require(config::URL_FOR_APIS)?;
        let access_key = config.require(config::ACCESS_KEY)?;
        Self::new(base_url, access_key)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// `<base>/reporter/api/transactions/<id>`
    pub fn transaction_url(&self, transaction_id: &str) -> Result<Url> {
        self.transactions_url(&[transaction_id])
    }

    /// `<base>/reporter/api/transactions/<id>/har?token=<access key>`
    pub fn har_url(&self, transaction_id: &str) -> Result<Url> {
        let mut url = self.transactions_url(&[transaction_id, "har"])?;
        url.query_pairs_mut().append_pair("token", &self.access_key);
        Ok(url)
    }

    fn transactions_url(&self, tail: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::InvalidEndpoint(format!("'{}' cannot have path segments", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.extend(TRANSACTIONS_PATH);
            segments.extend(tail);
        }
        Ok(url)
    }
}

impl std::fmt::Debug for ReporterEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReporterEndpoint")
            .field("base_url", &self.base_url.as_str())
            .field("access_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_url() {
        let endpoint = ReporterEndpoint::new("https://lab.example.com", "key").unwrap();
        let url = endpoint.transaction_url("abc123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://lab.example.com/reporter/api/transactions/abc123"
        );
    }

    #[test]
    fn test_trailing_slash_on_base() {
        let endpoint = ReporterEndpoint::new("https://lab.example.com/tenant/", "key").unwrap();
        let url = endpoint.transaction_url("1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://lab.example.com/tenant/reporter/api/transactions/1"
        );
    }

    #[test]
    fn test_har_url_carries_token() {
        let endpoint = ReporterEndpoint::new("https://lab.example.com", "s3cr3t").unwrap();
        let url = endpoint.har_url("abc123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://lab.example.com/reporter/api/transactions/abc123/har?token=s3cr3t"
        );
    }

    #[test]
    fn test_transaction_id_is_encoded() {
        let endpoint = ReporterEndpoint::new("https://lab.example.com", "key").unwrap();
        let url = endpoint.transaction_url("a/b").unwrap();
        assert!(url.as_str().ends_with("/transactions/a%2Fb"));
    }

    #[test]
    fn test_from_config_requires_values() {
        let config = Config {
            url_for_apis: Some("https://lab.example.com".to_string()),
            ..Config::default()
        };
        let err = ReporterEndpoint::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::MissingConfig(key) if key == "accessKey"));
    }

    #[test]
    fn test_debug_redacts_access_key() {
        let endpoint = ReporterEndpoint::new("https://lab.example.com", "s3cr3t").unwrap();
        assert!(!format!("{:?}", endpoint).contains("s3cr3t"));
    }
}
