use anyhow::Result;
use clap::ValueEnum;
use kestrel_core::config::{Config, ConfigSource, EnvSource, PropertiesFile};
use std::borrow::Cow;
use std::path::PathBuf;

pub mod commands;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    Table,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Pretty => "pretty",
            OutputFormat::Json => "json",
            OutputFormat::Table => "table",
        }
    }
}

/// Quote a table cell if it contains a separator, quote or line break
pub fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Where configuration values come from, highest priority first:
/// command-line flags, environment variables, the properties file.
#[derive(Debug, Clone)]
pub struct ConfigArgs {
    pub config: PathBuf,
    pub api_url: Option<String>,
    pub access_key: Option<String>,
    pub cloud_url: Option<String>,
}

impl ConfigArgs {
    pub fn resolve(&self) -> Result<Config> {
        self.resolve_with(&EnvSource::new())
    }

    pub fn resolve_with(&self, env: &dyn ConfigSource) -> Result<Config> {
        let file = PropertiesFile::load_optional(&self.config)?;
        let resolved = Config::resolve(&[env, &file]);

        Ok(Config {
            url_for_apis: self.api_url.clone().or(resolved.url_for_apis),
            access_key: self.access_key.clone().or(resolved.access_key),
            cloud_url: self.cloud_url.clone().or(resolved.cloud_url),
        })
    }
}
