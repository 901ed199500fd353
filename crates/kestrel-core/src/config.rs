//! Named configuration values (`urlForAPIs`, `accessKey`, `cloudUrl`).
//!
//! Values come from one or more [`ConfigSource`]s consulted in order. The
//! provider performs no validation: a key that no source knows about is
//! simply `None`, and it is up to the consumer to decide whether that is
//! fatal.

use crate::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const URL_FOR_APIS: &str = "urlForAPIs";
pub const ACCESS_KEY: &str = "accessKey";
pub const CLOUD_URL: &str = "cloudUrl";

/// Default properties file, relative to the working directory
pub const DEFAULT_PROPERTIES_FILE: &str = "config.properties";

/// A key/value source of configuration
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Java-style `.properties` file
#[derive(Debug, Clone, Default)]
pub struct PropertiesFile {
    path: Option<PathBuf>,
    values: HashMap<String, String>,
}

impl PropertiesFile {
    /// Load a properties file from disk
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!("Loading properties from: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let mut file = Self::parse(&content);
        file.path = Some(path.to_path_buf());

        tracing::debug!("Loaded {} properties", file.values.len());
        Ok(file)
    }

    /// Load a properties file if it exists, otherwise return an empty source
    pub fn load_optional(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No properties file at {}", path.display());
            Ok(Self::default())
        }
    }

    /// Parse properties text. Supports `key=value` and `key: value` lines,
    /// `#` and `!` comments, and blank lines.
    pub fn parse(content: &str) -> Self {
        let mut values = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let split_at = line.find(['=', ':']);
            let (key, value) = match split_at {
                Some(idx) => (&line[..idx], &line[idx + 1..]),
                None => (line, ""),
            };

            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            values.insert(key.to_string(), value.trim().to_string());
        }

        Self { path: None, values }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigSource for PropertiesFile {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Environment variables, named by converting the key to upper snake case
/// (`urlForAPIs` -> `URL_FOR_APIS`).
pub struct EnvSource {
    lookup: Box<dyn Fn(&str) -> Option<String>>,
}

impl EnvSource {
    /// Read from the process environment
    pub fn new() -> Self {
        Self::with_lookup(|name| std::env::var(name).ok())
    }

    /// Read through a custom lookup function
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(&env_var_name(key)).filter(|v| !v.is_empty())
    }
}

/// Convert a camelCase key to an upper snake case variable name
pub fn env_var_name(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut name = String::with_capacity(key.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            // Break before a new word: aB, or the last capital of a run followed by lowercase (APIs)
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower && i + 2 < chars.len());
            if boundary {
                name.push('_');
            }
        }
        name.push(c.to_ascii_uppercase());
    }

    name
}

/// Resolved configuration values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub url_for_apis: Option<String>,
    pub access_key: Option<String>,
    pub cloud_url: Option<String>,
}

impl Config {
    /// Resolve every known key, first source to answer wins
    pub fn resolve(sources: &[&dyn ConfigSource]) -> Self {
        let lookup = |key: &str| sources.iter().find_map(|source| source.get(key));

        let config = Self {
            url_for_apis: lookup(URL_FOR_APIS),
            access_key: lookup(ACCESS_KEY),
            cloud_url: lookup(CLOUD_URL),
        };

        tracing::debug!(
            "Resolved configuration: urlForAPIs={:?}, accessKey={}, cloudUrl={:?}",
            config.url_for_apis,
            if config.access_key.is_some() { "<set>" } else { "<unset>" },
            config.cloud_url
        );

        config
    }

    /// Look up a value by its configuration key
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            URL_FOR_APIS => self.url_for_apis.as_deref(),
            ACCESS_KEY => self.access_key.as_deref(),
            CLOUD_URL => self.cloud_url.as_deref(),
            _ => None,
        }
    }

    /// Look up a value that the caller cannot proceed without
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| Error::MissingConfig(key.to_string()))
    }
}
