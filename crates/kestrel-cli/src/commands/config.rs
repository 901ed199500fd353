use crate::{OutputFormat, csv_field};
use anyhow::Result;
use kestrel_core::config::{ACCESS_KEY, CLOUD_URL, Config, URL_FOR_APIS};

/// Mask all but the last four characters of a secret
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

/// Resolved configuration as displayable `(key, value)` rows
pub fn config_rows(config: &Config) -> Vec<(&'static str, Option<String>)> {
    vec![
        (URL_FOR_APIS, config.url_for_apis.clone()),
        (ACCESS_KEY, config.access_key.as_deref().map(mask)),
        (CLOUD_URL, config.cloud_url.clone()),
    ]
}

pub fn execute(config: &Config, format: OutputFormat) -> Result<()> {
    let rows = config_rows(config);

    match format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = rows
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.map_or(serde_json::Value::Null, Into::into)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        OutputFormat::Table => {
            println!("Key,Value");
            for (key, value) in rows {
                println!("{},{}", key, csv_field(&value.unwrap_or_default()));
            }
        }
        OutputFormat::Pretty => {
            use console::style;

            println!("\n{}", style("Configuration").bold().cyan());
            for (key, value) in rows {
                let shown = value.unwrap_or_else(|| style("<unset>").dim().to_string());
                println!("  {:12}  {}", key, shown);
            }
            println!();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_keeps_last_four() {
        assert_eq!(mask("abcdefgh"), "****efgh");
        assert_eq!(mask("abc"), "***");
    }

    #[test]
    fn test_rows_hide_access_key() {
        let config = Config {
            url_for_apis: Some("https://lab.example.com".to_string()),
            access_key: Some("eyJhbGciOiJIUzI1NiJ9".to_string()),
            cloud_url: None,
        };

        let rows = config_rows(&config);

        assert_eq!(rows[0].1.as_deref(), Some("https://lab.example.com"));
        assert_eq!(rows[1].1.as_deref(), Some("****************NiJ9"));
        assert_eq!(rows[2].1, None);
    }
}
