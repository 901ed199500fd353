use anyhow::{Result, bail};
use kestrel_core::config::{CLOUD_URL, Config};
use kestrel_session::{PerformanceSession, WebDriverChannel};

/// The device session to attach to
#[derive(Debug, Clone)]
pub enum SessionTarget {
    /// Full session URL
    Url(String),
    /// Session id on the grid at `cloudUrl`
    Id(String),
}

impl SessionTarget {
    pub fn from_args(session_url: Option<String>, session_id: Option<String>) -> Result<Self> {
        match (session_url, session_id) {
            (Some(url), None) => Ok(SessionTarget::Url(url)),
            (None, Some(id)) => Ok(SessionTarget::Id(id)),
            (Some(_), Some(_)) => bail!("Use either --session-url or --session-id, not both"),
            (None, None) => bail!("A device session is required: pass --session-url or --session-id"),
        }
    }

    pub fn channel(&self, config: &Config) -> Result<WebDriverChannel> {
        let channel = match self {
            SessionTarget::Url(url) => WebDriverChannel::new(url)?,
            SessionTarget::Id(id) => {
                let cloud_url = config.require(CLOUD_URL)?;
                WebDriverChannel::from_session_id(cloud_url, id)?
            }
        };
        tracing::debug!("Attached to device session: {}", channel.session_url());
        Ok(channel)
    }
}

/// Start a capture. Like the session facade, an unrecognized level only
/// produces a warning.
pub fn execute_start(
    config: &Config,
    target: &SessionTarget,
    network_profile: &str,
    level: &str,
    application: &str,
) -> Result<()> {
    let mut session = PerformanceSession::new(target.channel(config)?);
    session.start_capture(network_profile, level, application);
    Ok(())
}

/// End a capture and print the raw transaction summary
pub fn execute_end(config: &Config, target: &SessionTarget, transaction_name: &str) -> Result<()> {
    let mut session = PerformanceSession::new(target.channel(config)?);
    let raw = session.end_capture(transaction_name)?;
    println!("{}", raw);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_requires_exactly_one_source() {
        assert!(SessionTarget::from_args(None, None).is_err());
        assert!(
            SessionTarget::from_args(Some("http://a/session/1".into()), Some("1".into())).is_err()
        );
        assert!(matches!(
            SessionTarget::from_args(None, Some("s-1".into())),
            Ok(SessionTarget::Id(id)) if id == "s-1"
        ));
    }

    #[test]
    fn test_session_id_needs_cloud_url() {
        let target = SessionTarget::Id("s-1".to_string());
        assert!(target.channel(&Config::default()).is_err());

        let config = Config {
            cloud_url: Some("https://lab.example.com/wd/hub".to_string()),
            ..Config::default()
        };
        let channel = target.channel(&config).unwrap();
        assert_eq!(
            channel.session_url().as_str(),
            "https://lab.example.com/wd/hub/session/s-1"
        );
    }
}
