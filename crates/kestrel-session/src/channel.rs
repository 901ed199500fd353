use crate::{DeviceCommand, Error, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Value returned by a device command, if any
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput(Option<Value>);

impl CommandOutput {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn value(value: Value) -> Self {
        match value {
            Value::Null => Self(None),
            value => Self(Some(value)),
        }
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_value(&self) -> Option<&Value> {
        self.0.as_ref()
    }

    /// String form of the returned value. Objects render as
    /// `{key=value, key=value}`, the layout transaction summaries are
    /// parsed from.
    pub fn render(&self) -> Option<String> {
        self.0.as_ref().map(render_value)
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, render_value(v)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}

/// Request/response channel to the active device session
pub trait CommandChannel {
    fn execute(&mut self, command: &DeviceCommand) -> Result<CommandOutput>;
}

impl<C: CommandChannel + ?Sized> CommandChannel for &mut C {
    fn execute(&mut self, command: &DeviceCommand) -> Result<CommandOutput> {
        (**self).execute(command)
    }
}

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    script: &'a str,
    args: Vec<Value>,
}

#[derive(Deserialize)]
struct ExecuteResponse {
    #[serde(default)]
    value: Value,
}

/// Sends commands through the W3C WebDriver `execute/sync` endpoint of an
/// existing session
#[derive(Debug, Clone)]
pub struct WebDriverChannel {
    http: Client,
    session_url: Url,
}

impl WebDriverChannel {
    /// Attach to a session by its full URL, e.g.
    /// `https://lab.example.com/wd/hub/session/<id>`
    pub fn new(session_url: &str) -> Result<Self> {
        let session_url = Url::parse(session_url).map_err(kestrel_core::Error::from)?;
        let http = Client::builder()
            .user_agent(format!("kestrel/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, session_url })
    }

    /// Attach to session `session_id` on the grid at `cloud_url`
    pub fn from_session_id(cloud_url: &str, session_id: &str) -> Result<Self> {
        let mut url = Url::parse(cloud_url).map_err(kestrel_core::Error::from)?;
        url.path_segments_mut()
            .map_err(|_| Error::Channel(format!("'{}' cannot be a base URL", cloud_url)))?
            .pop_if_empty()
            .extend(["session", session_id]);
        Self::new(url.as_str())
    }

    pub fn session_url(&self) -> &Url {
        &self.session_url
    }

    fn execute_url(&self) -> Result<Url> {
        let mut url = self.session_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Channel(format!("'{}' cannot be a base URL", self.session_url)))?
            .pop_if_empty()
            .extend(["execute", "sync"]);
        Ok(url)
    }
}

impl CommandChannel for WebDriverChannel {
    fn execute(&mut self, command: &DeviceCommand) -> Result<CommandOutput> {
        let script = command.script();
        tracing::debug!("Executing device command: {}", script);

        let response = self
            .http
            .post(self.execute_url()?)
            .json(&ExecuteRequest {
                script: &script,
                args: vec![],
            })
            .send()?;

        let status = response.status();
        let body: ExecuteResponse = response.json().map_err(|e| {
            Error::Channel(format!(
                "{} returned an unreadable response (HTTP {}): {}",
                command.name(),
                status,
                e
            ))
        })?;

        if !status.is_success() {
            let message = body
                .value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no error message");
            return Err(Error::Channel(format!(
                "{} failed with HTTP {}: {}",
                command.name(),
                status,
                message
            )));
        }

        Ok(CommandOutput::value(body.value))
    }
}
