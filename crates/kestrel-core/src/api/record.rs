use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Aggregated metrics for one transaction, as served by the reporting API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionRecord {
    fields: Map<String, Value>,
}

impl TransactionRecord {
    /// Parse a response body, which must be a JSON object
    pub fn from_json(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::MalformedResponse(format!("body is not valid JSON: {}", e)))?;

        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(Error::MalformedResponse(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Raw JSON value of a property
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Property as a string. Strings are returned as-is, every other JSON
    /// type in its canonical JSON text form.
    pub fn property(&self, name: &str) -> Result<String> {
        match self.fields.get(name) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Ok(other.to_string()),
            None => Err(Error::MissingProperty(name.to_string())),
        }
    }

    /// Property as a number, accepting numeric strings
    pub fn numeric(&self, name: &str) -> Result<f64> {
        let value = self
            .fields
            .get(name)
            .ok_or_else(|| Error::MissingProperty(name.to_string()))?;

        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        parsed.ok_or_else(|| {
            Error::MalformedResponse(format!("property '{}' is not numeric: {}", name, value))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
