use anyhow::anyhow;
use reqwest::StatusCode;
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;
use std::io::ErrorKind;

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::ConnectionRefused
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("connection refused")
        {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::TimedOut
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("timed out")
        {
            return true;
        }

        current = source.source();
    }

    false
}

pub(crate) fn model_api_request_error(err: reqwest::Error, api_url: &str) -> anyhow::Error {
    if err.is_timeout() || error_chain_has_timeout(&err) {
        return anyhow!("Model request timed out while calling '{}'.", api_url);
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return anyhow!(
                "Connection refused by model API at '{}'. Check network connectivity.",
                api_url
            );
        }

        return anyhow!(
            "Failed to connect to model API at '{}'. Check network connectivity: {}",
            api_url,
            err
        );
    }

    anyhow!("Failed to call model API at '{}': {}", api_url, err)
}

/// Non-success HTTP status from the model API.
///
/// Keeps the structured `error` object when the body carried one so callers
/// can log it alongside the message.
#[derive(Debug, Clone)]
pub struct ApiStatusError {
    status: StatusCode,
    payload: Option<Value>,
    body: String,
}

impl ApiStatusError {
    pub fn new(status: StatusCode, body: String) -> Self {
        Self {
            status,
            payload: parse_error_payload(&body),
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    fn payload_message(&self) -> Option<&str> {
        self.payload.as_ref()?.get("message")?.as_str()
    }
}

impl fmt::Display for ApiStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload_message() {
            Some(message) => write!(
                f,
                "Model request failed with status {}: {}",
                self.status, message
            ),
            None => write!(
                f,
                "Model request failed with status {}: {}",
                self.status, self.body
            ),
        }
    }
}

impl StdError for ApiStatusError {}

// OpenAI-compatible endpoints answer `{"error": {...}}`; some gateways wrap
// that object in a one-element array.
fn parse_error_payload(body: &str) -> Option<Value> {
    let parsed: Value = serde_json::from_str(body.trim()).ok()?;
    let envelope = match &parsed {
        Value::Array(items) => items.first()?,
        other => other,
    };
    envelope.get("error").filter(|error| error.is_object()).cloned()
}
