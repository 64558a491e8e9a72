use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::Message;
use crate::providers::http_errors::{ApiStatusError, model_api_request_error};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn chat_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

pub async fn chat(
    client: &Client,
    cfg: &Config,
    api_key: &str,
    messages: &[Message],
) -> Result<String> {
    let api_url = chat_url(&cfg.api_base_url);
    let body = ChatCompletionRequest {
        model: &cfg.model,
        messages,
    };
    debug!(
        api_url = %api_url,
        model = %cfg.model,
        message_count = messages.len(),
        "sending chat completion request"
    );

    let response = client
        .post(&api_url)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            warn!(
                api_url = %api_url,
                model = %cfg.model,
                error = %err,
                "chat completion request failed"
            );
            model_api_request_error(err, &api_url)
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            model = %cfg.model,
            status = %status,
            response_body_len = response_body.len(),
            "model API returned non-success status"
        );
        return Err(ApiStatusError::new(status, response_body).into());
    }

    let parsed: ChatCompletionResponse = response
        .json()
        .await
        .context("Failed to parse chat completion response")?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Chat completion response contained no choices"))?
        .message
        .content
        .ok_or_else(|| anyhow!("Chat completion response had no message content"))?;
    debug!(
        model = %cfg.model,
        response_len = content.len(),
        "received chat completion response"
    );
    Ok(content)
}
