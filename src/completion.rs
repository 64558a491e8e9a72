use anyhow::Result;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, error};

use crate::config::Config;
use crate::console::Terminal;
use crate::credentials::CredentialStore;
use crate::model::Message;
use crate::providers::http_errors::ApiStatusError;
use crate::providers::openai;

pub const FALLBACK_REPLY: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + 'a>>;

/// One chat-completion round trip: history in, reply text out.
pub trait ChatBackend {
    fn chat<'a>(&'a self, api_key: &'a str, messages: &'a [Message]) -> ChatFuture<'a>;
}

pub struct HttpChatBackend<'a> {
    client: &'a Client,
    cfg: &'a Config,
}

impl<'a> HttpChatBackend<'a> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self { client, cfg }
    }
}

impl ChatBackend for HttpChatBackend<'_> {
    fn chat<'a>(&'a self, api_key: &'a str, messages: &'a [Message]) -> ChatFuture<'a> {
        Box::pin(async move { openai::chat(self.client, self.cfg, api_key, messages).await })
    }
}

pub struct CompletionClient<'a, B> {
    credentials: &'a CredentialStore,
    backend: B,
}

impl<'a> CompletionClient<'a, HttpChatBackend<'a>> {
    pub fn new(client: &'a Client, cfg: &'a Config, credentials: &'a CredentialStore) -> Self {
        Self::with_backend(credentials, HttpChatBackend::new(client, cfg))
    }
}

impl<'a, B> CompletionClient<'a, B> {
    pub fn with_backend(credentials: &'a CredentialStore, backend: B) -> Self {
        Self {
            credentials,
            backend,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: ChatBackend> CompletionClient<'_, B> {
    /// Sends the full history and returns the reply.
    ///
    /// Failures never reach the caller: they are logged and replaced by
    /// [`FALLBACK_REPLY`].
    pub async fn complete<T: Terminal + ?Sized>(
        &self,
        messages: &[Message],
        terminal: &mut T,
    ) -> String {
        let api_key = self.credentials.get_credential(terminal);
        debug!(
            message_count = messages.len(),
            last_role = messages.last().map_or("none", |msg| msg.role.as_str()),
            "requesting completion"
        );

        match self.backend.chat(&api_key, messages).await {
            Ok(content) => content,
            Err(err) => {
                report_failure(&err);
                FALLBACK_REPLY.to_string()
            }
        }
    }
}

fn report_failure(err: &anyhow::Error) {
    error!(error = %format!("{err:#}"), "error communicating with model API");
    if let Some(payload) = err
        .downcast_ref::<ApiStatusError>()
        .and_then(ApiStatusError::payload)
    {
        error!(payload = %payload, "model API error payload");
    }
}
