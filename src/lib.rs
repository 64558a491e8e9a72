pub mod completion;
pub mod config;
pub mod console;
pub mod credentials;
pub mod logging;
pub mod model;
pub mod oneshot;
pub mod providers;
pub mod session;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use reqwest::Client;
use std::env;
use std::ffi::OsString;
use tracing::info;

use completion::CompletionClient;
use config::Config;
use console::Console;
use credentials::CredentialStore;
use oneshot::run_once;
use session::ChatSession;

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Interactive,
    SingleShot { query: String },
}

impl Invocation {
    /// `args` excludes the program name. Arguments that are not valid
    /// Unicode are converted lossily.
    pub fn from_args(args: impl IntoIterator<Item = OsString>) -> Self {
        let args: Vec<String> = args
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        if args.is_empty() {
            Self::Interactive
        } else {
            Self::SingleShot {
                query: args.join(" "),
            }
        }
    }
}

pub async fn run() -> Result<()> {
    let cfg = Config::from_env()?;
    info!(
        model = %cfg.model,
        api_base_url = %cfg.api_base_url,
        credential_path = %cfg.credential_path.display(),
        "loaded runtime configuration"
    );

    let client = Client::builder()
        .build()
        .context("Failed to initialize HTTP client")?;
    let credentials = CredentialStore::new(cfg.credential_path.clone());
    let completion = CompletionClient::new(&client, &cfg, &credentials);

    match Invocation::from_args(env::args_os().skip(1)) {
        Invocation::Interactive => {
            let mut session = ChatSession::new(&completion, &cfg.system_prompt);
            session.run(Console::stdio()).await;
            Ok(())
        }
        Invocation::SingleShot { query } => {
            run_once(&completion, &cfg.system_prompt, &query, Console::stdio()).await
        }
    }
}
