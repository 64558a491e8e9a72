use anyhow::{Context, Result};
use tracing::debug;

use crate::completion::{ChatBackend, CompletionClient};
use crate::console::{self, Terminal};
use crate::model::Message;

/// Answers a single query with a fresh `[system, user]` history.
///
/// The terminal is only used for the credential prompt and the reply, and is
/// dropped before returning on every path.
pub async fn run_once<B, T>(
    completion: &CompletionClient<'_, B>,
    system_prompt: &str,
    query: &str,
    mut terminal: T,
) -> Result<()>
where
    B: ChatBackend,
    T: Terminal,
{
    let messages = [Message::system(system_prompt), Message::user(query)];
    debug!(query_len = query.len(), "running single query");

    let reply = completion.complete(&messages, &mut terminal).await;
    let result = terminal
        .print_line(&console::agent_line(&reply))
        .context("Failed to write reply");
    drop(terminal);
    result
}
