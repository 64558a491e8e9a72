use anyhow::{Context, Result};
use tracing::{debug, error};

use crate::completion::{ChatBackend, CompletionClient};
use crate::console::{self, Terminal, USER_PROMPT};
use crate::model::Message;

const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "bye"];
const FAREWELL: &str = "Goodbye.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    AwaitInput,
    Respond,
    Terminate,
}

/// Interactive conversation that keeps every turn in memory.
pub struct ChatSession<'a, B> {
    completion: &'a CompletionClient<'a, B>,
    history: Vec<Message>,
}

impl<'a, B: ChatBackend> ChatSession<'a, B> {
    pub fn new(completion: &'a CompletionClient<'a, B>, system_prompt: &str) -> Self {
        Self {
            completion,
            history: vec![Message::system(system_prompt)],
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Runs until an exit command or end of input.
    ///
    /// Terminal failures end the session; they are logged rather than
    /// returned. The farewell is written through the terminal, so it is
    /// printed first and the terminal is dropped afterwards, before this
    /// returns.
    pub async fn run<T: Terminal>(&mut self, mut terminal: T) {
        if let Err(err) = self.drive(&mut terminal).await {
            error!(error = %format!("{err:#}"), "chat session ended with an error");
        }
        drop(terminal);
    }

    async fn drive<T: Terminal>(&mut self, terminal: &mut T) -> Result<()> {
        let mut state = SessionState::AwaitInput;
        loop {
            state = match state {
                SessionState::AwaitInput => self.await_input(terminal)?,
                SessionState::Respond => self.respond(terminal).await?,
                SessionState::Terminate => {
                    terminal
                        .print_line(&console::agent_line(FAREWELL))
                        .context("Failed to write farewell")?;
                    return Ok(());
                }
            };
        }
    }

    fn await_input<T: Terminal>(&mut self, terminal: &mut T) -> Result<SessionState> {
        let Some(line) = terminal
            .read_line(USER_PROMPT)
            .context("Failed to read operator input")?
        else {
            debug!("operator input closed");
            return Ok(SessionState::Terminate);
        };

        if is_exit_command(&line) {
            debug!(turns = self.turns(), "operator ended the session");
            return Ok(SessionState::Terminate);
        }

        self.history.push(Message::user(line));
        Ok(SessionState::Respond)
    }

    async fn respond<T: Terminal>(&mut self, terminal: &mut T) -> Result<SessionState> {
        let reply = self.completion.complete(&self.history, terminal).await;
        let line = console::agent_line(&reply);
        self.history.push(Message::assistant(reply));

        terminal
            .print_line(&line)
            .context("Failed to write reply")?;
        Ok(SessionState::AwaitInput)
    }

    fn turns(&self) -> usize {
        (self.history.len() - 1) / 2
    }
}

pub fn is_exit_command(line: &str) -> bool {
    let command = line.trim().to_lowercase();
    EXIT_COMMANDS.contains(&command.as_str())
}
