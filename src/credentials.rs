use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::console::Terminal;

const KEY_PROMPT: &str = "Enter your Google API key: ";

/// API key persisted as a single plain-text file.
///
/// Nothing is cached in memory: every lookup re-reads the file, and the
/// operator is only asked when the file is missing, unreadable or blank.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn get_credential<T: Terminal + ?Sized>(&self, terminal: &mut T) -> String {
        if let Some(key) = self.load() {
            return key;
        }

        let key = match terminal.read_line(KEY_PROMPT) {
            Ok(Some(line)) => line.trim().to_string(),
            Ok(None) => {
                warn!("input closed before an API key was entered");
                String::new()
            }
            Err(err) => {
                warn!(error = %err, "failed to read API key from terminal");
                String::new()
            }
        };

        if !key.is_empty() {
            self.save(&key, terminal);
        }
        key
    }

    fn load(&self) -> Option<String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored API key");
                return None;
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "error reading API key; it will need to be entered again"
                );
                return None;
            }
        };

        let key = raw.trim();
        if key.is_empty() {
            debug!(path = %self.path.display(), "stored API key is blank");
            return None;
        }
        Some(key.to_string())
    }

    fn save<T: Terminal + ?Sized>(&self, key: &str, terminal: &mut T) {
        if let Err(err) = fs::write(&self.path, key) {
            warn!(
                path = %self.path.display(),
                error = %err,
                "could not save API key; it will be requested again next time"
            );
            return;
        }

        debug!(path = %self.path.display(), "stored API key");
        if let Err(err) = terminal.print_line("API key saved successfully.") {
            warn!(error = %err, "failed to confirm saved API key");
        }
    }
}
