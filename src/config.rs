use anyhow::{Result, anyhow};
use std::path::PathBuf;

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const CREDENTIAL_FILE_NAME: &str = ".tars_api_key";

/// Runtime settings resolved once at startup.
///
/// The endpoint, model and system prompt are fixed; only the credential
/// location depends on the environment (the operator's home directory).
#[derive(Debug, Clone)]
pub struct Config {
    pub model: String,
    pub api_base_url: String,
    pub system_prompt: String,
    pub credential_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::with_home_dir(dirs::home_dir())
    }

    fn with_home_dir(home: Option<PathBuf>) -> Result<Self> {
        let home = home.ok_or_else(|| anyhow!("Could not determine home directory"))?;

        Ok(Self {
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            credential_path: credential_path_in(home),
        })
    }
}

fn credential_path_in(home: PathBuf) -> PathBuf {
    home.join(CREDENTIAL_FILE_NAME)
}
