//! Configuration for the server, the providers and the analysis
//! instruction. Read once at startup from `config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Environment variable holding the Claude credential
pub const CLAUDE_API_KEY_ENV: &str = "CLAUDE_API_KEY";
/// Environment variable holding the OpenAI credential
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Places searched when no path is given, in order
pub const DEFAULT_CONFIG_PATHS: [&str; 2]
  = ["config.toml", "config/config.toml"];

const DEFAULT_SYSTEM_PROMPT: &str
  = "You are a prompt analysis assistant. Analyze the user's prompt and \
     respond with only a JSON object of the form {\"tokenCount\": int, \
     \"promptType\": string, \"containsPII\": bool, \"isSuspicious\": bool, \
     \"riskScore\": int from 0 to 100}. Do not include any other text.";

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig
{   /// Listening port
    pub port: u16
  , /// Serve the HTML demo pages
    pub demo_ui: bool
  , /// Cap on concurrent analyses; unlimited when absent
    pub max_in_flight: Option<usize>
}

impl Default for ServerConfig
{   fn default() -> Self
    {   ServerConfig
        {   port: 8080
          , demo_ui: false
          , max_in_flight: None
        }
    }
}

/// Anthropic messages API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaudeConfig
{   pub api_url: String
  , pub model_id: String
  , pub max_tokens: u32
  , pub temperature: f64
  , /// Sent as the `anthropic-version` header
    pub version: String
  , /// Outbound request timeout; none when absent
    pub timeout_secs: Option<u64>
}

impl Default for ClaudeConfig
{   fn default() -> Self
    {   ClaudeConfig
        {   api_url: "https://api.anthropic.com/v1/messages".to_string()
          , model_id: "claude-3-5-sonnet-20241022".to_string()
          , max_tokens: 1000
          , temperature: 0.0
          , version: "2023-06-01".to_string()
          , timeout_secs: None
        }
    }
}

/// OpenAI chat completions settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatGptConfig
{   pub api_url: String
  , pub model_id: String
  , pub max_tokens: u32
  , pub temperature: f64
  , /// Outbound request timeout; none when absent
    pub timeout_secs: Option<u64>
}

impl Default for ChatGptConfig
{   fn default() -> Self
    {   ChatGptConfig
        {   api_url: "https://api.openai.com/v1/chat/completions".to_string()
          , model_id: "gpt-4o-mini".to_string()
          , max_tokens: 1000
          , temperature: 0.0
          , timeout_secs: None
        }
    }
}

/// Instruction shared by every provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig
{   pub system_prompt: String
}

impl Default for AnalysisConfig
{   fn default() -> Self
    {   AnalysisConfig
        {   system_prompt: DEFAULT_SYSTEM_PROMPT.to_string()
        }
    }
}

/// Whole application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig
{   pub server: ServerConfig
  , pub claude: ClaudeConfig
  , pub chatgpt: ChatGptConfig
  , pub analysis: AnalysisConfig
}

impl AppConfig
{   /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self, Error>
    {   toml::from_str(text).map_err(|e| {
          Error::InvalidConfiguration(
            format!("failed to parse config: {}", e)
          )
        })
    }

    /// Read configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, Error>
    {   debug!("Reading config from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| {
          Error::InvalidConfiguration(format!(
            "failed to read config file {}: {}",
            path.display(), e
          ))
        })?;
        AppConfig::from_toml(&text)
    }

    /// Load from `path` if given, else the first default location
    /// that exists
    pub fn load(path: Option<&Path>) -> Result<Self, Error>
    {   if let Some(path) = path
        {   return AppConfig::from_file(path);
        }
        let found: Option<PathBuf> = DEFAULT_CONFIG_PATHS
          .iter()
          .map(PathBuf::from)
          .find(|p| p.is_file());
        match found
        {   Some(path) => AppConfig::from_file(&path)
          , None => Err(Error::InvalidConfiguration(format!(
              "failed to read config file: none of {:?} found",
              DEFAULT_CONFIG_PATHS
            )))
        }
    }
}

/// Timeout from an optional seconds value
pub fn timeout_from_secs(secs: Option<u64>) -> Option<Duration>
{   secs.map(Duration::from_secs)
}

/// Load a `.env` file from the working directory (or a parent) into
/// the process environment. Variables already set are left alone.
///
/// A missing file is not an error: `Ok(None)` is returned.
pub fn load_dotenv() -> Result<Option<PathBuf>, Error>
{   match dotenvy::dotenv()
    {   Ok(path) => {
          debug!("Loaded environment from {}", path.display());
          Ok(Some(path))
        }
      , Err(e) if e.not_found() => Ok(None)
      , Err(e) => Err(Error::InvalidConfiguration(
          format!("failed to load .env file: {}", e)
        ))
    }
}

/// Like `load_dotenv`, from an explicit file
pub fn load_dotenv_from(path: &Path) -> Result<Option<PathBuf>, Error>
{   match dotenvy::from_path(path)
    {   Ok(()) => {
          debug!("Loaded environment from {}", path.display());
          Ok(Some(path.to_path_buf()))
        }
      , Err(e) if e.not_found() => Ok(None)
      , Err(e) => Err(Error::InvalidConfiguration(
          format!("failed to load {}: {}", path.display(), e)
        ))
    }
}

/// Provider credentials, read once and handed to the adapters
#[derive(Clone, Default)]
pub struct Credentials
{   pub claude_api_key: Option<String>
  , pub openai_api_key: Option<String>
}

impl Credentials
{   /// Read credentials from the process environment
    pub fn from_env() -> Self
    {   Credentials
        {   claude_api_key: read_key(CLAUDE_API_KEY_ENV)
          , openai_api_key: read_key(OPENAI_API_KEY_ENV)
        }
    }
}

// Keys must never reach the logs.
impl std::fmt::Debug for Credentials
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   f.debug_struct("Credentials")
          .field("claude_api_key", &self.claude_api_key.is_some())
          .field("openai_api_key", &self.openai_api_key.is_some())
          .finish()
    }
}

fn read_key(var: &str) -> Option<String>
{   std::env::var(var)
      .ok()
      .filter(|v| !v.is_empty())
}
