//! LLM provider implementations

pub mod claude;
pub mod chatgpt;

use std::time::Duration;

use async_trait::async_trait;
use log::{error, trace};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::PromptAnalysis;

// Re-export for convenience
pub use chatgpt::ChatGptProvider;
pub use claude::ClaudeProvider;

/// What every backend offers the analyzer.
///
/// Implementations hold only read-only configuration, so one value
/// can serve any number of concurrent requests.
#[async_trait]
pub trait LlmProvider: Send + Sync
{   /// Stable display name, used in error messages
    fn name(&self) -> &str;

    /// True when a credential is configured. Does not contact the
    /// remote service.
    fn is_available(&self) -> bool;

    /// Ask the provider to analyze `prompt`
    async fn analyze_prompt(&self, prompt: &str)
      -> Result<PromptAnalysis, Error>;
}

/// Fixed facts about one provider, loaded at startup
#[derive(Clone)]
pub struct ProviderIdentity
{   pub name: String
  , pub api_key: Option<String>
  , pub api_url: String
  , pub model_id: String
  , pub max_tokens: u32
  , pub temperature: f64
  , /// Protocol version header value, for APIs that need one
    pub version: Option<String>
  , pub system_prompt: String
  , pub timeout: Option<Duration>
}

impl ProviderIdentity
{   /// Credential, or `CredentialMissing` when unset
    pub fn api_key(&self) -> Result<&str, Error>
    {   match self.api_key.as_deref()
        {   Some(key) if !key.is_empty() => Ok(key)
          , _ => Err(Error::CredentialMissing(self.name.clone()))
        }
    }

    pub fn has_api_key(&self) -> bool
    {   self.api_key().is_ok()
    }

    /// Build the HTTP client for this provider
    pub fn http_client(&self) -> Result<reqwest::Client, Error>
    {   let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout
        {   builder = builder.timeout(timeout);
        }
        builder.build().map_err(|e| {
          Error::InvalidConfiguration(format!(
            "{} HTTP client: {}", self.name, e
          ))
        })
    }
}

impl std::fmt::Debug for ProviderIdentity
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   f.debug_struct("ProviderIdentity")
          .field("name", &self.name)
          .field("api_key", &self.api_key.is_some())
          .field("api_url", &self.api_url)
          .field("model_id", &self.model_id)
          .field("max_tokens", &self.max_tokens)
          .field("temperature", &self.temperature)
          .field("version", &self.version)
          .field("timeout", &self.timeout)
          .finish()
    }
}

// ===== Message Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

impl ChatMessage
{   pub fn system(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "system".to_string()
          , content: content.into()
        }
    }

    pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "user".to_string()
          , content: content.into()
        }
    }
}

/// Send a prepared request and return the body of a 2xx reply.
/// No retry: a failed call is final.
pub(crate) async fn send_request(
  provider: &str
, request: reqwest::RequestBuilder
) -> Result<String, Error>
{   let response = request
      .send()
      .await
      .map_err(|e| {
        error!("{} HTTP error: {}", provider, e);
        Error::UpstreamRequestFailed
        {   status: None
          , body: e.to_string()
        }
      })?;

    let status = response.status();
    trace!("{} response status: {}", provider, status);

    let body = response.text().await.map_err(|e| {
      error!("{} failed reading response: {}", provider, e);
      Error::UpstreamRequestFailed
      {   status: Some(status.as_u16())
        , body: format!("error reading response: {}", e)
      }
    })?;

    if !status.is_success()
    {   error!("{} API error {}: {}", provider, status, body);
        return Err(Error::UpstreamRequestFailed
        {   status: Some(status.as_u16())
          , body
        });
    }

    trace!("{} response body: {}", provider, body);
    Ok(body)
}

/// Decode a provider envelope
pub(crate) fn decode_envelope<T>(provider: &str, body: &str)
  -> Result<T, Error>
where
  T: serde::de::DeserializeOwned
{   serde_json::from_str(body).map_err(|e| {
      error!("{} envelope parse error: {}", provider, e);
      Error::ResponseParsingFailed
      {   reason: e.to_string()
        , raw: body.to_string()
      }
    })
}
