use async_trait::async_trait;
use log::{debug, error, trace};
use serde::{Deserialize, Serialize};

use crate::config::{timeout_from_secs, ClaudeConfig};
use crate::error::Error;
use crate::providers::{
  decode_envelope, send_request, ChatMessage, LlmProvider,
  ProviderIdentity,
};
use crate::PromptAnalysis;

pub const CLAUDE_NAME: &str = "Claude";
const VERSION_HEADER: &str = "anthropic-version";

// ===== Message Types =====

#[derive(Debug, Clone, Serialize)]
pub struct ClaudeRequest
{   pub model: String
  , pub max_tokens: u32
  , pub messages: Vec<ChatMessage>
  , pub system: String
  , pub temperature: f64
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeResponse
{   #[serde(default)]
    pub content: Vec<ContentBlock>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock
{   #[serde(default)]
    pub text: String
}

// ===== Claude Adapter =====

/// Anthropic messages API. The instruction travels in the top-level
/// `system` field and the protocol version in its own header.
pub struct ClaudeProvider
{   identity: ProviderIdentity
  , http_client: reqwest::Client
}

impl ClaudeProvider
{   pub fn new(
      config: &ClaudeConfig
    , system_prompt: &str
    , api_key: Option<String>
    ) -> Result<Self, Error>
    {   debug!("Creating ClaudeProvider for model {}", config.model_id);
        let identity = ProviderIdentity
        {   name: CLAUDE_NAME.to_string()
          , api_key
          , api_url: config.api_url.clone()
          , model_id: config.model_id.clone()
          , max_tokens: config.max_tokens
          , temperature: config.temperature
          , version: Some(config.version.clone())
          , system_prompt: system_prompt.to_string()
          , timeout: timeout_from_secs(config.timeout_secs)
        };
        let http_client = identity.http_client()?;
        Ok(ClaudeProvider
        {   identity
          , http_client
        })
    }

    /// Request body for one analysis
    pub fn build_request(&self, prompt: &str) -> ClaudeRequest
    {   ClaudeRequest
        {   model: self.identity.model_id.clone()
          , max_tokens: self.identity.max_tokens
          , messages: vec![
              ChatMessage::user(crate::request::user_message(prompt))
            ]
          , system: self.identity.system_prompt.clone()
          , temperature: self.identity.temperature
        }
    }
}

/// Text of the first content block
pub fn unwrap_content(response: ClaudeResponse)
  -> Result<String, Error>
{   response.content
      .into_iter()
      .next()
      .map(|block| block.text)
      .ok_or_else(|| {
        error!("No content in Claude response");
        Error::InvalidUpstreamResponse(
          "Claude response contained no content".to_string()
        )
      })
}

#[async_trait]
impl LlmProvider for ClaudeProvider
{   fn name(&self) -> &str
    {   &self.identity.name
    }

    fn is_available(&self) -> bool
    {   self.identity.has_api_key()
    }

    async fn analyze_prompt(&self, prompt: &str)
      -> Result<PromptAnalysis, Error>
    {   let api_key = self.identity.api_key()?;
        debug!(
          "Sending analysis to {} ({})",
          self.identity.name, self.identity.model_id
        );

        let request = self.build_request(prompt);
        trace!("Claude request: {:?}", request);

        let mut builder = self.http_client
          .post(&self.identity.api_url)
          .header("Content-Type", "application/json")
          .header("x-api-key", api_key);
        if let Some(version) = &self.identity.version
        {   builder = builder.header(VERSION_HEADER, version);
        }

        let body = send_request(
          &self.identity.name,
          builder.json(&request)
        ).await?;

        let envelope: ClaudeResponse
          = decode_envelope(&self.identity.name, &body)?;
        let text = unwrap_content(envelope)?;
        crate::extract::extract_analysis(&text)
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    fn provider(api_key: Option<&str>) -> ClaudeProvider
    {   ClaudeProvider::new(
          &ClaudeConfig::default(),
          "Return JSON.",
          api_key.map(str::to_string)
        ).expect("client builds")
    }

    #[test]
    fn availability_follows_credential()
    {   assert!(provider(Some("k")).is_available());
        assert!(!provider(None).is_available());
        assert!(!provider(Some("")).is_available());
    }

    #[test]
    fn request_body_shape()
    {   let p = provider(Some("k"));
        let body = serde_json::to_value(p.build_request("hi"))
          .expect("serializes");
        assert_eq!(body["model"], "claude-3-5-sonnet-20241022");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["system"], "Return JSON.");
        assert_eq!(body["messages"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(
          body["messages"][0]["content"],
          "Analyze this prompt: hi"
        );
        assert!(body["temperature"].is_number());
    }

    #[test]
    fn empty_content_is_invalid()
    {   let envelope: ClaudeResponse
          = serde_json::from_str(r#"{"content":[]}"#).expect("decodes");
        assert!(matches!(
          unwrap_content(envelope),
          Err(Error::InvalidUpstreamResponse(_))
        ));
    }

    #[test]
    fn missing_credential_fails_before_any_call()
    {   let p = provider(None);
        let result = tokio_test::block_on(p.analyze_prompt("hi"));
        assert_eq!(
          result,
          Err(Error::CredentialMissing("Claude".to_string()))
        );
    }
}
