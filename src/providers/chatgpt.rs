use async_trait::async_trait;
use log::{debug, error, trace};
use serde::{Deserialize, Serialize};

use crate::config::{timeout_from_secs, ChatGptConfig};
use crate::error::Error;
use crate::providers::{
  decode_envelope, send_request, ChatMessage, LlmProvider,
  ProviderIdentity,
};
use crate::PromptAnalysis;

pub const CHATGPT_NAME: &str = "ChatGPT";

// ===== Message Types =====

#[derive(Debug, Clone, Serialize)]
pub struct ChatGptRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub max_tokens: u32
  , pub temperature: f64
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatGptResponse
{   #[serde(default)]
    pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   #[serde(default)]
    pub message: ChoiceMessage
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoiceMessage
{   #[serde(default)]
    pub content: String
}

// ===== ChatGPT Adapter =====

/// OpenAI chat completions API. The instruction is sent as a leading
/// `system` message and auth is a bearer token.
pub struct ChatGptProvider
{   identity: ProviderIdentity
  , http_client: reqwest::Client
}

impl ChatGptProvider
{   pub fn new(
      config: &ChatGptConfig
    , system_prompt: &str
    , api_key: Option<String>
    ) -> Result<Self, Error>
    {   debug!("Creating ChatGptProvider for model {}", config.model_id);
        let identity = ProviderIdentity
        {   name: CHATGPT_NAME.to_string()
          , api_key
          , api_url: config.api_url.clone()
          , model_id: config.model_id.clone()
          , max_tokens: config.max_tokens
          , temperature: config.temperature
          , version: None
          , system_prompt: system_prompt.to_string()
          , timeout: timeout_from_secs(config.timeout_secs)
        };
        let http_client = identity.http_client()?;
        Ok(ChatGptProvider
        {   identity
          , http_client
        })
    }

    /// Request body for one analysis
    pub fn build_request(&self, prompt: &str) -> ChatGptRequest
    {   ChatGptRequest
        {   model: self.identity.model_id.clone()
          , messages: vec![
              ChatMessage::system(self.identity.system_prompt.clone())
            , ChatMessage::user(crate::request::user_message(prompt))
            ]
          , max_tokens: self.identity.max_tokens
          , temperature: self.identity.temperature
        }
    }
}

/// Message text of the first choice
pub fn unwrap_choice(response: ChatGptResponse)
  -> Result<String, Error>
{   response.choices
      .into_iter()
      .next()
      .map(|c| c.message.content)
      .ok_or_else(|| {
        error!("No choices in ChatGPT response");
        Error::InvalidUpstreamResponse(
          "ChatGPT response contained no choices".to_string()
        )
      })
}

#[async_trait]
impl LlmProvider for ChatGptProvider
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
        trace!("ChatGPT request: {:?}", request);

        let builder = self.http_client
          .post(&self.identity.api_url)
          .header("Content-Type", "application/json")
          .header("Authorization", format!("Bearer {}", api_key))
          .json(&request);

        let body = send_request(&self.identity.name, builder).await?;

        let envelope: ChatGptResponse
          = decode_envelope(&self.identity.name, &body)?;
        let text = unwrap_choice(envelope)?;
        crate::extract::extract_analysis(&text)
    }
}
