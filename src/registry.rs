//! Named set of providers, built once at startup

use std::sync::Arc;

use log::debug;

use crate::config::{AppConfig, Credentials};
use crate::error::Error;
use crate::providers::{ChatGptProvider, ClaudeProvider, LlmProvider};

/// Route key for the Claude adapter
pub const CLAUDE_KEY: &str = "claude";
/// Route key for the ChatGPT adapter
pub const CHATGPT_KEY: &str = "chatgpt";

/// Providers by route key, in registration order
#[derive(Clone, Default)]
pub struct ProviderRegistry
{   providers: Vec<(String, Arc<dyn LlmProvider>)>
}

impl ProviderRegistry
{   pub fn new() -> Self
    {   ProviderRegistry::default()
    }

    /// Both built-in adapters, configured from `config` and `credentials`
    pub fn from_config(
      config: &AppConfig
    , credentials: &Credentials
    ) -> Result<Self, Error>
    {   let system_prompt = &config.analysis.system_prompt;
        let claude = ClaudeProvider::new(
          &config.claude,
          system_prompt,
          credentials.claude_api_key.clone()
        )?;
        let chatgpt = ChatGptProvider::new(
          &config.chatgpt,
          system_prompt,
          credentials.openai_api_key.clone()
        )?;

        let mut registry = ProviderRegistry::new();
        registry.register(CLAUDE_KEY, Arc::new(claude));
        registry.register(CHATGPT_KEY, Arc::new(chatgpt));
        Ok(registry)
    }

    /// Add a provider; a later registration under the same key wins
    pub fn register(
      &mut self
    , key: impl Into<String>
    , provider: Arc<dyn LlmProvider>
    )
    {   let key = key.into();
        debug!("Registering provider {} as {}", provider.name(), key);
        self.providers.retain(|(k, _)| *k != key);
        self.providers.push((key, provider));
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn LlmProvider>>
    {   self.providers
          .iter()
          .find(|(k, _)| k == key)
          .map(|(_, p)| p.clone())
    }

    pub fn iter(&self)
      -> impl Iterator<Item = (&str, &Arc<dyn LlmProvider>)>
    {   self.providers.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn len(&self) -> usize
    {   self.providers.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn built_in_providers_follow_credentials()
    {   let credentials = Credentials
        {   claude_api_key: Some("ck".to_string())
          , openai_api_key: None
        };
        let registry = ProviderRegistry::from_config(
          &AppConfig::default(),
          &credentials
        ).expect("registry builds");

        assert_eq!(registry.len(), 2);
        let keys: Vec<&str> = registry.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![CLAUDE_KEY, CHATGPT_KEY]);

        let claude = registry.get(CLAUDE_KEY).expect("claude");
        assert_eq!(claude.name(), "Claude");
        assert!(claude.is_available());

        let chatgpt = registry.get(CHATGPT_KEY).expect("chatgpt");
        assert_eq!(chatgpt.name(), "ChatGPT");
        assert!(!chatgpt.is_available());
    }

    #[test]
    fn unknown_key_is_absent()
    {   let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("gemini").is_none());
    }

    #[test]
    fn later_registration_replaces_earlier()
    {   let mut registry = ProviderRegistry::from_config(
          &AppConfig::default(),
          &Credentials::default()
        ).expect("registry builds");
        let claude = registry.get(CLAUDE_KEY).expect("claude");
        registry.register(CHATGPT_KEY, claude);

        assert_eq!(registry.len(), 2);
        let chatgpt = registry.get(CHATGPT_KEY).expect("chatgpt key");
        assert_eq!(chatgpt.name(), "Claude");
    }
}
