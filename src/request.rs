//! Inbound request type and the fixed user-message template

use serde::{Deserialize, Serialize};

/// Prefix put in front of every prompt sent for analysis
pub const ANALYZE_PREFIX: &str = "Analyze this prompt: ";

/// Body of `POST /analyze/{provider}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptRequest
{   /// The prompt text to analyze
    #[serde(default)]
    pub prompt: String
}

impl PromptRequest
{   pub fn new(prompt: impl Into<String>) -> Self
    {   PromptRequest
        {   prompt: prompt.into()
        }
    }

    /// Rejects a prompt that is empty after trimming
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.prompt.trim().is_empty()
        {   return Err(crate::error::Error::InvalidPrompt);
        }
        Ok(())
    }
}

/// Wrap the user's prompt in the analysis instruction
pub fn user_message(prompt: &str) -> String
{   format!("{}{}", ANALYZE_PREFIX, prompt)
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::error::Error;

    #[test]
    fn whitespace_only_prompts_are_rejected()
    {   for prompt in ["", " ", "\t\n", "   \r\n  "]
        {   assert_eq!(
              PromptRequest::new(prompt).validate(),
              Err(Error::InvalidPrompt),
              "prompt {:?} should be rejected", prompt
            );
        }
    }

    #[test]
    fn surrounding_whitespace_is_fine()
    {   assert!(PromptRequest::new("  hi  ").validate().is_ok());
    }

    #[test]
    fn missing_prompt_field_decodes_as_empty()
    {   let req: PromptRequest = serde_json::from_str("{}")
          .expect("empty object decodes");
        assert_eq!(req.validate(), Err(Error::InvalidPrompt));
    }

    #[test]
    fn user_message_wraps_prompt()
    {   assert_eq!(
          user_message("tell me a joke"),
          "Analyze this prompt: tell me a joke"
        );
    }
}
