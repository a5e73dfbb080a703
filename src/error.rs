use std::fmt;

/// Error type shared by the adapters, the analyzer and the server.
/// Implements Clone so a result can cross task boundaries intact
#[derive(Debug, Clone, PartialEq)]
pub enum Error
{   /// Prompt is empty or whitespace only
    InvalidPrompt
  , /// Credential for the named provider is not set
    CredentialMissing(String)
  , /// Non-2xx reply, or the call never completed (status is None)
    UpstreamRequestFailed
    {   status: Option<u16>
      , body: String
    }
  , /// Envelope decoded but held nothing to analyze
    InvalidUpstreamResponse(String)
  , /// Model reply (or envelope) could not be decoded
    ResponseParsingFailed
    {   reason: String
      , raw: String
    }
  , /// Any adapter failure other than a missing credential
    AnalysisFailed(Box<Error>)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Generic error
    Other(String)
}

impl Error
{   /// True when the failure means the provider cannot be used at all
    pub fn is_credential_missing(&self) -> bool
    {   matches!(self, Error::CredentialMissing(_))
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidPrompt => {
              write!(f, "prompt cannot be empty")
            }
          , Error::CredentialMissing(provider) => {
              write!(f, "{} API key not set", provider)
            }
          , Error::UpstreamRequestFailed { status: Some(code), body } => {
              write!(f,
                "request to LLM API failed with status {}: {}",
                code, body
              )
            }
          , Error::UpstreamRequestFailed { status: None, body } => {
              write!(f, "request to LLM API failed: {}", body)
            }
          , Error::InvalidUpstreamResponse(detail) => {
              write!(f, "invalid response from LLM API: {}", detail)
            }
          , Error::ResponseParsingFailed { reason, raw } => {
              write!(f,
                "failed to parse LLM API response: {}\nRaw response: {}",
                reason, raw
              )
            }
          , Error::AnalysisFailed(cause) => {
              write!(f, "Error analyzing prompt: {}", cause)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn credential_message_names_the_provider()
    {   let err = Error::CredentialMissing("Claude".to_string());
        assert_eq!(err.to_string(), "Claude API key not set");
        assert!(err.is_credential_missing());
    }

    #[test]
    fn upstream_failure_keeps_status_and_body()
    {   let err = Error::UpstreamRequestFailed
        {   status: Some(500)
          , body: "rate limited".to_string()
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("rate limited"));
    }

    #[test]
    fn analysis_failure_wraps_cause()
    {   let err = Error::AnalysisFailed(Box::new(
          Error::InvalidUpstreamResponse("no content".to_string())
        ));
        assert!(!err.is_credential_missing());
        assert_eq!(
          err.to_string(),
          "Error analyzing prompt: invalid response from LLM API: no content"
        );
    }
}
