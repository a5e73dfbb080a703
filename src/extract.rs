//! Pull a `PromptAnalysis` out of a model reply that may wrap the
//! JSON in prose or code fences.
//!
//! The candidate document is the span from the first `{` to the last
//! `}` in the reply. When the surrounding prose has braces of its own
//! that span can cover unrelated text and fail to parse; that failure
//! is reported, not repaired. With no braces at all the whole reply is
//! the candidate.

use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Error;
use crate::PromptAnalysis;

// Greedy and dot-matches-newline, so pretty-printed objects are kept whole.
static OUTERMOST_BRACES: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?s)\{.*\}").expect("brace pattern is valid")
});

/// Candidate JSON document inside `text`
pub fn extract_json(text: &str) -> &str
{   match OUTERMOST_BRACES.find(text)
    {   Some(m) if !m.as_str().is_empty() => m.as_str()
      , _ => text
    }
}

/// Decode the analysis embedded in a raw model reply
pub fn extract_analysis(raw: &str) -> Result<PromptAnalysis, Error>
{   let candidate = extract_json(raw);
    trace!("Extraction candidate: {}", candidate);

    serde_json::from_str::<PromptAnalysis>(candidate)
      .map_err(|e| {
        debug!("Reply did not decode as an analysis: {}", e);
        Error::ResponseParsingFailed
        {   reason: e.to_string()
          , raw: raw.to_string()
        }
      })
}
