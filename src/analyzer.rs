//! Validate a request, hand it to one provider, time the call.
//!
//! Stateless: nothing is cached, retried or shared between calls.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::error::Error;
use crate::providers::LlmProvider;
use crate::request::PromptRequest;
use crate::AnalysisResult;

/// Run one analysis against `provider`.
///
/// Fails with `CredentialMissing` or `InvalidPrompt` before any network
/// call; any other provider failure comes back as `AnalysisFailed`.
pub async fn analyze(
  provider: &dyn LlmProvider
, request: &PromptRequest
) -> Result<AnalysisResult, Error>
{   if !provider.is_available()
    {   warn!("{} is not available", provider.name());
        return Err(Error::CredentialMissing(provider.name().to_string()));
    }

    request.validate()?;

    debug!("Dispatching analysis to {}", provider.name());
    let started = Instant::now();

    let analysis = provider
      .analyze_prompt(&request.prompt)
      .await
      .map_err(classify)?;

    let latency_ms = elapsed_millis(started.elapsed());
    info!(
      "{} analysis done in {} ms (risk {})",
      provider.name(), latency_ms, analysis.risk_score
    );

    Ok(AnalysisResult
    {   analysis
      , latency_ms
    })
}

// Credential failures stay as they are; the rest become AnalysisFailed.
fn classify(err: Error) -> Error
{   if err.is_credential_missing()
    {   return err;
    }
    match err
    {   Error::AnalysisFailed(_) => err
      , other => {
          warn!("Analysis failed: {}", other);
          Error::AnalysisFailed(Box::new(other))
        }
    }
}

// Saturates instead of wrapping past u64::MAX milliseconds.
fn elapsed_millis(elapsed: Duration) -> u64
{   u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
