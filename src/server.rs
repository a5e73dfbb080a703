//! HTTP routes: `POST /analyze/{provider}` per registered provider,
//! plus the demo pages when enabled.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use log::{debug, error, info};
use tokio::sync::Semaphore;

use crate::config::AppConfig;
use crate::error::Error;
use crate::providers::LlmProvider;
use crate::registry::ProviderRegistry;
use crate::request::PromptRequest;
use crate::AnalysisResult;

/// Shared, read-only state behind every route
#[derive(Clone)]
pub struct AppState
{   pub registry: Arc<ProviderRegistry>
  , /// Gate on concurrent analyses, when configured
    pub limiter: Option<Arc<Semaphore>>
  , pub demo_ui: bool
}

impl AppState
{   pub fn new(registry: ProviderRegistry, config: &AppConfig) -> Self
    {   AppState
        {   registry: Arc::new(registry)
          , limiter: config.server.max_in_flight
              .map(|n| Arc::new(Semaphore::new(n.max(1))))
          , demo_ui: config.server.demo_ui
        }
    }
}

/// Path served for a provider route key
pub fn analyze_path(key: &str) -> String
{   format!("/analyze/{}", key)
}

/// Build the application router
pub fn router(state: AppState) -> Router
{   let mut router: Router<AppState> = Router::new();

    for (key, provider) in state.registry.iter()
    {   let provider = provider.clone();
        router = router.route(
          &analyze_path(key),
          post(move |State(state): State<AppState>, body: Bytes| {
            let provider = provider.clone();
            async move { handle_analyze(state, provider, body).await }
          })
        );
    }

    if state.demo_ui
    {   router = router.merge(crate::demo::routes());
    }

    router
      .with_state(state)
      .layer(middleware::from_fn(log_requests))
}

/// Transport status for an error
pub fn status_for(err: &Error) -> StatusCode
{   match err
    {   Error::InvalidPrompt => StatusCode::BAD_REQUEST
      , Error::CredentialMissing(_) => StatusCode::SERVICE_UNAVAILABLE
      , _ => StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(err: &Error) -> Response
{   (status_for(err), err.to_string()).into_response()
}

async fn handle_analyze(
  state: AppState
, provider: Arc<dyn LlmProvider>
, body: Bytes
) -> Response
{   if !provider.is_available()
    {   return error_response(
          &Error::CredentialMissing(provider.name().to_string())
        );
    }

    let request: PromptRequest = match serde_json::from_slice(&body)
    {   Ok(request) => request
      , Err(e) => {
          debug!("Rejected request body: {}", e);
          return (
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", e)
          ).into_response();
        }
    };

    if let Err(e) = request.validate()
    {   return error_response(&e);
    }

    match run_analysis(&state, provider, request).await
    {   Ok(result) => (StatusCode::OK, Json(result)).into_response()
      , Err(e) => error_response(&e)
    }
}

/// Run the analyzer on its own task.
///
/// The task is not tied to the inbound connection: if the caller goes
/// away the provider call still runs to completion. The concurrency
/// permit, when there is one, is held until then.
pub async fn run_analysis(
  state: &AppState
, provider: Arc<dyn LlmProvider>
, request: PromptRequest
) -> Result<AnalysisResult, Error>
{   let permit = match &state.limiter
    {   Some(limiter) => Some(
          limiter.clone()
            .acquire_owned()
            .await
            .map_err(|e| Error::Other(e.to_string()))?
        )
      , None => None
    };

    let task = tokio::spawn(async move {
      let _permit = permit;
      crate::analyzer::analyze(provider.as_ref(), &request).await
    });

    task.await.map_err(|e| {
      error!("Analysis task failed: {}", e);
      Error::AnalysisFailed(Box::new(
        Error::Other(format!("analysis task failed: {}", e))
      ))
    })?
}

async fn log_requests(request: Request, next: Next) -> Response
{   let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
      "{} {} -> {} ({} ms)",
      method, path, response.status().as_u16(),
      started.elapsed().as_millis()
    );
    response
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn error_statuses()
    {   assert_eq!(status_for(&Error::InvalidPrompt), StatusCode::BAD_REQUEST);
        assert_eq!(
          status_for(&Error::CredentialMissing("Claude".to_string())),
          StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
          status_for(&Error::AnalysisFailed(Box::new(
            Error::InvalidUpstreamResponse("empty".to_string())
          ))),
          StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn one_permit_minimum()
    {   let mut config = AppConfig::default();
        config.server.max_in_flight = Some(0);
        let state = AppState::new(ProviderRegistry::new(), &config);
        let permits = state.limiter.map(|l| l.available_permits());
        assert_eq!(permits, Some(1));
    }
}
