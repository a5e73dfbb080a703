pub mod error;
pub mod config;
pub mod request;
pub mod extract;
pub mod providers;
pub mod registry;
pub mod analyzer;
pub mod server;
pub mod demo;

use serde::{Deserialize, Serialize};

/*

prompt-analyzer: one HTTP front door for asking an LLM to classify
and risk-score a prompt, whichever backend answers.

prompt-analyzer/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Shared analysis types and re-exports
│   ├── error.rs        # Error taxonomy
│   ├── config.rs       # config.toml model and credential lookup
│   ├── request.rs      # Inbound request and validation
│   ├── extract.rs      # JSON-in-text extraction
│   ├── providers/      # LlmProvider trait and the adapters
│   │   ├── mod.rs
│   │   ├── claude.rs
│   │   └── chatgpt.rs
│   ├── registry.rs     # Route name -> provider
│   ├── analyzer.rs     # Validate, dispatch, time
│   ├── server.rs       # axum routes
│   ├── demo.rs         # Optional HTML demo pages
│   └── main.rs
└── tests/

*/

pub use error::Error;
pub use providers::LlmProvider;
pub use registry::ProviderRegistry;
pub use request::PromptRequest;

/// Structured classification of a prompt, as returned by the model.
///
/// Fields the model leaves out take their zero value; extra fields
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptAnalysis
{   #[serde(rename = "tokenCount")]
    pub token_count: u32
  , #[serde(rename = "promptType")]
    pub prompt_type: String
  , #[serde(rename = "containsPII", alias = "containsPii")]
    pub contains_pii: bool
  , #[serde(rename = "isSuspicious")]
    pub is_suspicious: bool
  , /// Expected 0-100, not enforced
    #[serde(rename = "riskScore")]
    pub risk_score: i32
}

/// Outward envelope: the analysis plus wall time spent in the
/// provider call, in whole milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult
{   #[serde(flatten)]
    pub analysis: PromptAnalysis
  , #[serde(rename = "latency")]
    pub latency_ms: u64
}
