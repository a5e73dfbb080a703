//! Browser demo: a form at `GET /analyze` that posts to
//! `POST /analyze/submit` and renders the result as HTML.

use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Form, Router};
use log::debug;
use serde::Deserialize;

use crate::request::PromptRequest;
use crate::server::{run_analysis, AppState};
use crate::AnalysisResult;

pub const DEMO_PATH: &str = "/analyze";
pub const DEMO_SUBMIT_PATH: &str = "/analyze/submit";

/// Fields posted by the demo form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemoForm
{   #[serde(default)]
    pub provider: String
  , #[serde(default)]
    pub prompt: String
}

pub fn routes() -> Router<AppState>
{   Router::new()
      .route(DEMO_PATH, get(demo_page))
      .route(DEMO_SUBMIT_PATH, post(submit))
}

async fn demo_page(State(state): State<AppState>) -> Html<String>
{   let mut options = String::new();
    for (key, provider) in state.registry.iter()
    {   let available = provider.is_available();
        options.push_str(&format!(
          "<option value=\"{}\"{}>{}{}</option>\n",
          escape_html(key),
          if available { "" } else { " disabled" },
          escape_html(provider.name()),
          if available { "" } else { " (API key not set)" }
        ));
    }

    Html(page("Prompt Analysis", &format!(
      "<form method=\"post\" action=\"{}\">\n\
       <label>Provider <select name=\"provider\">\n{}</select></label>\n\
       <label>Prompt<br><textarea name=\"prompt\" rows=\"8\" cols=\"80\"></textarea></label>\n\
       <button type=\"submit\">Analyze</button>\n\
       </form>",
      DEMO_SUBMIT_PATH, options
    )))
}

async fn submit(
  State(state): State<AppState>
, Form(form): Form<DemoForm>
) -> Html<String>
{   debug!("Demo submit for provider {:?}", form.provider);

    if form.prompt.is_empty()
    {   return render_error("Prompt cannot be empty");
    }

    let provider = match state.registry.get(&form.provider)
    {   Some(provider) => provider
      , None => return render_error("Invalid provider selected")
    };

    if !provider.is_available()
    {   return render_error(
          &format!("{} API key not set", provider.name())
        );
    }

    match run_analysis(&state, provider, PromptRequest::new(form.prompt)).await
    {   Ok(result) => render_result(&result)
      , Err(e) => render_error(&e.to_string())
    }
}

fn render_result(result: &AnalysisResult) -> Html<String>
{   let raw_json = match serde_json::to_string_pretty(result)
    {   Ok(json) => json
      , Err(e) => {
          return render_error(&format!("Error formatting JSON: {}", e));
        }
    };
    let a = &result.analysis;

    Html(page("Analysis Result", &format!(
      "<table>\n\
       <tr><th>Token count</th><td>{}</td></tr>\n\
       <tr><th>Prompt type</th><td>{}</td></tr>\n\
       <tr><th>Contains PII</th><td>{}</td></tr>\n\
       <tr><th>Suspicious</th><td>{}</td></tr>\n\
       <tr><th>Risk score</th><td>{}</td></tr>\n\
       <tr><th>Latency</th><td>{} ms</td></tr>\n\
       </table>\n<pre>{}</pre>\n<a href=\"{}\">Back</a>",
      a.token_count,
      escape_html(&a.prompt_type),
      a.contains_pii,
      a.is_suspicious,
      a.risk_score,
      result.latency_ms,
      escape_html(&raw_json),
      DEMO_PATH
    )))
}

fn render_error(message: &str) -> Html<String>
{   Html(page("Analysis Error", &format!(
      "<p class=\"error\">{}</p>\n<a href=\"{}\">Back</a>",
      escape_html(message), DEMO_PATH
    )))
}

fn page(title: &str, body: &str) -> String
{   format!(
      "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\">\
       <title>{0}</title></head>\n<body>\n<h1>{0}</h1>\n{1}\n</body>\n</html>\n",
      escape_html(title), body
    )
}

/// Escape text for an HTML body or attribute
pub fn escape_html(text: &str) -> String
{   let mut out = String::with_capacity(text.len());
    for c in text.chars()
    {   match c
        {   '&' => out.push_str("&amp;")
          , '<' => out.push_str("&lt;")
          , '>' => out.push_str("&gt;")
          , '"' => out.push_str("&quot;")
          , '\'' => out.push_str("&#39;")
          , _ => out.push(c)
        }
    }
    out
}
