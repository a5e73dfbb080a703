//! `.env` loading runs in its own test binary: it mutates the process
//! environment, which the other suites read.

use std::path::PathBuf;

use prompt_analyzer::config::{
  load_dotenv_from, Credentials, CLAUDE_API_KEY_ENV,
};
use prompt_analyzer::Error;

fn scratch_file(name: &str, contents: &str) -> PathBuf
{   let path = std::env::temp_dir()
      .join(format!("prompt-analyzer-{}-{}", std::process::id(), name));
    std::fs::write(&path, contents).expect("write scratch file");
    path
}

#[test]
fn test_dotenv_feeds_credentials()
{   let before = std::env::var(CLAUDE_API_KEY_ENV)
      .ok()
      .filter(|v| !v.is_empty());
    let path = scratch_file(
      "creds.env",
      &format!(
        "{}=sk-from-dotenv\nPROMPT_ANALYZER_DOTENV_MARKER=present\n",
        CLAUDE_API_KEY_ENV
      )
    );

    let loaded = load_dotenv_from(&path).expect("dotenv loads");
    assert_eq!(loaded, Some(path.clone()));
    assert_eq!(
      std::env::var("PROMPT_ANALYZER_DOTENV_MARKER").as_deref(),
      Ok("present")
    );

    // Values already in the environment win over the file.
    let credentials = Credentials::from_env();
    assert_eq!(
      credentials.claude_api_key,
      before.or_else(|| Some("sk-from-dotenv".to_string()))
    );

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_missing_dotenv_is_not_an_error()
{   let path = std::env::temp_dir()
      .join("prompt-analyzer-no-such-dir")
      .join(".env");
    assert_eq!(load_dotenv_from(&path), Ok(None));
}

#[test]
fn test_malformed_dotenv_is_rejected()
{   let path = scratch_file("broken.env", "NOT A VALID LINE 'unterminated\n");
    let result = load_dotenv_from(&path);
    assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    std::fs::remove_file(&path).ok();
}
