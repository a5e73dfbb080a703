use std::path::PathBuf;

use log::{error, info, warn};

use prompt_analyzer::config::{load_dotenv, AppConfig, Credentials};
use prompt_analyzer::registry::ProviderRegistry;
use prompt_analyzer::server::{self, AppState};

#[tokio::main]
async fn main()
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).init();

    if let Err(e) = run().await
    {   error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>>
{   let config_path: Option<PathBuf>
      = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    match load_dotenv()
    {   Ok(Some(path)) => info!("Loaded .env from {}", path.display())
      , Ok(None) => {}
      , Err(e) => warn!("Error loading .env file: {}", e)
    }
    let credentials = Credentials::from_env();
    let registry = ProviderRegistry::from_config(&config, &credentials)?;

    let addr = format!("0.0.0.0:{}", config.server.port);
    let base_url = format!("http://localhost:{}", config.server.port);

    info!("Starting server on {}", addr);
    for (key, provider) in registry.iter()
    {   info!(
          "{} API available: {} ({}{})",
          provider.name(), provider.is_available(),
          base_url, server::analyze_path(key)
        );
    }
    info!("Demo UI enabled: {}", config.server.demo_ui);
    if config.server.demo_ui
    {   info!("  - Demo UI: {}{}", base_url, prompt_analyzer::demo::DEMO_PATH);
    }
    if let Some(n) = config.server.max_in_flight
    {   info!("Concurrent analyses capped at {}", n);
    }

    let app = server::router(AppState::new(registry, &config));
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
      .with_graceful_shutdown(async {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutting down");
      })
      .await?;
    Ok(())
}
