#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::Arc;

    use clap::Parser;
    use study_planner::{PlannerConfig, http_api};

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = PlannerConfig::parse();
    let mut state = http_api::AppState::new();

    match &config.database {
        #[cfg(feature = "sqlite")]
        Some(path) => {
            let store = study_planner::SqlitePlannerStore::new(path)?;
            tracing::info!(path = %path.display(), "using sqlite planner store");
            state = state.with_store(Arc::new(store));
        }
        #[cfg(not(feature = "sqlite"))]
        Some(path) => {
            tracing::warn!(path = %path.display(), "built without the `sqlite` feature; database ignored");
        }
        None => tracing::info!("no database configured; planners are kept in memory"),
    }

    match config.chat_client() {
        Some(client) => state = state.with_chat(Arc::new(client)),
        None => tracing::warn!("GEMINI_API_KEY not set; chat endpoint disabled"),
    }

    tracing::info!(addr = %config.addr, "study-planner HTTP API listening");
    http_api::serve(config.addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
