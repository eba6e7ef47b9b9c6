use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::chat::{DEFAULT_MODEL, GeminiClient};

/// Study planner HTTP server settings.
#[derive(Debug, Clone, Parser)]
#[command(name = "study-planner-http", version, about)]
pub struct PlannerConfig {
    /// Address the HTTP API listens on.
    #[arg(long, env = "STUDY_PLANNER_HTTP_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: SocketAddr,

    /// SQLite database file. Planners live only in memory when unset.
    #[arg(long, env = "STUDY_PLANNER_DB")]
    pub database: Option<PathBuf>,

    /// Gemini API key for the chat assistant.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "STUDY_PLANNER_GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub gemini_model: String,
}

impl PlannerConfig {
    /// Chat backend, when an API key was configured.
    pub fn chat_client(&self) -> Option<GeminiClient> {
        self.gemini_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .map(|key| GeminiClient::new(key).with_model(self.gemini_model.clone()))
    }
}
