mod config;
mod errors;
mod llm_client;
mod models;
mod routes;
mod screening;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::screening::questions::{LlmQuestionGenerator, QuestionService};
use crate::screening::store::{spawn_sweeper, EvictionPolicy, SessionStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screening API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.llm_api_url.clone(),
        config.llm_api_key.clone(),
        config.llm_model.clone(),
        config.generation_timeout,
    );
    if llm.has_api_key() {
        info!("LLM client initialized (model: {})", llm.model());
    } else {
        warn!("No LLM API key configured; every question will use the fallback");
    }

    let questions = QuestionService::new(
        Arc::new(LlmQuestionGenerator(llm)),
        config.generation_timeout,
    );

    let sessions = SessionStore::new();
    let policy = EvictionPolicy {
        idle_ttl: config.session_idle_ttl,
        concluded_ttl: config.session_concluded_ttl,
        sweep_interval: config.session_sweep_interval,
    };
    info!(
        "Sessions expire after {}s idle, {}s once concluded",
        policy.idle_ttl.as_secs(),
        policy.concluded_ttl.as_secs()
    );
    spawn_sweeper(sessions.clone(), policy);

    let state = AppState {
        sessions,
        questions,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
