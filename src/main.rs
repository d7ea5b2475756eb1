use std::sync::Arc;

use project_assist::config::AppConfig;
use project_assist::conversation::ChatEngine;
use project_assist::http::{AppState, routes};
use project_assist::llm::{LlmProvider, OpenAiProvider};
use project_assist::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("Project Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!("   Chat API: http://0.0.0.0:{}/api/chat", config.port);
    eprintln!("   Database: {}", config.db_path);

    let db: Arc<dyn Database> = Arc::new(
        LibSqlBackend::new_local(std::path::Path::new(&config.db_path)).await?,
    );

    let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::new(
        config.api_key.clone(),
        config.request_timeout,
    )?);

    let engine = Arc::new(ChatEngine::new(
        Arc::clone(&db),
        llm,
        config.model.clone(),
    ));

    let app = routes(AppState { store: db, engine });

    let listener =
        tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Chat server started");
    axum::serve(listener, app).await?;

    Ok(())
}
