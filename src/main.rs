use std::sync::Arc;

use folio_api::{
    api::{create_router, AppState},
    config::Config,
    db::{self, PgCatalog},
    services::{FileArtifactStore, HttpSummarizer, Recommender},
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let recommender = Recommender::new(
        Arc::new(PgCatalog::new(pool)),
        Arc::new(FileArtifactStore::new(&config.model_path)),
        config.request_timeout(),
    );
    let summarizer = Arc::new(HttpSummarizer::new(
        config.summarizer_url.clone(),
        config.request_timeout(),
    )?);
    let app = create_router(AppState::new(recommender, summarizer));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        address = %config.bind_address(),
        model_path = %config.model_path,
        "Server running"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
