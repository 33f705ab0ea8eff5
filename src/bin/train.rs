//! Trains the recommendation model from the catalog and replaces the
//! current artifact.

use std::process::ExitCode;
use std::sync::Arc;

use folio_api::{
    config::Config,
    db::{self, PgCatalog},
    services::{FileArtifactStore, Trainer},
    telemetry,
};

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Training failed");
            eprintln!("Training failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;

    let trainer = Trainer::new(
        Arc::new(PgCatalog::new(pool)),
        Arc::new(FileArtifactStore::new(&config.model_path)),
    );
    let artifact = trainer.run().await?;

    let summary = &artifact.summary;
    println!(
        "Successfully trained and saved the book recommendation model \
         (version {}, {} eligible rows: {} train / {} holdout, {} unreviewed skipped) to {}",
        artifact.version,
        summary.eligible_rows,
        summary.train_rows,
        summary.holdout_rows,
        summary.skipped_unreviewed,
        config.model_path,
    );
    if let Some(mse) = summary.holdout_mse {
        println!("Holdout MSE: {mse:.4}");
    }

    Ok(())
}
