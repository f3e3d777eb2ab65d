//! Folder ingestion endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::IngestSummary;

/// POST /ingest - Ingest every recognized file under the configured data folder
pub async fn ingest_folder(State(state): State<AppState>) -> Result<Json<IngestSummary>> {
    let data_dir = &state.config().ingest.data_dir;
    tracing::info!("Ingest requested for {}", data_dir.display());

    let summary = state.pipeline().ingest_folder(data_dir).await?;
    Ok(Json(summary))
}
