//! API routes for the RAG server

pub mod ingest;
pub mod query;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ingest", post(ingest::ingest_folder))
        .route("/query", post(query::query))
        .route("/chat", post(query::chat))
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<Value> {
    let config = state.config();

    Json(json!({
        "name": "rag-sandbox",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Folder ingest, vector query and grounded chat over local notes",
        "collection": state.store().collection(),
        "embeddings": {
            "backend": state.embedder().name(),
            "model": state.embedder().model_name(),
            "dimensions": state.embedder().dimensions(),
        },
        "chat_model": config.llm.chat_model,
        "chunking": {
            "chunk_size": config.chunking.chunk_size,
            "chunk_overlap": config.chunking.chunk_overlap,
        },
        "endpoints": {
            "POST /ingest": "Ingest the configured data folder",
            "POST /query": "Nearest-neighbor chunks for a query",
            "POST /chat": "Answer a question from retrieved chunks",
            "GET /health": "Liveness",
            "GET /ready": "Store and embedder readiness",
            "GET /info": "This document"
        }
    }))
}
