//! Query and chat endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::retrieval::retrieve;
use crate::server::state::AppState;
use crate::types::{ChatRequest, ChatResponse, QueryRequest, QueryResponse};

/// POST /query - Nearest-neighbor chunks for a free-text query
pub async fn query(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>> {
    let Json(request) = payload?;
    tracing::info!("Query: \"{}\" (k={})", request.query, request.k);

    let response = retrieve(state.store().as_ref(), &request.query, request.k).await?;
    Ok(Json(response))
}

/// POST /chat - Answer a question from retrieved context
pub async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let start = Instant::now();
    let Json(request) = payload?;

    if request.question.trim().is_empty() {
        return Err(Error::BadRequest("question must not be empty".to_string()));
    }

    let sources = retrieve(state.store().as_ref(), &request.question, request.k)
        .await?
        .results;
    let prompt = PromptBuilder::build_chat_prompt(&request.question, &sources);

    let model = request
        .model
        .unwrap_or_else(|| state.ollama().chat_model().to_string());
    let answer = state.ollama().chat(&prompt, Some(&model)).await?;

    tracing::info!(
        "Chat answered with {} sources in {}ms",
        sources.len(),
        start.elapsed().as_millis()
    );

    Ok(Json(ChatResponse {
        answer,
        model,
        sources,
    }))
}
