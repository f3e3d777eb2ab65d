//! Query and chat request types

use serde::{Deserialize, Serialize};

/// Body of `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Free-text query
    pub query: String,

    /// Number of hits requested (default: 5); values below 1 ask for one hit
    #[serde(default = "default_k")]
    pub k: i64,
}

/// Body of `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Question answered from retrieved context
    pub question: String,

    /// Number of chunks used as context (default: 5)
    #[serde(default = "default_k")]
    pub k: i64,

    /// Chat model override
    #[serde(default)]
    pub model: Option<String>,
}

fn default_k() -> i64 {
    5
}
