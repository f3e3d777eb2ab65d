//! Query delegation and result reshaping

use uuid::Uuid;

use crate::error::Result;
use crate::providers::{RawQueryResult, VectorStoreProvider};
use crate::types::{Metadata, QueryHit, QueryResponse};

/// Return up to `k` hits for `query`, closest first
///
/// A blank query never reaches the store. `k` below 1 asks the store for one
/// hit and is echoed unchanged.
pub async fn retrieve(
    store: &dyn VectorStoreProvider,
    query: &str,
    k: i64,
) -> Result<QueryResponse> {
    if query.trim().is_empty() {
        return Ok(QueryResponse::empty(k));
    }

    let n_results = usize::try_from(k.max(1)).unwrap_or(usize::MAX);
    let raw = store.query(query, n_results).await?;
    let results = reshape(raw);
    tracing::debug!("Query returned {} of {} requested hits", results.len(), k);

    Ok(QueryResponse { results, k })
}

/// Turn parallel arrays into one hit per returned document
pub fn reshape(raw: RawQueryResult) -> Vec<QueryHit> {
    let RawQueryResult {
        ids,
        documents,
        metadatas,
        distances,
    } = raw;

    let mut ids = ids.into_iter();
    let mut metadatas = metadatas.into_iter();
    let mut distances = distances.into_iter();

    documents
        .into_iter()
        .map(|document| QueryHit {
            id: ids.next().unwrap_or_else(|| Uuid::new_v4().to_string()),
            document,
            metadata: metadatas.next().unwrap_or_else(Metadata::new),
            distance: distances.next(),
        })
        .collect()
}
