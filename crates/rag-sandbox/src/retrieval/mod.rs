//! Retrieval: nearest-neighbor lookup over the vector store

mod search;

pub use search::{reshape, retrieve};
