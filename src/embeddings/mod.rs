// Embeddings: remote embedding client, similarity ranking and the backfill job

pub mod backfill;
pub mod client;
pub mod vector_search;

pub use backfill::*;
pub use client::*;
pub use vector_search::*;
