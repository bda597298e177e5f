// src/lib.rs
// Public library surface for the retrieval pipeline and integration tests.

pub mod config;
pub mod error;
pub mod feature_hash;
pub mod near_duplicate;
pub mod ranker;
pub mod trust;

// ---- Re-exports for stable public API ----
pub use crate::config::{DedupConfig, RankingConfig};
pub use crate::error::SearchError;
pub use crate::near_duplicate::{
    cluster_by_simhash, duplicate_ratio, hamming, simhash64, TextRecord,
};
pub use crate::ranker::{
    candidate_pool_size, rerank_candidates, rerank_with_config, Candidate, ScoreWeights,
};
pub use crate::trust::{TrustMap, TrustMaps};
