// src/ranker.rs
//! Rank fusion over retrieval candidates.
//!
//! Combines four normalized signals into one score per candidate:
//! - cosine similarity (from the retrieval distance),
//! - recency (exponential half-life decay),
//! - source trust,
//! - language trust.
//!
//! The engine is pure: `now` comes from the caller, configuration is an
//! immutable value, and the input order is the upstream ranking; ties keep
//! it (stable sort).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RankingConfig;
use crate::trust::TrustMaps;

/// One retrieval result to be ranked. Fields that the retrieval layer may
/// not know (`language`, `distance`) stay optional; absence degrades to the
/// default/worst sub-score instead of erroring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub id: i64,
    pub published_at: DateTime<Utc>,
    pub source: String,
    pub language: Option<String>,
    /// Cosine distance, conventionally in [0, 2]. `None` means unknown and
    /// scores as the worst case.
    pub distance: Option<f32>,
}

/// Raw fusion weights. `normalized()` is applied before scoring, so any
/// non-negative magnitudes work; the defaults are the served baseline.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct ScoreWeights {
    #[serde(default = "default_w_cosine")]
    pub cosine: f32,
    #[serde(default = "default_w_recency")]
    pub recency: f32,
    #[serde(default = "default_w_source_trust")]
    pub source_trust: f32,
    #[serde(default, alias = "language")]
    pub language_trust: f32,
}

fn default_w_cosine() -> f32 {
    0.7
}

fn default_w_recency() -> f32 {
    0.2
}

fn default_w_source_trust() -> f32 {
    0.1
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            cosine: default_w_cosine(),
            recency: default_w_recency(),
            source_trust: default_w_source_trust(),
            language_trust: 0.0,
        }
    }
}

impl ScoreWeights {
    /// Clamp negatives to zero and scale so the four weights sum to 1.0.
    /// A sum of zero collapses to pure similarity ranking `{1, 0, 0, 0}`
    /// (a defined fallback, not an error).
    pub fn normalized(&self) -> ScoreWeights {
        fn pos(x: f32) -> f32 {
            x.max(0.0)
        }
        let (a, b, g, d) = (
            pos(self.cosine),
            pos(self.recency),
            pos(self.source_trust),
            pos(self.language_trust),
        );
        let sum = a + b + g + d;
        if sum > 0.0 && sum.is_finite() {
            ScoreWeights {
                cosine: a / sum,
                recency: b / sum,
                source_trust: g / sum,
                language_trust: d / sum,
            }
        } else {
            ScoreWeights {
                cosine: 1.0,
                recency: 0.0,
                source_trust: 0.0,
                language_trust: 0.0,
            }
        }
    }
}

/// Exponential half-life decay of a publish timestamp relative to `now`.
/// Future timestamps count as age zero; a non-positive (or non-finite)
/// half-life disables the signal entirely.
pub fn recency_decay(published_at: DateTime<Utc>, now: DateTime<Utc>, half_life_hours: f32) -> f32 {
    if !(half_life_hours.is_finite() && half_life_hours > 0.0) {
        return 0.0;
    }
    let age_hours = (now - published_at).num_seconds().max(0) as f32 / 3600.0;
    0.5_f32.powf(age_hours / half_life_hours)
}

/// Apply weighted rank fusion and keep the best `limit` candidates.
///
/// Candidates are scored, stably sorted by score descending (ties preserve
/// the upstream order) and truncated. The input is never mutated beyond
/// reordering; an empty input yields an empty output.
pub fn rerank_candidates(
    candidates: Vec<Candidate>,
    weights: &ScoreWeights,
    half_life_hours: f32,
    trust: &TrustMaps,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<Candidate> {
    let w = weights.normalized();
    let total = candidates.len();

    let mut scored: Vec<(f32, Candidate)> = candidates
        .into_iter()
        .map(|c| {
            // Non-finite distances are treated as missing (worst case).
            let dist = c.distance.filter(|d| d.is_finite()).unwrap_or(1.0);
            let cos_sim = 1.0 - dist.clamp(0.0, 1.0);
            let rec = recency_decay(c.published_at, now, half_life_hours);
            let src = trust.source.weight_for(Some(c.source.as_str()));
            let lang = trust.language.weight_for(c.language.as_deref());
            let score = w.cosine * cos_sim
                + w.recency * rec
                + w.source_trust * src
                + w.language_trust * lang;
            (score, c)
        })
        .collect();

    // Vec::sort_by is stable: equal scores keep the upstream ranking.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);

    debug!(target: "ranker", candidates = total, kept = scored.len(), "rank fusion applied");
    scored.into_iter().map(|(_, c)| c).collect()
}

/// Convenience wrapper forwarding the resolved values out of a
/// [`RankingConfig`].
pub fn rerank_with_config(
    candidates: Vec<Candidate>,
    config: &RankingConfig,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<Candidate> {
    let trust = TrustMaps {
        source: config.source_trust.clone(),
        language: config.language_trust.clone(),
    };
    rerank_candidates(
        candidates,
        &config.score_weights,
        config.recency_half_life_hours,
        &trust,
        now,
        limit,
    )
}

/// Candidate-expansion heuristic for the retrieval collaborator: how many
/// raw rows to pull before fusion so the reranker has room to reorder,
/// capped at 200 per batch.
pub fn candidate_pool_size(limit: usize) -> usize {
    (limit * 3 + 10).max(limit).min(200)
}
