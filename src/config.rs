// src/config.rs
//! Ranking configuration: TOML file + environment overrides.
//!
//! Resolution order is env override > config file > built-in defaults, the
//! same surface the serving layer has always exposed. The result is an
//! immutable value the caller constructs once and passes into each engine
//! call; the engines themselves never touch files or the process
//! environment.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::SearchError;
use crate::ranker::ScoreWeights;
use crate::trust::TrustMap;

pub const DEFAULT_RANKING_CONFIG_PATH: &str = "config/ranking.toml";
pub const ENV_RANKING_CONFIG_PATH: &str = "RANKING_CONFIG_PATH";

// Legacy env names kept from the deployed service.
pub const ENV_RANK_ALPHA: &str = "RANK_ALPHA";
pub const ENV_RANK_BETA: &str = "RANK_BETA";
pub const ENV_RANK_GAMMA: &str = "RANK_GAMMA";
pub const ENV_RANK_DELTA: &str = "RANK_DELTA";
pub const ENV_RECENCY_HALFLIFE_HOURS: &str = "RECENCY_HALFLIFE_HOURS";
pub const ENV_SOURCE_TRUST_JSON: &str = "SOURCE_TRUST_JSON";
pub const ENV_SOURCE_TRUST_DEFAULT: &str = "SOURCE_TRUST_DEFAULT";
pub const ENV_LANGUAGE_TRUST_JSON: &str = "LANGUAGE_TRUST_JSON";
pub const ENV_LANGUAGE_TRUST_DEFAULT: &str = "LANGUAGE_TRUST_DEFAULT";

/// Thresholds for the duplicate clustering engine.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct DedupConfig {
    #[serde(default = "default_hamming_threshold")]
    pub hamming_threshold: u32,
    #[serde(default = "default_jaccard_threshold")]
    pub jaccard_threshold: f32,
}

fn default_hamming_threshold() -> u32 {
    3
}

fn default_jaccard_threshold() -> f32 {
    0.4
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            hamming_threshold: default_hamming_threshold(),
            jaccard_threshold: default_jaccard_threshold(),
        }
    }
}

/// Fully-resolved ranking configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RankingConfig {
    #[serde(default)]
    pub score_weights: ScoreWeights,
    #[serde(default = "default_half_life_hours")]
    pub recency_half_life_hours: f32,
    #[serde(default)]
    pub source_trust: TrustMap,
    #[serde(default)]
    pub language_trust: TrustMap,
    #[serde(default)]
    pub dedup: DedupConfig,
}

fn default_half_life_hours() -> f32 {
    48.0
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            score_weights: ScoreWeights::default(),
            recency_half_life_hours: default_half_life_hours(),
            source_trust: TrustMap::default(),
            language_trust: TrustMap::default(),
            dedup: DedupConfig::default(),
        }
    }
}

impl RankingConfig {
    /// Parse from a TOML string. Missing sections fall back to defaults.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let cfg: RankingConfig = toml::from_str(toml_str)?;
        Ok(cfg)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading ranking config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing ranking config at {}", path.display()))
    }

    /// Load using the full resolution chain:
    /// 1) `$RANKING_CONFIG_PATH`, 2) `config/ranking.toml`, 3) built-in
    /// defaults, then apply the legacy env overrides on top.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_RANKING_CONFIG_PATH) {
            Self::load_from(&PathBuf::from(p))?
        } else {
            let default_path = PathBuf::from(DEFAULT_RANKING_CONFIG_PATH);
            if default_path.exists() {
                Self::load_from(&default_path)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Overlay legacy environment variables onto this config. Unparsable
    /// values are ignored, keeping the file/default value in place.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_f32(ENV_RANK_ALPHA) {
            self.score_weights.cosine = v;
        }
        if let Some(v) = env_f32(ENV_RANK_BETA) {
            self.score_weights.recency = v;
        }
        if let Some(v) = env_f32(ENV_RANK_GAMMA) {
            self.score_weights.source_trust = v;
        }
        if let Some(v) = env_f32(ENV_RANK_DELTA) {
            self.score_weights.language_trust = v;
        }
        if let Some(v) = env_f32(ENV_RECENCY_HALFLIFE_HOURS) {
            self.recency_half_life_hours = v;
        }
        if let Some(v) = env_f32(ENV_SOURCE_TRUST_DEFAULT) {
            self.source_trust.default = v;
        }
        if let Some(m) = env_json_map(ENV_SOURCE_TRUST_JSON) {
            self.source_trust.weights.extend(m);
        }
        if let Some(v) = env_f32(ENV_LANGUAGE_TRUST_DEFAULT) {
            self.language_trust.default = v;
        }
        if let Some(m) = env_json_map(ENV_LANGUAGE_TRUST_JSON) {
            self.language_trust.weights.extend(m);
        }
    }

    /// Reject values the engines cannot degrade around. Negative weights
    /// and a non-positive half-life are NOT errors (they have defined
    /// fallbacks); non-finite numbers and out-of-domain dedup thresholds
    /// are.
    pub fn validate(&self) -> std::result::Result<(), SearchError> {
        let w = &self.score_weights;
        for (name, v) in [
            ("score_weights.cosine", w.cosine),
            ("score_weights.recency", w.recency),
            ("score_weights.source_trust", w.source_trust),
            ("score_weights.language_trust", w.language_trust),
        ] {
            if !v.is_finite() {
                return Err(SearchError::Config(format!("{name} is not finite")));
            }
        }
        if !self.recency_half_life_hours.is_finite() {
            return Err(SearchError::Config(
                "recency_half_life_hours is not finite".to_string(),
            ));
        }
        if self.dedup.hamming_threshold > 64 {
            return Err(SearchError::Config(format!(
                "dedup.hamming_threshold {} out of range 0..=64",
                self.dedup.hamming_threshold
            )));
        }
        let j = self.dedup.jaccard_threshold;
        if !j.is_finite() || !(0.0..=1.0).contains(&j) {
            return Err(SearchError::Config(format!(
                "dedup.jaccard_threshold {j} outside [0, 1]"
            )));
        }
        Ok(())
    }
}

fn env_f32(name: &str) -> Option<f32> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<f32>().ok())
}

fn env_json_map(name: &str) -> Option<HashMap<String, f32>> {
    let raw = std::env::var(name).ok()?;
    if raw.trim().is_empty() {
        return None;
    }
    // Malformed payloads are ignored (legacy behavior).
    serde_json::from_str(&raw).ok()
}
