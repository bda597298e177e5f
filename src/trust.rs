// src/trust.rs
//! # Trust maps
//!
//! Configurable mappings from a source label or language code to a trust
//! score used as one fusion signal. Lookup is exact-match with a
//! caller-supplied default: a candidate whose source/language is unknown
//! (or absent) scores the default, never an error.

use serde::Deserialize;
use std::collections::HashMap;

/// One trust mapping (source → score or language → score) plus the default
/// applied when the key is absent from the map or missing on the candidate.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TrustMap {
    /// Score used when no entry matches.
    #[serde(default)]
    pub default: f32,
    /// Explicit scores for known labels.
    #[serde(default)]
    pub weights: HashMap<String, f32>,
}

impl TrustMap {
    pub fn new(default: f32) -> Self {
        Self {
            default,
            weights: HashMap::new(),
        }
    }

    /// Exact lookup; `None` (field absent on the candidate) short-circuits
    /// to the default.
    pub fn weight_for(&self, key: Option<&str>) -> f32 {
        match key {
            Some(k) => self.weights.get(k).copied().unwrap_or(self.default),
            None => self.default,
        }
    }
}

/// The two trust signals consumed by the reranker.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TrustMaps {
    #[serde(default)]
    pub source: TrustMap,
    #[serde(default)]
    pub language: TrustMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> TrustMap {
        let mut weights = HashMap::new();
        weights.insert("nhk.or.jp".to_string(), 0.2);
        weights.insert("apnews.com".to_string(), 0.1);
        TrustMap {
            default: 0.05,
            weights,
        }
    }

    #[test]
    fn exact_match() {
        let m = map();
        assert!((m.weight_for(Some("nhk.or.jp")) - 0.2).abs() < 1e-6);
        assert!((m.weight_for(Some("apnews.com")) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn unknown_key_uses_default() {
        let m = map();
        assert!((m.weight_for(Some("example.org")) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn absent_key_uses_default_without_lookup() {
        let m = map();
        assert!((m.weight_for(None) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        // Labels are canonicalized upstream; the map does no normalization.
        let m = map();
        assert!((m.weight_for(Some("NHK.or.jp")) - m.default).abs() < 1e-6);
    }
}
