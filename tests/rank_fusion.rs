// tests/rank_fusion.rs
// End-to-end rank fusion over the public API.

use chrono::{Duration, TimeZone, Utc};
use newshub_search::{
    rerank_candidates, rerank_with_config, Candidate, RankingConfig, ScoreWeights, TrustMaps,
};

fn candidate(id: i64, published_at: chrono::DateTime<Utc>) -> Candidate {
    Candidate {
        id,
        published_at,
        source: "src".to_string(),
        language: Some("ja".to_string()),
        distance: Some(0.5),
    }
}

#[test]
fn fresh_row_outranks_week_old_row() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let weights = ScoreWeights {
        cosine: 0.7,
        recency: 0.2,
        source_trust: 0.1,
        language_trust: 0.0,
    };

    let old = candidate(1, now - Duration::days(7));
    let fresh = candidate(2, now);

    let out = rerank_candidates(
        vec![old, fresh],
        &weights,
        24.0,
        &TrustMaps::default(),
        now,
        10,
    );
    let ids: Vec<i64> = out.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn rerank_never_exceeds_limit_or_input_len() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let items: Vec<Candidate> = (1..=8).map(|id| candidate(id, now)).collect();

    let out = rerank_candidates(
        items.clone(),
        &ScoreWeights::default(),
        24.0,
        &TrustMaps::default(),
        now,
        5,
    );
    assert_eq!(out.len(), 5);

    let out = rerank_candidates(
        items,
        &ScoreWeights::default(),
        24.0,
        &TrustMaps::default(),
        now,
        100,
    );
    assert_eq!(out.len(), 8);
}

#[test]
fn empty_candidate_list_is_not_an_error() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let out = rerank_candidates(
        Vec::new(),
        &ScoreWeights::default(),
        24.0,
        &TrustMaps::default(),
        now,
        10,
    );
    assert!(out.is_empty());
}

#[test]
fn config_wrapper_applies_trust_maps() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let toml = r#"
[score_weights]
cosine = 0.0
recency = 0.0
source_trust = 1.0
language = 0.0

[source_trust]
default = 0.1
[source_trust.weights]
"nhk.or.jp" = 0.9
"#;
    let config = RankingConfig::from_toml_str(toml).unwrap();
    config.validate().unwrap();

    let mut low = candidate(1, now);
    low.source = "unknown.example".to_string();
    let mut high = candidate(2, now);
    high.source = "nhk.or.jp".to_string();

    let out = rerank_with_config(vec![low, high], &config, now, 10);
    let ids: Vec<i64> = out.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![2, 1]);
}
