// src/near_duplicate.rs
//! Near-duplicate clustering of document titles.
//!
//! Titles are reduced to 3-character shingles, folded into a 64-bit SimHash
//! fingerprint, and clustered greedily: a record joins the first open
//! cluster whose *seed* is within the Hamming threshold, or failing that,
//! whose seed shares enough tokens (Jaccard fallback). The cluster id is
//! the seed's fingerprint, which is stable across runs and safe to persist.
//!
//! Comparison is seed-only: merged members are not re-compared,
//! so clusters are not transitive equivalence classes. Assignment stays
//! reproducible for a given input order. O(n²) per batch; callers bound the
//! batch size (a few thousand records).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::error::SearchError;
use crate::feature_hash::feature_hash64;

/// Shingle length in characters.
const SHINGLE_LEN: usize = 3;

/// Word-like runs; anything outside this class falls through to the
/// character-shingle path (CJK and other unsegmented scripts).
static RE_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new("[A-Za-z0-9]+").expect("alnum regex"));

/// One document used for clustering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextRecord {
    pub id: i64,
    pub title: String,
}

/// Extract deduplicated shingles from a title, preserving first-occurrence
/// order.
///
/// Latin/alphanumeric titles are lowercased and shingled per token, tokens
/// of up to 3 characters kept whole. Titles without word-like tokens are
/// shingled over the whitespace-stripped raw string; fewer than 3 remaining
/// characters yield no shingles at all (degenerate zero fingerprint).
pub fn shingles(text: &str) -> Vec<String> {
    let t = text.trim();
    if t.is_empty() {
        return Vec::new();
    }

    let lowered = t.to_lowercase();
    let mut out: Vec<String> = Vec::new();
    let toks: Vec<&str> = RE_ALNUM.find_iter(&lowered).map(|m| m.as_str()).collect();
    if !toks.is_empty() {
        for tok in toks {
            if tok.len() <= SHINGLE_LEN {
                out.push(tok.to_string());
            } else {
                // Tokens are ASCII here, so byte windows are char windows.
                for w in tok.as_bytes().windows(SHINGLE_LEN) {
                    out.push(String::from_utf8_lossy(w).into_owned());
                }
            }
        }
    } else {
        let squashed: Vec<char> = t.chars().filter(|c| !c.is_whitespace()).collect();
        for w in squashed.windows(SHINGLE_LEN) {
            out.push(w.iter().collect());
        }
    }

    let mut seen = HashSet::new();
    out.retain(|s| seen.insert(s.clone()));
    out
}

/// Lowercased word-like tokens of a title. Empty for unsegmented scripts;
/// such records cannot use the Jaccard fallback.
pub fn token_set(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    RE_ALNUM
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// 64-bit SimHash of a title.
///
/// Per shingle, the stable feature hash votes ±1 on every bit position; the
/// fingerprint sets each bit whose accumulated vote is ≥ 0. No shingles
/// (empty or too-short title) yield the zero fingerprint. Identical text
/// always yields the identical value, in any process on any run.
pub fn simhash64(text: &str) -> u64 {
    let feats = shingles(text);
    if feats.is_empty() {
        return 0;
    }
    let mut votes = [0i32; 64];
    for f in &feats {
        let h = feature_hash64(f);
        for (i, v) in votes.iter_mut().enumerate() {
            if (h >> i) & 1 == 1 {
                *v += 1;
            } else {
                *v -= 1;
            }
        }
    }
    let mut out = 0u64;
    for (i, v) in votes.iter().enumerate() {
        if *v >= 0 {
            out |= 1 << i;
        }
    }
    out
}

/// Number of differing bits between two fingerprints.
pub fn hamming(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Jaccard similarity of two token sets. Empty sets are maximally
/// dissimilar.
fn token_jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    let union = a.len() + b.len() - inter;
    inter as f32 / union as f32
}

/// Greedy single-pass clustering by fingerprint proximity.
///
/// Records are processed in input order; each unassigned record seeds a new
/// cluster keyed by its own fingerprint, then claims every later unassigned
/// record within `hamming_threshold` of the seed, or, when both sides have
/// word-like tokens, with token Jaccard ≥ `jaccard_threshold`. Member lists
/// keep input order and partition the input: every record lands in exactly
/// one cluster.
///
/// Fails fast with [`SearchError::Config`] on out-of-domain thresholds
/// (`hamming_threshold` > 64, `jaccard_threshold` outside [0, 1]); data
/// never errors, since any title, including empty, fingerprints to something.
pub fn cluster_by_simhash(
    records: &[TextRecord],
    hamming_threshold: u32,
    jaccard_threshold: f32,
) -> Result<BTreeMap<u64, Vec<i64>>, SearchError> {
    if hamming_threshold > 64 {
        return Err(SearchError::Config(format!(
            "hamming_threshold {hamming_threshold} out of range 0..=64"
        )));
    }
    if !jaccard_threshold.is_finite() || !(0.0..=1.0).contains(&jaccard_threshold) {
        return Err(SearchError::Config(format!(
            "jaccard_threshold {jaccard_threshold} outside [0, 1]"
        )));
    }

    let fingerprints: Vec<u64> = records.iter().map(|r| simhash64(&r.title)).collect();
    let token_sets: Vec<HashSet<String>> = records.iter().map(|r| token_set(&r.title)).collect();

    let mut clusters: BTreeMap<u64, Vec<i64>> = BTreeMap::new();
    let mut assigned = vec![false; records.len()];

    for i in 0..records.len() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let seed_fp = fingerprints[i];
        let members = clusters.entry(seed_fp).or_default();
        members.push(records[i].id);

        for j in (i + 1)..records.len() {
            if assigned[j] {
                continue;
            }
            let near = hamming(seed_fp, fingerprints[j]) <= hamming_threshold
                || (!token_sets[i].is_empty()
                    && !token_sets[j].is_empty()
                    && token_jaccard(&token_sets[i], &token_sets[j]) >= jaccard_threshold);
            if near {
                members.push(records[j].id);
                assigned[j] = true;
            }
        }
    }

    debug!(
        target: "near_duplicate",
        records = records.len(),
        clusters = clusters.len(),
        "simhash clustering finished"
    );
    Ok(clusters)
}

/// Share of clusters holding more than one member, relative to the batch
/// size. The persistence/metrics collaborator records this as its
/// duplicate-ratio gauge.
pub fn duplicate_ratio(clusters: &BTreeMap<u64, Vec<i64>>, total: usize) -> f32 {
    let multi = clusters.values().filter(|m| m.len() > 1).count();
    multi as f32 / total.max(1) as f32
}
