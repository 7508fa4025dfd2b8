//! Candidate matching over the dictionary index.
//!
//! Three ranked tiers per query: exact reading hits, prefix continuations
//! (incremental typing), and bounded edit-distance fuzzy hits for likely
//! typos. The whole pipeline is deterministic — the same buffer against the
//! same dictionary always yields the same ordered list — and it never fails:
//! an empty result is the normal state while the user is still typing.

mod distance;

pub use distance::bounded_levenshtein;

use std::cmp::Reverse;

use tracing::trace;

use crate::dict::PinyinDictionary;
use crate::settings::MatcherSettings;

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOrigin {
    DictionaryExact,
    DictionaryFuzzy,
    AiCompletion,
}

/// A displayable candidate. Value object: created per query or completion
/// round, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub origin: CandidateOrigin,
    /// Dictionary weight for dictionary-sourced candidates, 0 for AI ones.
    pub weight: u32,
}

impl Candidate {
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: CandidateOrigin::AiCompletion,
            weight: 0,
        }
    }
}

/// Maximum fuzzy edit distance for a buffer of `len` chars.
pub fn max_edit_distance(len: usize) -> usize {
    (len / 4).max(1)
}

/// How many prefix readings to scan per query.
const PREFIX_SCAN_LIMIT: usize = 64;

// Ranking tiers. Lower sorts first.
const TIER_EXACT: u8 = 0;
const TIER_PREFIX: u8 = 1;
const TIER_FUZZY: u8 = 2;

struct Ranked {
    tier: u8,
    /// Tier-local distance: 0 for exact, extra reading chars for prefix,
    /// edit distance for fuzzy.
    dist: usize,
    weight: u32,
    /// Scan sequence number — the stable final tie-break.
    seq: usize,
    text: String,
    origin: CandidateOrigin,
}

/// Rank dictionary candidates for the current phonetic buffer.
pub fn match_candidates(
    dict: &PinyinDictionary,
    buffer: &str,
    settings: &MatcherSettings,
) -> Vec<Candidate> {
    if buffer.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<Ranked> = Vec::new();
    let mut seq = 0usize;
    let mut push = |ranked: &mut Vec<Ranked>, tier, dist, weight, text: &str, origin| {
        ranked.push(Ranked {
            tier,
            dist,
            weight,
            seq,
            text: text.to_string(),
            origin,
        });
        seq += 1;
    };

    for entry in dict.lookup_exact(buffer) {
        push(
            &mut ranked,
            TIER_EXACT,
            0,
            entry.weight,
            &entry.text,
            CandidateOrigin::DictionaryExact,
        );
    }

    let buffer_len = buffer.chars().count();
    for (reading, entries) in dict.lookup_prefix(buffer, PREFIX_SCAN_LIMIT) {
        let extra = reading.chars().count() - buffer_len;
        for entry in entries {
            push(
                &mut ranked,
                TIER_PREFIX,
                extra,
                entry.weight,
                &entry.text,
                CandidateOrigin::DictionaryExact,
            );
        }
    }

    // Fuzzy pass only when the direct tiers look thin or the buffer is long
    // enough that a typo is plausible.
    let direct_hits = ranked.len();
    if direct_hits < settings.min_results || buffer_len > settings.typo_length {
        let max_dist = max_edit_distance(buffer_len);
        for (reading, entries) in dict.readings() {
            if reading == buffer || reading.starts_with(buffer) {
                continue; // already covered by the direct tiers
            }
            let Some(dist) = bounded_levenshtein(buffer, reading, max_dist) else {
                continue;
            };
            for entry in entries {
                push(
                    &mut ranked,
                    TIER_FUZZY,
                    dist,
                    entry.weight,
                    &entry.text,
                    CandidateOrigin::DictionaryFuzzy,
                );
            }
        }
        trace!(buffer, direct_hits, fuzzy_hits = ranked.len() - direct_hits, "fuzzy pass");
    }

    ranked.sort_by_key(|r| (r.tier, r.dist, Reverse(r.weight), r.seq));

    // Dedup by display text, keeping the best-ranked occurrence.
    let mut seen = std::collections::HashSet::new();
    ranked.retain(|r| seen.insert(r.text.clone()));

    ranked.truncate(settings.max_candidates);
    ranked
        .into_iter()
        .map(|r| Candidate {
            text: r.text,
            origin: r.origin,
            weight: r.weight,
        })
        .collect()
}
