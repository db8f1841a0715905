//! Text tokenization and token-overlap similarity.
//!
//! This is the deterministic fallback for semantic matching: no model, no
//! I/O, same answer every time.

use std::collections::BTreeMap;

use crate::skills::normalize_skill;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "in",
    "into", "is", "it", "its", "of", "on", "or", "our", "that", "the", "their", "this", "to",
    "was", "we", "were", "will", "with", "you", "your",
];

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '+' | '#' | '.')
}

/// Split text into normalized tokens.
///
/// Stop-words and single letters are dropped; every remaining token is run
/// through the skill normalizer so "JS" in a résumé meets "JavaScript" in a
/// job description.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_token_char(c))
        .map(|t| t.trim_end_matches('.'))
        .filter(|t| !t.is_empty())
        .filter(|t| t.chars().count() > 1 || t.contains(['+', '#']))
        .filter(|t| !STOPWORDS.contains(t))
        .map(normalize_skill)
        .filter(|t| !t.is_empty())
        .collect()
}

fn term_frequencies(text: &str) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

/// Cosine similarity of term-frequency vectors, in `[0, 1]`.
///
/// Returns 0.0 when either side has no tokens.
pub fn token_overlap_similarity(a: &str, b: &str) -> f32 {
    let tf_a = term_frequencies(a);
    let tf_b = term_frequencies(b);

    if tf_a.is_empty() || tf_b.is_empty() {
        return 0.0;
    }

    let dot: f64 = tf_a
        .iter()
        .filter_map(|(term, count)| {
            tf_b.get(term).map(|other| f64::from(*count) * f64::from(*other))
        })
        .sum();
    let norm_a = tf_a.values().map(|c| f64::from(*c).powi(2)).sum::<f64>().sqrt();
    let norm_b = tf_b.values().map(|c| f64::from(*c).powi(2)).sum::<f64>().sqrt();

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0) as f32
}
