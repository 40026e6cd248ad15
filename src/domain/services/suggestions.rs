//! Nearest-name suggestions for typos in type names and config keys

use strsim::levenshtein;

/// Suggest at most this many names
const MAX_SUGGESTIONS: usize = 3;

/// Names within a small edit distance of `input`, closest first.
pub fn closest_matches<'a>(
    input: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let needle = input.to_lowercase();
    let limit = (needle.chars().count() / 3).max(2);

    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .map(|c| (levenshtein(&needle, &c.to_lowercase()), c))
        .filter(|(dist, _)| *dist > 0 && *dist <= limit)
        .collect();
    scored.sort();
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, c)| c.to_string())
        .collect()
}
