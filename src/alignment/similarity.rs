use strsim::levenshtein;

use super::tokenization::{char_len, normalize};

/// Unit-cost insertion/deletion/substitution distance over chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    levenshtein(a, b)
}

/// `(max_len - distance) / max_len`, with two empty strings defined as 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = char_len(a).max(char_len(b));
    if max_len == 0 {
        return 1.0;
    }
    let distance = edit_distance(a, b);
    (max_len - distance) as f64 / max_len as f64
}

/// Decides whether a recognized word counts as the reference word.
///
/// Normalized forms that are equal always match. Otherwise similarity is
/// only considered when the lengths differ by at most `max_length_delta`,
/// and must be strictly greater than `threshold`.
pub fn words_match(
    reference: &str,
    recognized: &str,
    threshold: f64,
    max_length_delta: usize,
) -> bool {
    let a = normalize(reference);
    let b = normalize(recognized);
    if a == b {
        return true;
    }

    if char_len(&a).abs_diff(char_len(&b)) > max_length_delta {
        return false;
    }
    similarity(&a, &b) > threshold
}
