use std::collections::HashMap;

use serde::Serialize;

/// Sequences at least this long drop very frequent chars from the match index.
const AUTOJUNK_MIN_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub const GOOD_MIN: u8 = 80;
    pub const FAIR_MIN: u8 = 60;

    pub fn from_value(value: u8) -> Self {
        if value >= Self::GOOD_MIN {
            Self::Good
        } else if value >= Self::FAIR_MIN {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    /// Integer score in [0, 100], truncated from `similarity * 100`.
    pub value: u8,
    pub similarity: f64,
    pub band: ScoreBand,
}

impl Score {
    pub fn from_similarity(similarity: f64) -> Self {
        let clamped = similarity.clamp(0.0, 1.0);
        let value = (clamped * 100.0).floor() as u8;
        Self {
            value,
            similarity: clamped,
            band: ScoreBand::from_value(value),
        }
    }
}

/// Char-level matching ratio `2 * M / T`, where `M` is the total size of
/// the blocks found by repeatedly taking the longest common substring and
/// recursing on both sides, and `T` is the combined length. Two empty
/// inputs score 1.0.
pub fn sequence_ratio(original: &str, recognized: &str) -> f64 {
    let a: Vec<char> = original.chars().collect();
    let b: Vec<char> = recognized.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_chars(&a, &b);
    2.0 * matched as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let index = build_index(b);
    let mut matched = 0usize;
    let mut queue = vec![(0usize, a.len(), 0usize, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, b, &index, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Positions of each char in `b`, minus chars that are too common in long inputs.
fn build_index(b: &[char]) -> HashMap<char, Vec<usize>> {
    let mut index: HashMap<char, Vec<usize>> = HashMap::new();
    for (pos, &c) in b.iter().enumerate() {
        index.entry(c).or_default().push(pos);
    }
    if b.len() >= AUTOJUNK_MIN_LEN {
        let popular_limit = b.len() / 100 + 1;
        index.retain(|_, positions| positions.len() <= popular_limit);
    }
    index
}

/// Longest block `a[i..i+k] == b[j..j+k]` inside the given bounds, earliest in `a` then `b` on ties.
fn longest_match(
    a: &[char],
    b: &[char],
    index: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0usize);
    let mut run_len: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_run_len = HashMap::new();
        if let Some(positions) = index.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run_len.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_run_len.insert(j, k);
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        run_len = next_run_len;
    }

    // Chars dropped from the index can still extend a block at either end.
    while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
        best_i -= 1;
        best_j -= 1;
        best_k += 1;
    }
    while best_i + best_k < ahi && best_j + best_k < bhi && a[best_i + best_k] == b[best_j + best_k]
    {
        best_k += 1;
    }

    (best_i, best_j, best_k)
}
