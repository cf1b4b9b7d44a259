/// Punctuation ignored when comparing words.
pub const IGNORED_PUNCTUATION: [char; 19] = [
    '。', '、', '，', '！', '？', '「', '」', '『', '』', '(', ')', '（', '）', '【', '】', '《', '》',
    '〈', '〉',
];

/// Splits on runs of whitespace (ideographic space included), dropping empties.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Strips comparison-irrelevant punctuation. No case or width folding.
pub fn normalize(word: &str) -> String {
    word.chars()
        .filter(|c| !IGNORED_PUNCTUATION.contains(c))
        .collect()
}

pub fn char_len(word: &str) -> usize {
    word.chars().count()
}
