use crate::alignment::lookahead::align_with_lookahead;
use crate::alignment::render::{render_tagged, DecorationClasses};
use crate::alignment::scoring::{sequence_ratio, Score};
use crate::alignment::similarity::words_match;
use crate::config::HighlightConfig;
use crate::error::HighlightError;
use crate::pipeline::traits::{MarkupRenderer, ReadingScorer, SequenceAligner, WordMatcher};
use crate::types::{Token, TokenState};

pub struct EditDistanceMatcher {
    pub threshold: f64,
    pub max_length_delta: usize,
}

impl EditDistanceMatcher {
    pub fn from_config(config: &HighlightConfig) -> Self {
        Self {
            threshold: config.similarity_threshold,
            max_length_delta: config.max_length_delta,
        }
    }
}

impl Default for EditDistanceMatcher {
    fn default() -> Self {
        Self::from_config(&HighlightConfig::default())
    }
}

impl WordMatcher for EditDistanceMatcher {
    fn matches(&self, reference: &str, recognized: &str) -> bool {
        words_match(reference, recognized, self.threshold, self.max_length_delta)
    }
}

pub struct LookaheadAligner {
    pub window: usize,
}

impl Default for LookaheadAligner {
    fn default() -> Self {
        Self {
            window: HighlightConfig::DEFAULT_LOOKAHEAD_WINDOW,
        }
    }
}

impl SequenceAligner for LookaheadAligner {
    fn align(
        &self,
        reference: &[Token],
        recognized: &[&str],
        matcher: &dyn WordMatcher,
    ) -> Vec<TokenState> {
        align_with_lookahead(reference, recognized, self.window, |a, b| {
            matcher.matches(a, b)
        })
    }
}

pub struct SpanRenderer;

impl MarkupRenderer for SpanRenderer {
    fn render(&self, markup: &str, tokens: &[Token], classes: &DecorationClasses) -> String {
        render_tagged(markup, tokens, classes)
    }
}

/// Whole-text char similarity, scored as `floor(ratio * 100)`.
pub struct SequenceRatioScorer;

impl ReadingScorer for SequenceRatioScorer {
    fn score(&self, original: &str, recognized: &str) -> Result<Score, HighlightError> {
        Ok(Score::from_similarity(sequence_ratio(original, recognized)))
    }
}
