use crate::alignment::render::DecorationClasses;
use crate::alignment::scoring::Score;
use crate::error::HighlightError;
use crate::types::{Token, TokenState};

pub trait WordMatcher: Send + Sync {
    fn matches(&self, reference: &str, recognized: &str) -> bool;
}

pub trait SequenceAligner: Send + Sync {
    /// One state per reference token. Must not depend on earlier calls.
    fn align(
        &self,
        reference: &[Token],
        recognized: &[&str],
        matcher: &dyn WordMatcher,
    ) -> Vec<TokenState>;
}

pub trait MarkupRenderer: Send + Sync {
    fn render(&self, markup: &str, tokens: &[Token], classes: &DecorationClasses) -> String;
}

pub trait ReadingScorer: Send + Sync {
    fn score(&self, original: &str, recognized: &str) -> Result<Score, HighlightError>;
}
