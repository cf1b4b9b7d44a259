use serde::{Deserialize, Serialize};

use crate::alignment::markup::visible_text;
use crate::alignment::tokenization::{normalize, tokenize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenState {
    #[default]
    Pending,
    Read,
    Skipped,
}

impl TokenState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Read => "read",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Raw reference word, punctuation included. This is what gets located in the markup.
    pub text: String,
    /// Comparison key; never rendered.
    pub normalized: String,
    pub state: TokenState,
}

impl Token {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let normalized = normalize(&text);
        Self {
            text,
            normalized,
            state: TokenState::Pending,
        }
    }
}

/// Reference passage for one reading session.
///
/// Token `i` corresponds to the `i`-th textual occurrence of that word in
/// `annotated_markup`, ruby readings excluded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceText {
    plain_text: String,
    tokens: Vec<Token>,
    annotated_markup: String,
}

impl ReferenceText {
    pub fn new(plain_text: impl Into<String>, annotated_markup: impl Into<String>) -> Self {
        let plain_text = plain_text.into();
        let annotated_markup = annotated_markup.into();
        let tokens: Vec<Token> = tokenize(&plain_text).into_iter().map(Token::new).collect();

        let visible = visible_text(&annotated_markup);
        let derived = tokenize(&visible);
        let plain = tokens.iter().map(|t| t.text.as_str());
        if !annotated_markup.is_empty() && !derived.iter().copied().eq(plain) {
            tracing::warn!(
                plain_token_count = tokens.len(),
                markup_token_count = derived.len(),
                "reference: plain text does not match markup text; some words may stay undecorated"
            );
        }

        Self {
            plain_text,
            tokens,
            annotated_markup,
        }
    }

    /// Builds a reference whose plain text is the markup's visible text.
    pub fn from_markup(annotated_markup: impl Into<String>) -> Self {
        let annotated_markup = annotated_markup.into();
        let plain_text = visible_text(&annotated_markup);
        Self::new(plain_text, annotated_markup)
    }

    pub fn plain_text(&self) -> &str {
        &self.plain_text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    pub fn annotated_markup(&self) -> &str {
        &self.annotated_markup
    }

    pub fn states(&self) -> Vec<TokenState> {
        self.tokens.iter().map(|t| t.state).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// One result event from the recognition source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptUpdate {
    /// Committed text, appended to the session transcript.
    #[serde(default)]
    pub final_segment: String,
    /// Provisional text, replaced by the next update.
    #[serde(default)]
    pub interim_segment: String,
}

impl TranscriptUpdate {
    pub fn final_only(segment: impl Into<String>) -> Self {
        Self {
            final_segment: segment.into(),
            interim_segment: String::new(),
        }
    }

    pub fn interim_only(segment: impl Into<String>) -> Self {
        Self {
            final_segment: String::new(),
            interim_segment: segment.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StateCounts {
    pub read: usize,
    pub pending: usize,
    pub skipped: usize,
}

impl StateCounts {
    pub fn tally(states: &[TokenState]) -> Self {
        states.iter().fold(Self::default(), |mut acc, state| {
            match state {
                TokenState::Read => acc.read += 1,
                TokenState::Pending => acc.pending += 1,
                TokenState::Skipped => acc.skipped += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.read + self.pending + self.skipped
    }

    /// Share of tokens read, in [0, 1]. An empty reference counts as fully read.
    pub fn coverage(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            return 1.0;
        }
        self.read as f32 / total as f32
    }
}
