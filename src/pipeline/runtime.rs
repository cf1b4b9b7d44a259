use crate::alignment::render::DecorationClasses;
use crate::alignment::tokenization::tokenize;
use crate::config::HighlightConfig;
use crate::pipeline::traits::{MarkupRenderer, SequenceAligner, WordMatcher};
use crate::types::{ReferenceText, TokenState};

/// Karaoke highlighter for one reading session.
///
/// Owns the reference passage and re-derives every token state from the
/// full final transcript on each update.
pub struct Highlighter {
    reference: ReferenceText,
    config: HighlightConfig,
    classes: DecorationClasses,
    matcher: Box<dyn WordMatcher>,
    aligner: Box<dyn SequenceAligner>,
    renderer: Box<dyn MarkupRenderer>,
}

pub(crate) struct HighlighterParts {
    pub config: HighlightConfig,
    pub matcher: Box<dyn WordMatcher>,
    pub aligner: Box<dyn SequenceAligner>,
    pub renderer: Box<dyn MarkupRenderer>,
}

impl Highlighter {
    pub(crate) fn from_parts(parts: HighlighterParts) -> Self {
        Self {
            reference: ReferenceText::default(),
            classes: DecorationClasses::from_config(&parts.config),
            config: parts.config,
            matcher: parts.matcher,
            aligner: parts.aligner,
            renderer: parts.renderer,
        }
    }

    pub fn set_reference(&mut self, plain_text: &str, annotated_markup: &str) {
        self.replace_reference(ReferenceText::new(plain_text, annotated_markup));
    }

    pub fn replace_reference(&mut self, reference: ReferenceText) {
        tracing::debug!(
            token_count = reference.tokens().len(),
            markup_len = reference.annotated_markup().len(),
            "highlighter: reference set"
        );
        self.reference = reference;
    }

    /// Markup for the final transcript received so far.
    ///
    /// Blank input yields the untouched reference markup, whatever was shown before.
    pub fn on_transcript_update(&mut self, final_text: &str) -> String {
        let recognized = tokenize(final_text);
        if recognized.is_empty() {
            self.reset();
            return self.reference.annotated_markup().to_string();
        }

        let states = self
            .aligner
            .align(self.reference.tokens(), &recognized, self.matcher.as_ref());
        let token_count = self.reference.tokens().len();
        if states.len() != token_count {
            tracing::warn!(
                state_count = states.len(),
                token_count,
                "highlighter: aligner state count differs from reference, unmatched tokens stay pending"
            );
        }
        self.reset();
        for (token, state) in self.reference.tokens_mut().iter_mut().zip(states) {
            token.state = state;
        }

        self.renderer.render(
            self.reference.annotated_markup(),
            self.reference.tokens(),
            &self.classes,
        )
    }

    pub fn reset(&mut self) {
        for token in self.reference.tokens_mut() {
            token.state = TokenState::Pending;
        }
    }

    pub fn reference(&self) -> &ReferenceText {
        &self.reference
    }

    pub fn states(&self) -> Vec<TokenState> {
        self.reference.states()
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    pub fn classes(&self) -> &DecorationClasses {
        &self.classes
    }
}
