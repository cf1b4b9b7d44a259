use crate::config::HighlightConfig;
use crate::error::HighlightError;
use crate::pipeline::defaults::{
    EditDistanceMatcher, LookaheadAligner, SequenceRatioScorer, SpanRenderer,
};
use crate::pipeline::runtime::{Highlighter, HighlighterParts};
use crate::pipeline::session::RecordingSession;
use crate::pipeline::traits::{MarkupRenderer, ReadingScorer, SequenceAligner, WordMatcher};

pub struct HighlighterBuilder {
    config: HighlightConfig,
    matcher: Option<Box<dyn WordMatcher>>,
    aligner: Option<Box<dyn SequenceAligner>>,
    renderer: Option<Box<dyn MarkupRenderer>>,
    scorer: Option<Box<dyn ReadingScorer>>,
}

impl HighlighterBuilder {
    pub fn new(config: HighlightConfig) -> Self {
        Self {
            config,
            matcher: None,
            aligner: None,
            renderer: None,
            scorer: None,
        }
    }

    pub fn with_matcher(mut self, matcher: Box<dyn WordMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn with_aligner(mut self, aligner: Box<dyn SequenceAligner>) -> Self {
        self.aligner = Some(aligner);
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn MarkupRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Only used by [`HighlighterBuilder::build_session`].
    pub fn with_scorer(mut self, scorer: Box<dyn ReadingScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn build(self) -> Result<Highlighter, HighlightError> {
        self.build_parts().map(|(highlighter, _)| highlighter)
    }

    pub fn build_session(self) -> Result<RecordingSession, HighlightError> {
        let (highlighter, scorer) = self.build_parts()?;
        Ok(RecordingSession::new(highlighter, scorer))
    }

    fn build_parts(self) -> Result<(Highlighter, Box<dyn ReadingScorer>), HighlightError> {
        self.config.validate()?;

        let matcher = self
            .matcher
            .unwrap_or_else(|| Box::new(EditDistanceMatcher::from_config(&self.config)));
        let aligner = self.aligner.unwrap_or_else(|| {
            Box::new(LookaheadAligner {
                window: self.config.lookahead_window,
            })
        });
        let renderer = self.renderer.unwrap_or_else(|| Box::new(SpanRenderer));
        let scorer = self.scorer.unwrap_or_else(|| Box::new(SequenceRatioScorer));

        let highlighter = Highlighter::from_parts(HighlighterParts {
            config: self.config,
            matcher,
            aligner,
            renderer,
        });
        Ok((highlighter, scorer))
    }
}

#[cfg(test)]
mod tests {
    use crate::alignment::render::DecorationClasses;
    use crate::alignment::scoring::{Score, ScoreBand};
    use crate::types::{Token, TokenState, TranscriptUpdate};

    use super::*;

    struct AlwaysMatch;

    impl WordMatcher for AlwaysMatch {
        fn matches(&self, _reference: &str, _recognized: &str) -> bool {
            true
        }
    }

    struct PlainRenderer;

    impl MarkupRenderer for PlainRenderer {
        fn render(&self, _markup: &str, tokens: &[Token], _classes: &DecorationClasses) -> String {
            tokens
                .iter()
                .map(|t| format!("{}:{}", t.text, t.state.as_str()))
                .collect::<Vec<_>>()
                .join(" ")
        }
    }

    struct FixedScorer(u8);

    impl ReadingScorer for FixedScorer {
        fn score(&self, _original: &str, _recognized: &str) -> Result<Score, HighlightError> {
            Ok(Score {
                value: self.0,
                similarity: self.0 as f64 / 100.0,
                band: ScoreBand::from_value(self.0),
            })
        }
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let config = HighlightConfig {
            lookahead_window: 0,
            ..HighlightConfig::default()
        };
        assert!(HighlighterBuilder::new(config).build().is_err());
    }

    #[test]
    fn builder_wires_config_into_defaults() {
        let config = HighlightConfig {
            read_class: "done".to_string(),
            ..HighlightConfig::default()
        };
        let mut highlighter = HighlighterBuilder::new(config).build().expect("valid config");
        highlighter.set_reference("本", "本");
        assert_eq!(
            highlighter.on_transcript_update("本"),
            "<span class=\"done\">本</span>"
        );
    }

    #[test]
    fn custom_components_are_used() {
        let mut highlighter = HighlighterBuilder::new(HighlightConfig::default())
            .with_matcher(Box::new(AlwaysMatch))
            .with_renderer(Box::new(PlainRenderer))
            .build()
            .expect("valid config");
        highlighter.set_reference("A B", "A B");
        assert_eq!(highlighter.on_transcript_update("X"), "A:read B:pending");
        assert_eq!(highlighter.states(), [TokenState::Read, TokenState::Pending]);
    }

    #[test]
    fn session_uses_custom_scorer() {
        let mut session = HighlighterBuilder::new(HighlightConfig::default())
            .with_scorer(Box::new(FixedScorer(42)))
            .build_session()
            .expect("valid config");
        session.set_reference("本", "本");
        session.start().expect("idle session starts");
        session.on_update(&TranscriptUpdate::final_only("本"));
        session.stop().expect("recording session stops");
        let evaluation = session
            .on_end()
            .expect("scoring succeeds")
            .expect("transcript present");
        assert_eq!(evaluation.score.value, 42);
    }
}
