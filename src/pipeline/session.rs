use serde::Serialize;

use crate::alignment::scoring::Score;
use crate::error::HighlightError;
use crate::pipeline::runtime::Highlighter;
use crate::pipeline::traits::ReadingScorer;
use crate::types::{ReferenceText, TranscriptUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    Idle,
    Recording,
    Stopped,
}

/// Outcome handed to the results surface once recognition has ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub original: String,
    pub recognized: String,
    pub score: Score,
}

/// One reading session: reference, highlighter, and the transcript of the current recording.
///
/// Final segments are concatenated exactly as delivered; the interim
/// segment is display-only and is dropped on stop. Only one recording can
/// be active, and nothing is accepted from the recognizer once it stopped.
pub struct RecordingSession {
    highlighter: Highlighter,
    scorer: Box<dyn ReadingScorer>,
    state: RecordingState,
    final_transcript: String,
    interim_transcript: String,
    last_error: Option<String>,
}

impl RecordingSession {
    pub fn new(highlighter: Highlighter, scorer: Box<dyn ReadingScorer>) -> Self {
        Self {
            highlighter,
            scorer,
            state: RecordingState::Idle,
            final_transcript: String::new(),
            interim_transcript: String::new(),
            last_error: None,
        }
    }

    pub fn set_reference(&mut self, plain_text: &str, annotated_markup: &str) {
        self.replace_reference(ReferenceText::new(plain_text, annotated_markup));
    }

    pub fn replace_reference(&mut self, reference: ReferenceText) {
        if self.state == RecordingState::Recording {
            tracing::warn!("session: reference replaced while recording; discarding transcript");
        }
        self.reset();
        self.highlighter.replace_reference(reference);
    }

    /// Begins a recording and returns the untagged markup to display.
    pub fn start(&mut self) -> Result<String, HighlightError> {
        if self.state == RecordingState::Recording {
            return Err(HighlightError::AlreadyRecording);
        }
        self.clear_transcript();
        self.highlighter.reset();
        self.state = RecordingState::Recording;
        tracing::info!(
            token_count = self.highlighter.reference().tokens().len(),
            language = self.highlighter.config().language.as_str(),
            "session: recording started"
        );
        Ok(self.highlighter.reference().annotated_markup().to_string())
    }

    /// Applies one recognizer result.
    ///
    /// Returns fresh markup when the accumulated final transcript has any
    /// words, `None` when the update was ignored or carried nothing final yet.
    pub fn on_update(&mut self, update: &TranscriptUpdate) -> Option<String> {
        if self.state != RecordingState::Recording {
            tracing::debug!(
                state = ?self.state,
                "session: ignoring transcript update outside recording"
            );
            return None;
        }

        self.final_transcript.push_str(&update.final_segment);
        self.interim_transcript.clone_from(&update.interim_segment);

        if self.final_transcript.trim().is_empty() {
            return None;
        }
        Some(
            self.highlighter
                .on_transcript_update(&self.final_transcript),
        )
    }

    /// Records a recognizer failure. The recording is over, but what was already final is kept.
    pub fn on_error(&mut self, message: &str) {
        tracing::warn!(error = message, "session: recognition error");
        self.last_error = Some(message.to_string());
        self.interim_transcript.clear();
        self.state = RecordingState::Stopped;
    }

    pub fn stop(&mut self) -> Result<(), HighlightError> {
        if self.state != RecordingState::Recording {
            return Err(HighlightError::NotRecording);
        }
        self.interim_transcript.clear();
        self.state = RecordingState::Stopped;
        tracing::info!(
            transcript_chars = self.final_transcript.chars().count(),
            "session: recording stopped"
        );
        Ok(())
    }

    /// Handles the recognizer's terminal notification and scores the reading.
    ///
    /// Yields `None` when nothing final was recognized.
    pub fn on_end(&mut self) -> Result<Option<Evaluation>, HighlightError> {
        if self.state == RecordingState::Recording {
            self.interim_transcript.clear();
            self.state = RecordingState::Stopped;
        }
        if self.final_transcript.trim().is_empty() {
            return Ok(None);
        }

        let original = self.highlighter.reference().plain_text().to_string();
        let score = self.scorer.score(&original, &self.final_transcript)?;
        tracing::info!(
            score = score.value,
            band = score.band.as_str(),
            "session: reading scored"
        );
        Ok(Some(Evaluation {
            original,
            recognized: self.final_transcript.clone(),
            score,
        }))
    }

    /// Plain status line for the results surface.
    pub fn status_text(&self) -> String {
        if let Some(error) = &self.last_error {
            return format!("recognition error: {error}");
        }
        match self.state {
            RecordingState::Idle => String::new(),
            RecordingState::Recording => {
                format!("{}{}", self.final_transcript, self.interim_transcript)
            }
            RecordingState::Stopped => self.final_transcript.clone(),
        }
    }

    /// Back to idle with no transcript and all tokens pending.
    pub fn reset(&mut self) {
        self.clear_transcript();
        self.highlighter.reset();
        self.state = RecordingState::Idle;
    }

    fn clear_transcript(&mut self) {
        self.final_transcript.clear();
        self.interim_transcript.clear();
        self.last_error = None;
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn final_transcript(&self) -> &str {
        &self.final_transcript
    }

    pub fn interim_transcript(&self) -> &str {
        &self.interim_transcript
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }
}

#[cfg(test)]
mod tests {
    use crate::pipeline::builder::HighlighterBuilder;
    use crate::types::TokenState;
    use crate::HighlightConfig;

    use super::*;

    const PLAIN: &str = "今日 は 晴れ です";

    fn session() -> RecordingSession {
        let mut session = HighlighterBuilder::new(HighlightConfig::default())
            .build_session()
            .expect("default config is valid");
        session.set_reference(PLAIN, PLAIN);
        session
    }

    #[test]
    fn start_returns_untagged_markup_and_rejects_second_start() {
        let mut s = session();
        assert_eq!(s.start().expect("first start"), PLAIN);
        assert!(matches!(s.start(), Err(HighlightError::AlreadyRecording)));
        assert_eq!(s.state(), RecordingState::Recording);
    }

    #[test]
    fn final_segments_accumulate_and_interim_is_replaced() {
        let mut s = session();
        s.start().expect("start");
        assert!(s.on_update(&TranscriptUpdate::interim_only("今日")).is_none());
        assert_eq!(s.status_text(), "今日");

        let markup = s
            .on_update(&TranscriptUpdate {
                final_segment: "今日 ".to_string(),
                interim_segment: "は".to_string(),
            })
            .expect("final text present");
        assert!(markup.contains("<span class=\"karaoke-highlight\">今日</span>"));
        assert_eq!(s.interim_transcript(), "は");

        s.on_update(&TranscriptUpdate::final_only("は 晴れ"));
        assert_eq!(s.final_transcript(), "今日 は 晴れ");
        assert_eq!(s.interim_transcript(), "");
        assert_eq!(
            s.highlighter().states(),
            [TokenState::Read, TokenState::Read, TokenState::Read, TokenState::Pending]
        );
    }

    #[test]
    fn updates_after_stop_are_ignored() {
        let mut s = session();
        s.start().expect("start");
        s.on_update(&TranscriptUpdate::final_only("今日"));
        s.stop().expect("stop");
        assert!(s.on_update(&TranscriptUpdate::final_only(" は")).is_none());
        assert_eq!(s.final_transcript(), "今日");
        assert!(matches!(s.stop(), Err(HighlightError::NotRecording)));
    }

    #[test]
    fn updates_before_start_are_ignored() {
        let mut s = session();
        assert!(s.on_update(&TranscriptUpdate::final_only("今日")).is_none());
        assert_eq!(s.final_transcript(), "");
    }

    #[test]
    fn end_scores_final_transcript() {
        let mut s = session();
        s.start().expect("start");
        s.on_update(&TranscriptUpdate::final_only(PLAIN));
        let evaluation = s
            .on_end()
            .expect("scoring succeeds")
            .expect("transcript present");
        assert_eq!(s.state(), RecordingState::Stopped);
        assert_eq!(evaluation.score.value, 100);
        assert_eq!(evaluation.original, PLAIN);
        assert_eq!(evaluation.recognized, PLAIN);
    }

    #[test]
    fn end_without_speech_has_no_evaluation() {
        let mut s = session();
        s.start().expect("start");
        s.on_update(&TranscriptUpdate::interim_only("今日"));
        assert!(s.on_end().expect("no scoring needed").is_none());
    }

    #[test]
    fn error_stops_recording_and_reports_status() {
        let mut s = session();
        s.start().expect("start");
        s.on_update(&TranscriptUpdate::final_only("今日"));
        s.on_error("network");
        assert_eq!(s.state(), RecordingState::Stopped);
        assert_eq!(s.status_text(), "recognition error: network");
        assert!(s.on_update(&TranscriptUpdate::final_only("は")).is_none());
        assert!(s.on_end().expect("scoring succeeds").is_some());
    }

    #[test]
    fn restart_clears_previous_recording() {
        let mut s = session();
        s.start().expect("start");
        s.on_update(&TranscriptUpdate::final_only("今日 は"));
        s.stop().expect("stop");
        s.start().expect("restart after stop");
        assert_eq!(s.final_transcript(), "");
        assert!(s
            .highlighter()
            .states()
            .iter()
            .all(|state| *state == TokenState::Pending));
    }
}
