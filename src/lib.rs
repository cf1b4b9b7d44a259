pub mod alignment;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

pub use alignment::render::{render_tagged, strip_decorations, DecorationClasses};
pub use alignment::report::{
    aggregate_reports, compute_case_report, CaseReport, FrameReport, Meta, Report,
};
pub use alignment::scoring::{Score, ScoreBand};
pub use config::HighlightConfig;
pub use error::HighlightError;
pub use pipeline::builder::HighlighterBuilder;
pub use pipeline::runtime::Highlighter;
pub use pipeline::session::{Evaluation, RecordingSession, RecordingState};
pub use pipeline::traits::{MarkupRenderer, ReadingScorer, SequenceAligner, WordMatcher};
pub use types::{ReferenceText, StateCounts, Token, TokenState, TranscriptUpdate};
