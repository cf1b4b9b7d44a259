use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HighlightError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Reference positions inspected per recognized word, the current one included.
    pub lookahead_window: usize,
    /// Similarity must be strictly above this to count as a match.
    pub similarity_threshold: f64,
    /// Largest length difference (in chars) for which similarity is computed at all.
    pub max_length_delta: usize,
    pub read_class: String,
    pub pending_class: String,
    pub skipped_class: String,
    /// BCP 47 tag handed to the recognition source by the embedding adapter.
    pub language: String,
}

impl HighlightConfig {
    pub const DEFAULT_LOOKAHEAD_WINDOW: usize = 3;
    pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;
    pub const DEFAULT_MAX_LENGTH_DELTA: usize = 1;
    pub const DEFAULT_LANGUAGE: &'static str = "ja-JP";

    pub fn load(path: &Path) -> Result<Self, HighlightError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| HighlightError::io("read highlight config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| HighlightError::json("parse highlight config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HighlightError> {
        if self.lookahead_window == 0 {
            return Err(HighlightError::invalid_config(
                "lookahead_window",
                "must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(HighlightError::invalid_config(
                "similarity_threshold",
                format!("{} is outside [0, 1]", self.similarity_threshold),
            ));
        }
        for (field, class) in [
            ("read_class", &self.read_class),
            ("pending_class", &self.pending_class),
            ("skipped_class", &self.skipped_class),
        ] {
            if class.trim().is_empty() {
                return Err(HighlightError::invalid_config(field, "must not be empty"));
            }
            if class.contains(['"', '<', '>', '&']) {
                return Err(HighlightError::invalid_config(
                    field,
                    format!("'{class}' contains markup characters"),
                ));
            }
        }
        Ok(())
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            lookahead_window: Self::DEFAULT_LOOKAHEAD_WINDOW,
            similarity_threshold: Self::DEFAULT_SIMILARITY_THRESHOLD,
            max_length_delta: Self::DEFAULT_MAX_LENGTH_DELTA,
            read_class: "karaoke-highlight".to_string(),
            pending_class: "karaoke-pending".to_string(),
            skipped_class: "karaoke-skipped".to_string(),
            language: Self::DEFAULT_LANGUAGE.to_string(),
        }
    }
}
