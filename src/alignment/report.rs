use std::cmp::Ordering;

use serde::Serialize;

use super::scoring::Score;
use crate::error::HighlightError;
use crate::types::{StateCounts, TokenState};

const OUTLIER_TOP_N: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub cases: Vec<CaseReport>,
    pub aggregates: AggregateReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub language: String,
    pub lookahead_window: u32,
    pub similarity_threshold: f64,
    pub case_count: usize,
}

/// Highlight state after one transcript update.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub update_index: u32,
    pub final_transcript: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub interim_transcript: String,
    pub counts: StateCounts,
    pub states: Vec<TokenState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub id: String,
    pub token_count: u32,
    pub update_count: u32,
    pub final_counts: StateCounts,
    pub coverage: f32,
    pub skipped_ratio: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    pub frames: Vec<FrameReport>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub total: u32,
    pub scored: u32,
    pub coverage: Option<MetricDistribution>,
    pub skipped_ratio: Option<MetricDistribution>,
    pub score: Option<MetricDistribution>,
    pub lowest_coverage: Vec<OutlierEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricDistribution {
    pub mean: f32,
    pub p10: f32,
    pub p50: f32,
    pub p90: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlierEntry {
    pub id: String,
    pub value: f32,
}

pub fn compute_case_report(
    id: &str,
    token_count: usize,
    frames: Vec<FrameReport>,
    score: Option<Score>,
) -> Result<CaseReport, HighlightError> {
    let mut notes = Vec::new();
    if token_count == 0 {
        notes.push("empty_reference".to_string());
    }
    if frames.is_empty() {
        notes.push("no_updates".to_string());
    }

    let final_states = frames
        .iter()
        .rev()
        .find(|frame| !frame.states.is_empty())
        .map(|frame| frame.states.clone())
        .unwrap_or_else(|| vec![TokenState::Pending; token_count]);
    if final_states.len() != token_count {
        return Err(HighlightError::invalid_input(format!(
            "case '{id}': final frame has {} states for {token_count} tokens",
            final_states.len()
        )));
    }

    let regressions = count_read_regressions(&frames);
    if regressions > 0 {
        notes.push(format!("read_regressions={regressions}"));
    }

    let final_counts = StateCounts::tally(&final_states);
    let skipped_ratio = if token_count == 0 {
        0.0
    } else {
        final_counts.skipped as f64 / token_count as f64
    };

    Ok(CaseReport {
        id: id.to_string(),
        token_count: to_u32(token_count),
        update_count: to_u32(frames.len()),
        final_counts,
        coverage: checked_f32(final_counts.coverage() as f64, "case.coverage")?,
        skipped_ratio: checked_f32(skipped_ratio, "case.skipped_ratio")?,
        score,
        frames,
        notes,
    })
}

pub fn aggregate_reports(cases: &[CaseReport]) -> AggregateReport {
    let coverage: Vec<f64> = cases.iter().map(|c| c.coverage as f64).collect();
    let skipped: Vec<f64> = cases.iter().map(|c| c.skipped_ratio as f64).collect();
    let scores: Vec<f64> = cases
        .iter()
        .filter_map(|c| c.score.map(|s| s.value as f64))
        .collect();

    let mut lowest_coverage: Vec<OutlierEntry> = cases
        .iter()
        .map(|c| OutlierEntry {
            id: c.id.clone(),
            value: c.coverage,
        })
        .collect();
    lowest_coverage.sort_by(|a, b| {
        a.value
            .partial_cmp(&b.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    lowest_coverage.truncate(OUTLIER_TOP_N);

    AggregateReport {
        total: to_u32(cases.len()),
        scored: to_u32(scores.len()),
        coverage: distribution_or_none(&coverage, "coverage"),
        skipped_ratio: distribution_or_none(&skipped, "skipped_ratio"),
        score: distribution_or_none(&scores, "score"),
        lowest_coverage,
    }
}

/// Number of (update, token) pairs where a token read in one frame is no longer read in the next.
fn count_read_regressions(frames: &[FrameReport]) -> usize {
    frames
        .windows(2)
        .map(|pair| {
            pair[0]
                .states
                .iter()
                .zip(pair[1].states.iter())
                .filter(|(before, after)| **before == TokenState::Read && **after != TokenState::Read)
                .count()
        })
        .sum()
}

fn distribution_or_none(values: &[f64], metric_name: &str) -> Option<MetricDistribution> {
    if values.is_empty() {
        return None;
    }

    match distribution(values) {
        Ok(distribution) => Some(distribution),
        Err(err) => {
            tracing::warn!(metric = metric_name, error = %err, "report: aggregate left out");
            None
        }
    }
}

fn distribution(values: &[f64]) -> Result<MetricDistribution, HighlightError> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    Ok(MetricDistribution {
        mean: checked_f32(mean(&sorted), "aggregate.mean")?,
        p10: checked_f32(percentile_sorted(&sorted, 0.1), "aggregate.p10")?,
        p50: checked_f32(percentile_sorted(&sorted, 0.5), "aggregate.p50")?,
        p90: checked_f32(percentile_sorted(&sorted, 0.9), "aggregate.p90")?,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn percentile_sorted(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    if sorted_values.len() == 1 {
        return sorted_values[0];
    }

    let clamped = percentile.clamp(0.0, 1.0);
    let max_index = (sorted_values.len() - 1) as f64;
    let rank = clamped * max_index;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted_values[lower]
    } else {
        let weight = rank - lower as f64;
        sorted_values[lower] * (1.0 - weight) + sorted_values[upper] * weight
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn checked_f32(value: f64, metric_name: &str) -> Result<f32, HighlightError> {
    if !value.is_finite() {
        return Err(HighlightError::invalid_input(format!(
            "metric '{metric_name}' produced non-finite value: {value}"
        )));
    }
    Ok(value as f32)
}
