use std::fmt::Write;

use readalong_rs::{Report, TokenState};

fn state_glyph(state: TokenState) -> char {
    match state {
        TokenState::Read => '#',
        TokenState::Pending => '.',
        TokenState::Skipped => 'x',
    }
}

pub fn render_report(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "generated_at: {}  language: {}  window: {}  threshold: {}",
        report.meta.generated_at,
        report.meta.language,
        report.meta.lookahead_window,
        report.meta.similarity_threshold
    );

    for case in &report.cases {
        let score = case
            .score
            .map(|s| format!("{}/100 ({})", s.value, s.band.as_str()))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "\n{}  tokens={} read={} skipped={} pending={} coverage={:.2} score={}",
            case.id,
            case.token_count,
            case.final_counts.read,
            case.final_counts.skipped,
            case.final_counts.pending,
            case.coverage,
            score
        );
        for frame in &case.frames {
            let glyphs: String = frame.states.iter().copied().map(state_glyph).collect();
            let _ = writeln!(
                out,
                "  #{:<3} [{glyphs}] {}",
                frame.update_index, frame.final_transcript
            );
        }
        if !case.notes.is_empty() {
            let _ = writeln!(out, "  notes: {}", case.notes.join(", "));
        }
    }

    let aggregates = &report.aggregates;
    let _ = writeln!(
        out,
        "\ncases={} scored={}",
        aggregates.total, aggregates.scored
    );
    if let Some(coverage) = &aggregates.coverage {
        let _ = writeln!(
            out,
            "coverage mean={:.2} p10={:.2} p50={:.2}",
            coverage.mean, coverage.p10, coverage.p50
        );
    }
    if let Some(score) = &aggregates.score {
        let _ = writeln!(out, "score mean={:.1} p50={:.1}", score.mean, score.p50);
    }
    out
}
