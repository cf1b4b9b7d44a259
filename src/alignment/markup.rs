use std::ops::Range;

/// Elements whose content is a reading annotation rather than passage text.
const ANNOTATION_ELEMENTS: [&str; 2] = ["rt", "rp"];

/// Byte ranges of passage text in `markup`.
///
/// Tag bodies (attributes included) are never part of a range, and neither
/// is the content of `<rt>`/`<rp>` ruby annotations. An unterminated tag
/// swallows the rest of the input.
pub fn text_runs(markup: &str) -> Vec<Range<usize>> {
    let bytes = markup.as_bytes();
    let mut runs = Vec::new();
    let mut annotation_depth = 0usize;
    let mut pos = 0usize;
    let mut run_start = 0usize;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }

        if annotation_depth == 0 && run_start < pos {
            runs.push(run_start..pos);
        }

        let Some(tag_end) = find_tag_end(bytes, pos + 1) else {
            return runs;
        };
        let (closing, name) = tag_name(&markup[pos + 1..tag_end]);
        if ANNOTATION_ELEMENTS
            .iter()
            .any(|element| name.eq_ignore_ascii_case(element))
        {
            if closing {
                annotation_depth = annotation_depth.saturating_sub(1);
            } else {
                annotation_depth += 1;
            }
        }

        pos = tag_end + 1;
        run_start = pos;
    }

    if annotation_depth == 0 && run_start < bytes.len() {
        runs.push(run_start..bytes.len());
    }
    runs
}

/// Passage text of `markup` with tags and ruby readings removed. Entities are kept as written.
pub fn visible_text(markup: &str) -> String {
    text_runs(markup)
        .into_iter()
        .map(|run| &markup[run])
        .collect()
}

/// First occurrence of `needle` at or after byte `from` lying wholly inside one text run.
pub fn find_in_runs(
    markup: &str,
    runs: &[Range<usize>],
    needle: &str,
    from: usize,
) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    runs.iter()
        .filter(|run| run.end > from)
        .find_map(|run| {
            let start = run.start.max(from);
            markup[start..run.end].find(needle).map(|offset| start + offset)
        })
}

/// Index of the `>` closing the tag whose body starts at `from`, honouring quoted attribute values.
fn find_tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (idx, &b) in bytes.iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(idx),
            None => {}
        }
    }
    None
}

fn tag_name(body: &str) -> (bool, &str) {
    let (closing, rest) = match body.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    (closing, &rest[..end])
}
