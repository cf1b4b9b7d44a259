use super::markup::{find_in_runs, text_runs};
use crate::config::HighlightConfig;
use crate::types::{Token, TokenState};

const SPAN_CLOSE: &str = "</span>";

/// CSS class applied per token state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationClasses {
    pub read: String,
    pub pending: String,
    pub skipped: String,
}

impl DecorationClasses {
    pub fn from_config(config: &HighlightConfig) -> Self {
        Self {
            read: config.read_class.clone(),
            pending: config.pending_class.clone(),
            skipped: config.skipped_class.clone(),
        }
    }

    pub fn class_for(&self, state: TokenState) -> &str {
        match state {
            TokenState::Read => &self.read,
            TokenState::Pending => &self.pending,
            TokenState::Skipped => &self.skipped,
        }
    }

    fn openings(&self) -> [String; 3] {
        [
            span_open(&self.read),
            span_open(&self.pending),
            span_open(&self.skipped),
        ]
    }
}

impl Default for DecorationClasses {
    fn default() -> Self {
        Self::from_config(&HighlightConfig::default())
    }
}

fn span_open(class: &str) -> String {
    format!("<span class=\"{class}\">")
}

/// Wraps each token's next occurrence in `markup` with a state span.
///
/// Occurrences are searched in passage text only, starting where the
/// previous decoration ended, so repeated words are decorated in order and
/// never twice. A token that cannot be located is left as is and does not
/// move the cursor. Original characters are copied through untouched.
pub fn render_tagged(markup: &str, tokens: &[Token], classes: &DecorationClasses) -> String {
    let runs = text_runs(markup);
    let mut out = String::with_capacity(markup.len() + tokens.len() * 40);
    let mut cursor = 0usize;
    let mut dropped = 0usize;

    for (idx, token) in tokens.iter().enumerate() {
        let Some(pos) = find_in_runs(markup, &runs, &token.text, cursor) else {
            dropped += 1;
            tracing::debug!(
                token_index = idx,
                token = token.text.as_str(),
                cursor,
                "render: token not found in markup text, leaving undecorated"
            );
            continue;
        };

        let end = pos + token.text.len();
        out.push_str(&markup[cursor..pos]);
        out.push_str(&span_open(classes.class_for(token.state)));
        out.push_str(&markup[pos..end]);
        out.push_str(SPAN_CLOSE);
        cursor = end;
    }
    out.push_str(&markup[cursor..]);

    if dropped > 0 {
        tracing::debug!(
            dropped,
            token_count = tokens.len(),
            "render: some tokens were not decorated"
        );
    }
    out
}

/// Removes exactly the spans added by [`render_tagged`], restoring the source markup.
///
/// A decoration always wraps a non-empty stretch of plain text, so an opening
/// tag whose content reaches another tag before `</span>` belongs to the
/// source markup and is kept.
pub fn strip_decorations(rendered: &str, classes: &DecorationClasses) -> String {
    let openings = classes.openings();
    let mut out = String::with_capacity(rendered.len());
    let mut rest = rendered;

    loop {
        let next = openings
            .iter()
            .filter_map(|open| rest.find(open.as_str()).map(|pos| (pos, open.len())))
            .min_by_key(|&(pos, _)| pos);
        let Some((pos, open_len)) = next else {
            break;
        };
        let inner_start = pos + open_len;
        let Some(close) = rest[inner_start..].find(SPAN_CLOSE) else {
            break;
        };

        let inner = &rest[inner_start..inner_start + close];
        if inner.is_empty() || inner.contains('<') {
            out.push_str(&rest[..inner_start]);
            rest = &rest[inner_start..];
            continue;
        }

        out.push_str(&rest[..pos]);
        out.push_str(inner);
        rest = &rest[inner_start + close + SPAN_CLOSE.len()..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(words: &[(&str, TokenState)]) -> Vec<Token> {
        words
            .iter()
            .map(|(w, state)| {
                let mut token = Token::new(*w);
                token.state = *state;
                token
            })
            .collect()
    }

    #[test]
    fn wraps_each_token_with_its_state_class() {
        let tokens = tagged(&[
            ("私は", TokenState::Read),
            ("学生", TokenState::Skipped),
            ("です", TokenState::Pending),
        ]);
        let out = render_tagged("私は 学生 です", &tokens, &DecorationClasses::default());
        assert_eq!(
            out,
            "<span class=\"karaoke-highlight\">私は</span> \
             <span class=\"karaoke-skipped\">学生</span> \
             <span class=\"karaoke-pending\">です</span>"
        );
    }

    #[test]
    fn preserves_ruby_markup_around_tokens() {
        let markup = "<ruby>学生<rt>がくせい</rt></ruby> です";
        let tokens = tagged(&[("学生", TokenState::Read), ("です", TokenState::Pending)]);
        let out = render_tagged(markup, &tokens, &DecorationClasses::default());
        assert_eq!(
            out,
            "<ruby><span class=\"karaoke-highlight\">学生</span><rt>がくせい</rt></ruby> \
             <span class=\"karaoke-pending\">です</span>"
        );
    }

    #[test]
    fn repeated_words_are_decorated_in_order() {
        let tokens = tagged(&[
            ("はい", TokenState::Read),
            ("はい", TokenState::Pending),
        ]);
        let out = render_tagged("はい はい", &tokens, &DecorationClasses::default());
        assert_eq!(
            out,
            "<span class=\"karaoke-highlight\">はい</span> <span class=\"karaoke-pending\">はい</span>"
        );
    }

    #[test]
    fn missing_token_is_dropped_without_moving_cursor() {
        let tokens = tagged(&[
            ("犬", TokenState::Read),
            ("猫", TokenState::Skipped),
            ("鳥", TokenState::Read),
        ]);
        let out = render_tagged("犬 鳥", &tokens, &DecorationClasses::default());
        assert_eq!(
            out,
            "<span class=\"karaoke-highlight\">犬</span> <span class=\"karaoke-highlight\">鳥</span>"
        );
    }

    #[test]
    fn attribute_only_occurrence_is_not_decorated() {
        let markup = r#"<img alt="学生">"#;
        let tokens = tagged(&[("学生", TokenState::Read)]);
        assert_eq!(
            render_tagged(markup, &tokens, &DecorationClasses::default()),
            markup
        );
    }

    #[test]
    fn empty_or_malformed_markup_passes_through() {
        let tokens = tagged(&[("本", TokenState::Read)]);
        let classes = DecorationClasses::default();
        assert_eq!(render_tagged("", &tokens, &classes), "");
        assert_eq!(render_tagged("<b 本", &tokens, &classes), "<b 本");
    }

    #[test]
    fn custom_classes_are_used() {
        let classes = DecorationClasses {
            read: "r".to_string(),
            pending: "p".to_string(),
            skipped: "s".to_string(),
        };
        let tokens = tagged(&[("A", TokenState::Skipped)]);
        assert_eq!(
            render_tagged("A", &tokens, &classes),
            "<span class=\"s\">A</span>"
        );
    }

    #[test]
    fn strip_restores_original_markup() {
        let markup = "<p><ruby>私<rt>わたし</rt></ruby>は <span class=\"note\">学生</span> です。</p>";
        let tokens = tagged(&[
            ("私", TokenState::Read),
            ("学生", TokenState::Skipped),
            ("です。", TokenState::Pending),
        ]);
        let classes = DecorationClasses::default();
        let out = render_tagged(markup, &tokens, &classes);
        assert_ne!(out, markup);
        assert_eq!(strip_decorations(&out, &classes), markup);
    }

    #[test]
    fn strip_without_decorations_is_identity() {
        let markup = "<span class=\"note\">本</span>";
        assert_eq!(
            strip_decorations(markup, &DecorationClasses::default()),
            markup
        );
    }

    #[test]
    fn strip_keeps_source_spans_sharing_a_state_class() {
        let markup = "<span class=\"karaoke-pending\">本</span> を <span class=\"karaoke-skipped\"></span>読む";
        let tokens = tagged(&[
            ("本", TokenState::Read),
            ("を", TokenState::Skipped),
            ("読む", TokenState::Pending),
        ]);
        let classes = DecorationClasses::default();
        let out = render_tagged(markup, &tokens, &classes);
        assert_eq!(
            out,
            "<span class=\"karaoke-pending\"><span class=\"karaoke-highlight\">本</span></span> \
             <span class=\"karaoke-skipped\">を</span> \
             <span class=\"karaoke-skipped\"></span><span class=\"karaoke-pending\">読む</span>"
        );
        assert_eq!(strip_decorations(&out, &classes), markup);
    }
}
