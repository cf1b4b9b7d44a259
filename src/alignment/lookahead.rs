use crate::types::{Token, TokenState};

/// Scan position of one alignment pass. Both indices only move forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentCursor {
    pub reference_index: usize,
    pub transcript_index: usize,
}

impl AlignmentCursor {
    fn in_range(&self, reference_len: usize, transcript_len: usize) -> bool {
        self.reference_index < reference_len && self.transcript_index < transcript_len
    }
}

/// Tags every reference token against the recognized words read so far.
///
/// On a mismatch, the next `window - 1` reference tokens are tried against
/// the current recognized word. A hit marks everything jumped over as
/// skipped; a miss skips only the current reference token and retries the
/// same recognized word against the next one. Tokens never reached stay
/// pending, and recognized words past the end of the reference are ignored.
pub fn align_with_lookahead<F>(
    reference: &[Token],
    recognized: &[&str],
    window: usize,
    matches: F,
) -> Vec<TokenState>
where
    F: Fn(&str, &str) -> bool,
{
    let mut states = vec![TokenState::Pending; reference.len()];
    let mut cursor = AlignmentCursor::default();

    while cursor.in_range(reference.len(), recognized.len()) {
        let heard = recognized[cursor.transcript_index];
        let expected = reference[cursor.reference_index].text.as_str();

        if matches(expected, heard) {
            states[cursor.reference_index] = TokenState::Read;
            cursor.reference_index += 1;
            cursor.transcript_index += 1;
            continue;
        }

        let hit = (1..window)
            .take_while(|offset| cursor.reference_index + offset < reference.len())
            .find(|offset| matches(reference[cursor.reference_index + offset].text.as_str(), heard));

        match hit {
            Some(offset) => {
                tracing::debug!(
                    reference_index = cursor.reference_index,
                    transcript_index = cursor.transcript_index,
                    offset,
                    heard,
                    "alignment: lookahead hit, skipping reference words"
                );
                for state in &mut states[cursor.reference_index..cursor.reference_index + offset] {
                    *state = TokenState::Skipped;
                }
                states[cursor.reference_index + offset] = TokenState::Read;
                cursor.reference_index += offset + 1;
                cursor.transcript_index += 1;
            }
            None => {
                tracing::debug!(
                    reference_index = cursor.reference_index,
                    transcript_index = cursor.transcript_index,
                    expected,
                    heard,
                    "alignment: no match within window, skipping reference word"
                );
                states[cursor.reference_index] = TokenState::Skipped;
                cursor.reference_index += 1;
            }
        }
    }

    states
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::similarity::words_match;

    fn tokens(words: &[&str]) -> Vec<Token> {
        words.iter().map(|w| Token::new(*w)).collect()
    }

    fn align(reference: &[&str], recognized: &[&str]) -> Vec<TokenState> {
        align_with_lookahead(&tokens(reference), recognized, 3, |a, b| {
            words_match(a, b, 0.8, 1)
        })
    }

    use TokenState::{Pending, Read, Skipped};

    #[test]
    fn exact_reading_marks_everything_read() {
        let words = ["私は", "学生", "です。"];
        assert_eq!(align(&words, &words), [Read, Read, Read]);
    }

    #[test]
    fn dropped_word_is_skipped_via_lookahead() {
        assert_eq!(
            align(&["私", "は", "学生", "です"], &["私", "学生", "です"]),
            [Read, Skipped, Read, Read]
        );
    }

    #[test]
    fn exhausted_window_skips_one_and_retries() {
        assert_eq!(
            align(&["A", "B", "C", "D"], &["D"]),
            [Skipped, Skipped, Skipped, Read]
        );
    }

    #[test]
    fn prefix_leaves_tail_pending() {
        assert_eq!(
            align(&["今日", "は", "晴れ", "です"], &["今日", "は"]),
            [Read, Read, Pending, Pending]
        );
    }

    #[test]
    fn unmatched_word_consumes_rest_of_reference() {
        assert_eq!(align(&["A", "B", "C"], &["Z"]), [Skipped, Skipped, Skipped]);
    }

    #[test]
    fn surplus_recognized_words_are_ignored() {
        assert_eq!(align(&["A", "B"], &["A", "B", "C", "D"]), [Read, Read]);
    }

    #[test]
    fn empty_inputs() {
        assert!(align(&[], &["A"]).is_empty());
        assert_eq!(align(&["A", "B"], &[]), [Pending, Pending]);
    }

    #[test]
    fn lookahead_respects_reference_end() {
        // Only one token remains after "X"; the window is clipped without panicking.
        assert_eq!(align(&["A", "X", "Y"], &["A", "Q"]), [Read, Skipped, Skipped]);
    }

    #[test]
    fn window_of_one_disables_lookahead() {
        let states = align_with_lookahead(&tokens(&["A", "B"]), &["B"], 1, |a, b| a == b);
        assert_eq!(states, [Skipped, Read]);
    }

    #[test]
    fn wider_window_reaches_further() {
        let reference = tokens(&["A", "B", "C", "D", "E"]);
        let narrow = align_with_lookahead(&reference, &["E"], 3, |a, b| a == b);
        let wide = align_with_lookahead(&reference, &["E"], 5, |a, b| a == b);
        assert_eq!(narrow, [Skipped, Skipped, Skipped, Skipped, Read]);
        assert_eq!(wide, [Skipped, Skipped, Skipped, Skipped, Read]);

        let narrow = align_with_lookahead(&reference, &["D", "E"], 2, |a, b| a == b);
        assert_eq!(narrow, [Skipped, Skipped, Skipped, Read, Read]);
    }

    #[test]
    fn near_miss_recognition_still_reads() {
        assert_eq!(
            align(&["ありがとうね", "ございます"], &["ありがとうよ", "ございます"]),
            [Read, Read]
        );
    }
}
