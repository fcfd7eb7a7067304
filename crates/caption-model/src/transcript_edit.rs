//! Human-editable transcript format.
//!
//! One line per word: `"start - end: text"` with times printed to two
//! decimals. After editing only the text is taken back; times always come
//! from the original words.

use std::fmt::Write as _;

use crate::word::Word;

/// Render words in the editable line format.
pub fn render_edit_lines(words: &[Word]) -> String {
    let mut output = String::new();
    for word in words {
        // Writing into a String cannot fail.
        let _ = writeln!(output, "{:.2} - {:.2}: {}", word.start, word.end, word.text);
    }
    output
}

/// Something lost while merging an edited transcript back onto the words.
#[derive(Debug, Clone, PartialEq)]
pub enum DroppedItem {
    /// An original word with no matching edited line.
    Word { index: usize, word: Word },
    /// An edited line with no matching original word.
    Line { index: usize, line: String },
}

/// Result of merging an edited transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct EditMerge {
    /// Words with edited text, truncated to the shorter of the two inputs.
    pub words: Vec<Word>,
    /// Everything the truncation discarded, in order.
    pub dropped: Vec<DroppedItem>,
}

impl EditMerge {
    pub fn is_lossless(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Merge edited lines back onto the original words.
///
/// Blank lines are ignored. For each remaining line the text after the first
/// `:` (or the whole line when it has none) replaces the word's text. When
/// the line count differs from the word count the result is truncated to the
/// shorter length and every dropped word or line is reported.
pub fn merge_edited_lines(original: &[Word], edited: &str) -> EditMerge {
    let lines: Vec<&str> = edited
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() != original.len() {
        tracing::warn!(
            original_words = original.len(),
            edited_lines = lines.len(),
            "Line count changed during transcript edit; truncating to the shorter length"
        );
    }

    let kept = original.len().min(lines.len());
    let mut words = Vec::with_capacity(kept);
    for (word, line) in original.iter().zip(lines.iter()) {
        let text = match line.split_once(':') {
            Some((_, rest)) => rest.trim(),
            None => line.trim(),
        };
        words.push(Word {
            text: text.to_string(),
            ..word.clone()
        });
    }

    let mut dropped = Vec::new();
    for (index, word) in original.iter().enumerate().skip(kept) {
        tracing::warn!(index, text = %word.text, start = word.start, "Dropping unmatched word");
        dropped.push(DroppedItem::Word {
            index,
            word: word.clone(),
        });
    }
    for (index, line) in lines.iter().enumerate().skip(kept) {
        tracing::warn!(index, line = %line, "Dropping unmatched edited line");
        dropped.push(DroppedItem::Line {
            index,
            line: line.to_string(),
        });
    }

    EditMerge { words, dropped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words() -> Vec<Word> {
        vec![
            Word::new(0.0, 0.5, "helo"),
            Word::new(0.5, 1.256, "world."),
            Word::new(2.0, 2.5, "bye"),
        ]
    }

    #[test]
    fn test_render_format() {
        let rendered = render_edit_lines(&words());
        assert_eq!(
            rendered,
            "0.00 - 0.50: helo\n0.50 - 1.26: world.\n2.00 - 2.50: bye\n"
        );
    }

    #[test]
    fn test_merge_replaces_text_and_keeps_times() {
        let edited = "0.00 - 0.50: hello\n\n0.50 - 1.26: world.\n9.99 - 9.99: goodbye\n";
        let merge = merge_edited_lines(&words(), edited);
        assert!(merge.is_lossless());
        let texts: Vec<&str> = merge.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "world.", "goodbye"]);
        assert_eq!(merge.words[2].start, 2.0);
        assert_eq!(merge.words[2].end, 2.5);
    }

    #[test]
    fn test_merge_line_without_colon_uses_whole_line() {
        let merge = merge_edited_lines(&words()[..1], "  howdy  \n");
        assert_eq!(merge.words[0].text, "howdy");
    }

    #[test]
    fn test_merge_only_splits_on_first_colon() {
        let merge = merge_edited_lines(&words()[..1], "0.00 - 0.50: ratio 3:2\n");
        assert_eq!(merge.words[0].text, "ratio 3:2");
    }

    #[test]
    fn test_fewer_lines_reports_dropped_words() {
        let merge = merge_edited_lines(&words(), "0.00 - 0.50: hello\n");
        assert_eq!(merge.words.len(), 1);
        assert_eq!(
            merge.dropped,
            vec![
                DroppedItem::Word {
                    index: 1,
                    word: Word::new(0.5, 1.256, "world.")
                },
                DroppedItem::Word {
                    index: 2,
                    word: Word::new(2.0, 2.5, "bye")
                },
            ]
        );
    }

    #[test]
    fn test_extra_lines_reports_dropped_lines() {
        let merge = merge_edited_lines(&words()[..1], "a: one\nb: two\n");
        assert_eq!(merge.words.len(), 1);
        assert_eq!(
            merge.dropped,
            vec![DroppedItem::Line {
                index: 1,
                line: "b: two".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_edit_drops_everything() {
        let merge = merge_edited_lines(&words(), "\n\n");
        assert!(merge.words.is_empty());
        assert_eq!(merge.dropped.len(), 3);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn word_list() -> impl Strategy<Value = Vec<Word>> {
            prop::collection::vec(
                (0.0f64..600.0, 0.0f64..3.0, "[A-Za-z0-9.,!?':-]{1,12}"),
                0..40,
            )
            .prop_map(|items| {
                items
                    .into_iter()
                    .map(|(start, len, text)| Word::new(start, start + len, text))
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn untouched_edit_is_lossless(words in word_list()) {
                let merge = merge_edited_lines(&words, &render_edit_lines(&words));
                prop_assert!(merge.is_lossless());
                prop_assert_eq!(merge.words, words);
            }

            #[test]
            fn merge_never_exceeds_either_input(
                words in word_list(),
                lines in prop::collection::vec("[ a-z:]{0,10}", 0..40),
            ) {
                let merge = merge_edited_lines(&words, &lines.join("\n"));
                prop_assert!(merge.words.len() <= words.len());
                prop_assert_eq!(
                    merge.words.len() + merge.dropped.len(),
                    merge.words.len().max(words.len()).max(
                        lines.iter().filter(|l| !l.trim().is_empty()).count()
                    )
                );
                for (merged, original) in merge.words.iter().zip(&words) {
                    prop_assert_eq!(merged.start, original.start);
                    prop_assert_eq!(merged.end, original.end);
                }
            }
        }
    }
}
