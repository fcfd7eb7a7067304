//! Silence and highlight event derivation for a segment.

use wordlight_caption_model::event::{CaptionEvent, CaptionStyle, EventKind};
use wordlight_caption_model::word::Word;

use crate::segment::Segment;

/// Layer used for full-line events shown between spoken words.
pub const SILENCE_LAYER: u32 = 0;
/// Layer used for per-word highlight events.
pub const HIGHLIGHT_LAYER: u32 = 1;

/// Inline override switching to the `Highlight` style.
const HIGHLIGHT_OPEN: &str = "{\\rHighlight}";
/// Inline override restoring the line's own style.
const HIGHLIGHT_CLOSE: &str = "{\\r}";

/// Spans inside a segment where no word is being spoken.
///
/// Only the gaps between consecutive words can be non-empty: the segment
/// starts at its first word and ends at its last word's end. The trailing
/// check still runs so overlapping word timings never produce a span past
/// the end.
pub fn silence_spans(segment: &Segment<'_>) -> Vec<(f64, f64)> {
    let mut spans = Vec::new();
    let mut prev_end = segment.start();

    for word in segment.words() {
        if prev_end < word.start {
            spans.push((prev_end, word.start));
        }
        prev_end = word.end;
    }

    if prev_end < segment.end() {
        spans.push((prev_end, segment.end()));
    }

    spans
}

/// Make word text safe to embed in a dialogue line.
///
/// Braces would open override blocks and newlines would split the line.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '{' => '(',
            '}' => ')',
            '\n' | '\r' => ' ',
            other => other,
        })
        .collect()
}

/// All words joined by spaces with no markup.
pub fn plain_line(words: &[Word]) -> String {
    words
        .iter()
        .map(|w| sanitize_text(&w.text))
        .collect::<Vec<_>>()
        .join(" ")
}

/// All words joined by spaces with exactly word `index` wrapped in
/// highlight markup.
pub fn highlight_line(words: &[Word], index: usize) -> String {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let text = sanitize_text(&w.text);
            if i == index {
                format!("{HIGHLIGHT_OPEN}{text}{HIGHLIGHT_CLOSE}")
            } else {
                text
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Events for one segment, sorted by start time.
///
/// Silence spans no longer than `min_silence_secs` are dropped.
pub fn segment_events(segment: &Segment<'_>, min_silence_secs: f64) -> Vec<CaptionEvent> {
    let words = segment.words();
    let line = plain_line(words);
    let mut events = Vec::with_capacity(words.len() + 1);

    for (start, end) in silence_spans(segment) {
        if end - start > min_silence_secs {
            events.push(CaptionEvent {
                layer: SILENCE_LAYER,
                start,
                end,
                style: CaptionStyle::Default,
                kind: EventKind::Silence,
                text: line.clone(),
            });
        } else {
            tracing::trace!(start, end, "Skipping sub-threshold silence span");
        }
    }

    for (index, word) in words.iter().enumerate() {
        events.push(CaptionEvent {
            layer: HIGHLIGHT_LAYER,
            start: word.start,
            end: word.end,
            style: CaptionStyle::Default,
            kind: EventKind::Highlight,
            text: highlight_line(words, index),
        });
    }

    // Stable, so ties keep silence ahead of highlights.
    events.sort_by(|a, b| a.start.total_cmp(&b.start));
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{segment_words, SegmentationConfig};

    fn one_segment(words: &[Word]) -> Segment<'_> {
        let config = SegmentationConfig {
            max_sentences: 100,
            max_words: 100,
            max_gap_secs: 100.0,
        };
        let mut segments = segment_words(words, &config);
        assert_eq!(segments.len(), 1);
        segments.remove(0)
    }

    #[test]
    fn test_gap_between_words_is_silence() {
        let words = vec![Word::new(0.0, 1.0, "A"), Word::new(2.0, 3.0, "B")];
        let segment = one_segment(&words);

        assert_eq!(silence_spans(&segment), vec![(1.0, 2.0)]);

        let events = segment_events(&segment, 0.02);
        assert_eq!(events.len(), 3);

        let silences: Vec<_> = events
            .iter()
            .filter(|e| e.kind == EventKind::Silence)
            .collect();
        assert_eq!(silences.len(), 1);
        assert_eq!((silences[0].start, silences[0].end), (1.0, 2.0));
        assert_eq!(silences[0].text, "A B");
        assert_eq!(silences[0].layer, SILENCE_LAYER);

        let starts: Vec<f64> = events.iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_contiguous_words_have_no_silence() {
        let words = vec![Word::new(0.0, 1.0, "A"), Word::new(1.0, 2.0, "B")];
        let segment = one_segment(&words);
        assert!(silence_spans(&segment).is_empty());
        assert!(segment_events(&segment, 0.02)
            .iter()
            .all(|e| e.kind == EventKind::Highlight));
    }

    #[test]
    fn test_short_span_is_dropped() {
        let words = vec![Word::new(0.0, 1.0, "A"), Word::new(1.01, 2.0, "B")];
        let segment = one_segment(&words);
        assert_eq!(silence_spans(&segment).len(), 1);
        assert_eq!(segment_events(&segment, 0.02).len(), 2);
    }

    #[test]
    fn test_span_equal_to_threshold_is_dropped() {
        let words = vec![Word::new(0.0, 1.0, "A"), Word::new(1.5, 2.0, "B")];
        let segment = one_segment(&words);
        assert_eq!(segment_events(&segment, 0.5).len(), 2);
    }

    #[test]
    fn test_overlapping_words_produce_no_span() {
        let words = vec![Word::new(0.0, 2.0, "A"), Word::new(1.0, 1.5, "B")];
        let segment = one_segment(&words);
        assert!(silence_spans(&segment).is_empty());
    }

    #[test]
    fn test_highlight_marks_exactly_one_word() {
        let words = vec![
            Word::new(0.0, 0.5, "one"),
            Word::new(0.5, 1.0, "two"),
            Word::new(1.0, 1.5, "three"),
        ];
        assert_eq!(
            highlight_line(&words, 1),
            "one {\\rHighlight}two{\\r} three"
        );
        assert_eq!(
            highlight_line(&words, 0),
            "{\\rHighlight}one{\\r} two three"
        );
    }

    #[test]
    fn test_highlight_events_follow_word_times() {
        let words = vec![Word::new(0.25, 0.5, "hi"), Word::new(0.75, 1.0, "you")];
        let segment = one_segment(&words);
        let highlights: Vec<_> = segment_events(&segment, 0.02)
            .into_iter()
            .filter(|e| e.kind == EventKind::Highlight)
            .collect();
        assert_eq!(highlights.len(), 2);
        assert_eq!((highlights[1].start, highlights[1].end), (0.75, 1.0));
        assert_eq!(highlights[1].layer, HIGHLIGHT_LAYER);
        assert_eq!(highlights[1].style, CaptionStyle::Default);
    }

    #[test]
    fn test_sanitize_replaces_override_characters() {
        assert_eq!(sanitize_text("{bad}\nline"), "(bad) line");
        let words = vec![Word::new(0.0, 1.0, "{x}")];
        assert_eq!(highlight_line(&words, 0), "{\\rHighlight}(x){\\r}");
    }
}
