use proptest::prelude::*;

use wordlight_caption_core::segment::{segment_words, SegmentationConfig};
use wordlight_caption_core::timing::{highlight_line, segment_events};
use wordlight_caption_core::track::{build_events, CaptionConfig};
use wordlight_caption_model::event::EventKind;
use wordlight_caption_model::word::Word;

const TOKENS: &[&str] = &["so", "we", "ship", "it.", "why?", "now!", "what?!", "v1.2"];

/// Monotonic word sequences: each word starts after a random pause and
/// lasts a random duration.
fn words_strategy() -> impl Strategy<Value = Vec<Word>> {
    prop::collection::vec(
        (0.0f64..3.0, 0.01f64..1.0, 0usize..TOKENS.len()),
        0..60,
    )
    .prop_map(|parts| {
        let mut cursor = 0.0;
        parts
            .into_iter()
            .map(|(gap, duration, token)| {
                let start = cursor + gap;
                let end = start + duration;
                cursor = end;
                Word::new(start, end, TOKENS[token])
            })
            .collect()
    })
}

fn config_strategy() -> impl Strategy<Value = SegmentationConfig> {
    (1usize..4, 1usize..8, 0.1f64..2.5).prop_map(|(max_sentences, max_words, max_gap_secs)| {
        SegmentationConfig {
            max_sentences,
            max_words,
            max_gap_secs,
        }
    })
}

proptest! {
    #[test]
    fn segments_partition_the_input(words in words_strategy(), config in config_strategy()) {
        let segments = segment_words(&words, &config);

        let rejoined: Vec<Word> = segments
            .iter()
            .flat_map(|s| s.words().iter().cloned())
            .collect();
        prop_assert_eq!(rejoined, words.clone());
        prop_assert!(segments.iter().all(|s| !s.is_empty()));
        prop_assert_eq!(segments.is_empty(), words.is_empty());
    }

    #[test]
    fn segmentation_is_deterministic(words in words_strategy(), config in config_strategy()) {
        let first = segment_words(&words, &config);
        let second = segment_words(&words, &config);
        prop_assert_eq!(first, second);

        let caption_config = CaptionConfig { segmentation: config, ..Default::default() };
        prop_assert_eq!(
            build_events(&words, &caption_config),
            build_events(&words, &caption_config)
        );
    }

    #[test]
    fn segments_respect_limits(words in words_strategy(), config in config_strategy()) {
        for segment in segment_words(&words, &config) {
            let members = segment.words();
            prop_assert_eq!(segment.start(), members[0].start);
            prop_assert_eq!(segment.end(), members[members.len() - 1].end);
            prop_assert!(segment.len() <= config.max_words);

            let sentences = members.iter().filter(|w| w.ends_sentence()).count();
            prop_assert!(sentences <= config.max_sentences);

            for pair in members.windows(2) {
                prop_assert!(pair[1].start - pair[0].end <= config.max_gap_secs);
            }
        }
    }

    #[test]
    fn each_word_is_highlighted_exactly_once(words in words_strategy(), config in config_strategy()) {
        for segment in segment_words(&words, &config) {
            let events = segment_events(&segment, 0.02);
            let highlights: Vec<_> = events
                .iter()
                .filter(|e| e.kind == EventKind::Highlight)
                .collect();
            prop_assert_eq!(highlights.len(), segment.len());

            for (index, event) in highlights.iter().enumerate() {
                prop_assert_eq!(event.text.matches("{\\rHighlight}").count(), 1);
                prop_assert_eq!(&event.text, &highlight_line(segment.words(), index));
                prop_assert_eq!(event.start, segment.words()[index].start);
                prop_assert_eq!(event.end, segment.words()[index].end);
            }

            for event in events.iter().filter(|e| e.kind == EventKind::Silence) {
                prop_assert!(!event.text.contains('{'), "silence text carries an override tag");
                prop_assert!(event.end - event.start > 0.02);
                prop_assert!(event.start >= segment.start() && event.end <= segment.end());
                for word in segment.words() {
                    prop_assert!(event.end <= word.start || event.start >= word.end);
                }
            }

            prop_assert!(events.windows(2).all(|pair| pair[0].start <= pair[1].start));
        }
    }
}
