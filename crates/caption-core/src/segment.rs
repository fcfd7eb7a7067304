//! Word segmentation: grouping words into caption blocks.
//!
//! # Algorithm
//!
//! A single forward pass accumulates words into an open segment. After each
//! word is appended the segment closes when any of these holds:
//!
//! 1. the sentence count reached `max_sentences`
//! 2. the word count reached `max_words`
//! 3. the pause before the next word is longer than `max_gap_secs`
//! 4. the word is the last one
//!
//! The result is a partition of the input: every word lands in exactly one
//! segment and segment order follows word order.

use serde::{Deserialize, Serialize};
use wordlight_caption_model::word::Word;
use wordlight_common::error::{WordlightError, WordlightResult};

/// Limits controlling where segments close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Sentence-ending words allowed per segment.
    pub max_sentences: usize,

    /// Words allowed per segment.
    pub max_words: usize,

    /// Longest pause (seconds) that may fall inside one segment.
    pub max_gap_secs: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_sentences: 1,
            max_words: 5,
            max_gap_secs: 1.5,
        }
    }
}

impl SegmentationConfig {
    pub fn validate(&self) -> WordlightResult<()> {
        if self.max_sentences == 0 {
            return Err(WordlightError::config("max_sentences must be at least 1"));
        }
        if self.max_words == 0 {
            return Err(WordlightError::config("max_words must be at least 1"));
        }
        if !(self.max_gap_secs.is_finite() && self.max_gap_secs > 0.0) {
            return Err(WordlightError::config(format!(
                "max_gap_secs must be positive, got {}",
                self.max_gap_secs
            )));
        }
        Ok(())
    }
}

/// A contiguous, non-empty run of words displayed as one caption block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<'a> {
    words: &'a [Word],
}

impl<'a> Segment<'a> {
    /// Words of this segment, in order. Never empty.
    pub fn words(&self) -> &'a [Word] {
        self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Start of the first word.
    pub fn start(&self) -> f64 {
        self.words[0].start
    }

    /// End of the last word.
    pub fn end(&self) -> f64 {
        self.words[self.words.len() - 1].end
    }

    /// Word texts joined by single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Partition `words` into segments.
pub fn segment_words<'a>(words: &'a [Word], config: &SegmentationConfig) -> Vec<Segment<'a>> {
    let max_sentences = config.max_sentences.max(1);
    let max_words = config.max_words.max(1);

    let mut segments = Vec::new();
    let mut open_start = 0usize;
    let mut sentence_count = 0usize;
    let mut word_count = 0usize;

    for (index, word) in words.iter().enumerate() {
        word_count += 1;
        if word.ends_sentence() {
            sentence_count += 1;
        }

        let next = words.get(index + 1);
        let gap_exceeded = next
            .map(|next| next.start - word.end > config.max_gap_secs)
            .unwrap_or(false);

        let close = sentence_count >= max_sentences
            || word_count >= max_words
            || gap_exceeded
            || next.is_none();

        if close {
            segments.push(Segment {
                words: &words[open_start..=index],
            });
            open_start = index + 1;
            sentence_count = 0;
            word_count = 0;
        }
    }

    tracing::debug!(
        words = words.len(),
        segments = segments.len(),
        "Segmented words"
    );

    segments
}
