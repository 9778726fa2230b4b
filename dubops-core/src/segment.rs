//! Regroups recognizer word output into naturally-bounded dubbing segments

use crate::types::{Segment, Word};

/// Default maximum segment span in seconds
const DEFAULT_MAX_DURATION: f32 = 6.0;

/// Default silence gap that forces a segment break, in seconds
const DEFAULT_SILENCE_GAP: f32 = 0.75;

/// Word regrouping configuration.
///
/// Accumulates time-ordered words into a pending segment and closes it at
/// sentence ends, long spans, and silence gaps. `regroup` is pure and
/// deterministic: the same words always yield the same segments.
#[derive(clap::Args, Clone, Copy, Debug)]
pub struct Segmenter {
    /// Maximum segment span in seconds before a forced close
    #[arg(long, default_value_t = DEFAULT_MAX_DURATION)]
    pub max_duration: f32,

    /// Silence gap in seconds that closes the pending segment
    #[arg(long, default_value_t = DEFAULT_SILENCE_GAP)]
    pub silence_gap: f32,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            max_duration: DEFAULT_MAX_DURATION,
            silence_gap: DEFAULT_SILENCE_GAP,
        }
    }
}

impl Segmenter {
    /// Regroup recognized words into segments.
    ///
    /// Bracketed non-speech annotations (e.g. "[laughter]") are dropped
    /// entirely. Emitted segments have `start < end`, non-empty trimmed
    /// text, and timestamps rounded to millisecond precision. Gaps
    /// between segments represent silence.
    pub fn regroup(&self, words: &[Word]) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut pending = PendingSegment::default();

        for (i, word) in words.iter().enumerate() {
            let trimmed = word.text.trim();

            if is_annotation(trimmed) {
                continue;
            }

            pending.push(trimmed, word.start, word.end);

            let sentence_end = trimmed.ends_with(['.', '?', '!']);
            let over_max = pending.span() > self.max_duration;
            // Discarded annotations must not mask the silence around
            // them, so the gap is measured to the next spoken word
            let silence_ahead = words[i + 1..]
                .iter()
                .find(|next| !is_annotation(next.text.trim()))
                .is_some_and(|next| next.start - word.end > self.silence_gap);

            if sentence_end || over_max || silence_ahead {
                pending.close_into(&mut segments);
            }
        }

        // Last accumulated word closes whatever is still pending
        pending.close_into(&mut segments);

        segments
    }
}

/// Accumulation buffer for the segment under construction.
#[derive(Default)]
struct PendingSegment {
    pieces: Vec<String>,
    start: f32,
    end: f32,
}

impl PendingSegment {
    fn push(&mut self, text: &str, start: f32, end: f32) {
        if self.pieces.is_empty() {
            self.start = start;
        }
        self.end = end;
        // Whitespace-only words still carry timing; the close step
        // drops segments whose text stays empty
        self.pieces.push(text.to_string());
    }

    fn span(&self) -> f32 {
        self.end - self.start
    }

    /// Close the buffer, emitting a segment unless the text is empty.
    /// Resets the buffer either way.
    fn close_into(&mut self, segments: &mut Vec<Segment>) {
        if self.pieces.is_empty() {
            return;
        }

        let text = self
            .pieces
            .iter()
            .filter(|p| !p.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");

        let start = round_ms(self.start);
        let end = round_ms(self.end);

        if !text.is_empty() && start < end {
            segments.push(Segment::new(text, start, end));
        } else if !text.is_empty() {
            tracing::warn!(text, start, end, "dropping zero-width segment");
        }

        self.pieces.clear();
    }
}

/// Whether a trimmed word is a non-speech annotation like "[laughter]".
fn is_annotation(text: &str) -> bool {
    text.len() >= 2
        && ((text.starts_with('[') && text.ends_with(']'))
            || (text.starts_with('(') && text.ends_with(')')))
}

/// Round seconds to millisecond precision.
fn round_ms(secs: f32) -> f32 {
    (secs * 1000.0).round() / 1000.0
}
