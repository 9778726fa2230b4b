//! Core transcript types for dubops-core

use serde::{Deserialize, Serialize};

/// Recognized word with timestamps.
///
/// Produced by the external speech recognizer. Times are in seconds,
/// `end >= start`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Word {
    /// Recognized text
    pub text: String,
    /// Start time in seconds
    pub start: f32,
    /// End time in seconds
    pub end: f32,
}

impl Word {
    /// Create a new word.
    pub fn new(text: impl Into<String>, start: f32, end: f32) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// Text segment with a fixed target time slot on the output timeline.
///
/// Emitted by the segmentation engine, carried through translation with
/// `start`/`end` unchanged, and consumed by track assembly.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Segment {
    /// Segment text
    pub text: String,
    /// Start time in seconds
    pub start: f32,
    /// End time in seconds
    pub end: f32,
}

impl Segment {
    /// Create a new segment.
    pub fn new(text: impl Into<String>, start: f32, end: f32) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Width of the target slot in seconds.
    pub fn slot(&self) -> f32 {
        self.end - self.start
    }
}
