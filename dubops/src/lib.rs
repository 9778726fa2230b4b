//! Dub CLI - isochronic dubbing tools for timed transcripts.

pub mod cli;
pub mod dub;
pub mod ffmpeg;
pub mod seg;
pub mod synthesis;
