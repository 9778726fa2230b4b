//! dubops-core: Isochronic dubbing core with trait-based collaborators.
//!
//! This crate regroups word-level recognition timestamps into segments,
//! orchestrates concurrent speech synthesis for the translated text, and
//! assembles the rendered clips into a dubbed audio track that stays
//! aligned with the original speech.
//!
//! # Architecture
//!
//! External services plug in through two traits:
//!
//! - [`synth::Synthesizer`]: Renders translated text to an audio clip
//! - [`timeline::TempoCorrector`]: Pitch-preserving tempo adjustment
//!
//! # Quick Start
//!
//! ```ignore
//! use dubops_core::audio::SAMPLE_RATE;
//! use dubops_core::segment::Segmenter;
//! use dubops_core::synth::{SynthConfig, SynthPool};
//! use dubops_core::timeline::{AlignConfig, TrackAssembler};
//!
//! // Regroup recognized words into segments
//! let segments = Segmenter::default().regroup(&words);
//!
//! // Synthesize translated segments concurrently
//! let pool = SynthPool::new(synthesizer, SynthConfig::default(), SAMPLE_RATE)?;
//! let clips = pool.synthesize_all(&segments).await;
//!
//! // Assemble the dubbed track
//! let assembler = TrackAssembler::new(AlignConfig::default(), corrector)?;
//! let track = assembler.assemble(&segments, clips, total_duration);
//! track.to_wav_file("dubbed.wav")?;
//! ```

pub mod audio;
pub mod error;
pub mod retry;
pub mod segment;
pub mod synth;
pub mod timeline;
pub mod types;
