//! Timing alignment and track assembly.
//!
//! Fits independently-synthesized clips back onto the fixed source
//! timeline: speed-corrects clips that run long, pads clips that run
//! short, resolves overlap against the previously placed clip, and
//! overlays everything onto a silent base track.

use crate::audio::{Clip, SAMPLE_RATE, Track};
use crate::error::{AudioError, ConfigError};
use crate::types::Segment;

/// Default speed-up cap; higher factors start to sound unintelligible
const DEFAULT_MAX_SPEED_FACTOR: f32 = 1.25;

/// Default high-pass cutoff for synthesis rumble, in Hz
const DEFAULT_HIGHPASS_HZ: f32 = 80.0;

/// Default per-clip peak normalization target
const DEFAULT_TARGET_PEAK: f32 = 0.8;

const EPS: f32 = 1e-3;

/// Track assembly configuration.
#[derive(clap::Args, Clone, Copy, Debug)]
pub struct AlignConfig {
    /// Maximum tempo speed-up factor for clips that run past their slot
    #[arg(long, default_value_t = DEFAULT_MAX_SPEED_FACTOR)]
    pub max_speed_factor: f32,

    /// Master sample rate of the assembled track in Hz
    #[arg(long, default_value_t = SAMPLE_RATE)]
    pub sample_rate: u32,

    /// High-pass cutoff applied per clip before placement (0 disables)
    #[arg(long, default_value_t = DEFAULT_HIGHPASS_HZ)]
    pub highpass_hz: f32,

    /// Per-clip peak normalization target (0 disables)
    #[arg(long, default_value_t = DEFAULT_TARGET_PEAK)]
    pub target_peak: f32,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            max_speed_factor: DEFAULT_MAX_SPEED_FACTOR,
            sample_rate: SAMPLE_RATE,
            highpass_hz: DEFAULT_HIGHPASS_HZ,
            target_peak: DEFAULT_TARGET_PEAK,
        }
    }
}

impl AlignConfig {
    /// Speed-up factor for a clip of `native` seconds against a slot of
    /// `slot` seconds, capped at `max_speed_factor`. 1.0 means no
    /// correction.
    pub fn speed_factor(&self, native: f32, slot: f32) -> f32 {
        if native <= slot + EPS {
            1.0
        } else {
            (native / slot).min(self.max_speed_factor)
        }
    }
}

/// Pitch-preserving tempo correction collaborator.
///
/// Given a clip and a factor `f > 1.0`, returns audio of duration
/// approximately `native / f` at the same pitch.
pub trait TempoCorrector {
    fn stretch(&self, clip: &Clip, factor: f32) -> Result<Clip, AudioError>;
}

/// Assembles corrected clips onto a silent base track.
///
/// Owns the track exclusively during assembly; the result is handed off
/// read-only to the external mixer.
#[derive(Debug)]
pub struct TrackAssembler<C> {
    config: AlignConfig,
    corrector: C,
}

impl<C: TempoCorrector> TrackAssembler<C> {
    /// Create an assembler, validating the configuration.
    pub fn new(config: AlignConfig, corrector: C) -> Result<Self, ConfigError> {
        if config.max_speed_factor < 1.0 {
            return Err(ConfigError::InvalidSpeedFactor(config.max_speed_factor));
        }

        Ok(Self { config, corrector })
    }

    /// Assemble the output track from segments and their clips.
    ///
    /// `clips` is index-aligned with `segments`; `None` marks a clip
    /// that could not be produced or decoded, which leaves silence in
    /// that slot. The returned track is always exactly `total_duration`
    /// long, and no bad segment ever aborts the remaining ones.
    pub fn assemble(
        &self,
        segments: &[Segment],
        clips: Vec<Option<Clip>>,
        total_duration: f32,
    ) -> Track {
        let mut track = Track::silent(total_duration, self.config.sample_rate);

        // Real end of the previously placed clip; placing after it
        // guarantees clips never overlap, at the cost of bounded drift
        // when upstream clips run systematically long
        let mut cursor = 0.0f32;

        for (index, (segment, clip)) in segments.iter().zip(clips).enumerate() {
            let slot = segment.slot();

            if slot <= 0.0 {
                tracing::warn!(index, slot, "skipping segment with non-positive slot");
                continue;
            }

            let Some(clip) = clip else {
                tracing::warn!(index, "clip unavailable, leaving silence");
                continue;
            };

            if clip.sample_rate != self.config.sample_rate {
                let error = AudioError::SampleRateMismatch {
                    expected: self.config.sample_rate,
                    got: clip.sample_rate,
                };
                tracing::warn!(index, %error, "leaving silence");
                continue;
            }

            let clip = self.correct(index, clip, slot);

            let position = segment.start.max(cursor);
            if position > segment.start + EPS {
                tracing::debug!(
                    index,
                    nominal = segment.start,
                    position,
                    "placement pushed past previous clip"
                );
            }

            track.overlay(&clip, position);
            cursor = position + clip.duration_secs();
        }

        track
    }

    /// Fit a clip to its slot and apply per-clip hygiene.
    fn correct(&self, index: usize, mut clip: Clip, slot: f32) -> Clip {
        let native = clip.duration_secs();
        let factor = self.config.speed_factor(native, slot);

        if factor > 1.0 {
            tracing::debug!(index, native, slot, factor, "time-compressing clip");

            match self.corrector.stretch(&clip, factor) {
                Ok(stretched) => clip = stretched,
                // A clip at native speed is still better than a hole in
                // the dub; the placement cursor absorbs the overrun
                Err(e) => {
                    tracing::warn!(index, error = %e, "tempo correction failed, using native speed")
                }
            }
        }

        clip.pad_to(slot);

        if self.config.highpass_hz > 0.0 {
            clip.high_pass(self.config.highpass_hz);
        }
        if self.config.target_peak > 0.0 {
            clip.normalize_peak(self.config.target_peak);
        }

        clip
    }
}
