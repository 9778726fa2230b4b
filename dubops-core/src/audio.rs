//! Audio buffer types and processing utilities.

use crate::error::{AudioError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Default master sample rate for synthesized speech (24kHz)
pub const SAMPLE_RATE: u32 = 24000;

/// Synthesized audio for one segment, of independent native duration.
///
/// Mono f32 samples in [-1.0, 1.0].
#[derive(Clone, Debug)]
pub struct Clip {
    /// PCM samples
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl Clip {
    /// Create a clip from raw samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a silent clip of the given duration.
    pub fn silent(duration_secs: f32, sample_rate: u32) -> Self {
        let len = secs_to_samples(duration_secs.max(0.0), sample_rate);
        Self::new(vec![0.0; len], sample_rate)
    }

    /// Load a clip from a WAV file, folding stereo to mono.
    pub fn from_wav_file(path: impl AsRef<Path>) -> Result<Self> {
        let (samples, spec) = load_wav(path)?;

        if spec.channels == 0 || spec.channels > 2 {
            return Err(AudioError::InvalidChannels(spec.channels).into());
        }

        let samples = if spec.channels == 2 {
            samples
                .chunks(2)
                .map(|chunk| chunk.iter().sum::<f32>() / 2.0)
                .collect()
        } else {
            samples
        };

        Ok(Self::new(samples, spec.sample_rate))
    }

    /// Native duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Extend with trailing silence up to `duration_secs`.
    ///
    /// A clip already at least that long is left unchanged.
    pub fn pad_to(&mut self, duration_secs: f32) {
        let target = secs_to_samples(duration_secs, self.sample_rate);
        if self.samples.len() < target {
            self.samples.resize(target, 0.0);
        }
    }

    /// Write the clip as 16-bit PCM WAV.
    pub fn to_wav_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;

        Ok(())
    }

    /// Apply a one-pole high-pass filter in place.
    ///
    /// Removes DC offset and low-frequency synthesis rumble below
    /// roughly `cutoff_hz`.
    pub fn high_pass(&mut self, cutoff_hz: f32) {
        if self.samples.is_empty() || cutoff_hz <= 0.0 {
            return;
        }

        let dt = 1.0 / self.sample_rate as f32;
        let rc = 1.0 / (2.0 * std::f32::consts::PI * cutoff_hz);
        let alpha = rc / (rc + dt);

        let mut prev_in = self.samples[0];
        let mut prev_out = self.samples[0];
        for sample in self.samples.iter_mut().skip(1) {
            let out = alpha * (prev_out + *sample - prev_in);
            prev_in = *sample;
            prev_out = out;
            *sample = out;
        }
    }

    /// Scale samples so the peak amplitude hits `target_peak`.
    ///
    /// Silent clips are left untouched.
    pub fn normalize_peak(&mut self, target_peak: f32) {
        let max_amp = self.samples.iter().fold(0.0f32, |a, &b| a.max(b.abs()));
        if max_amp <= 1e-6 {
            return;
        }

        let factor = target_peak / max_amp;
        for sample in self.samples.iter_mut() {
            *sample *= factor;
        }
    }
}

/// Full-length output audio buffer being assembled.
///
/// Created as silence of the source media duration; mutated only by the
/// track assembler, then exported read-only.
#[derive(Clone, Debug)]
pub struct Track {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Track {
    /// Create a silent track of the given total duration.
    pub fn silent(total_duration_secs: f32, sample_rate: u32) -> Self {
        Self {
            samples: vec![0.0; secs_to_samples(total_duration_secs, sample_rate)],
            sample_rate,
        }
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Length in samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the track holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Read-only view of the samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Mix a clip additively onto the track at `position_secs`.
    ///
    /// Samples running past the end of the track are dropped; the track
    /// length never changes. The sum is clamped to [-1.0, 1.0].
    pub fn overlay(&mut self, clip: &Clip, position_secs: f32) {
        let offset = secs_to_samples(position_secs.max(0.0), self.sample_rate);

        for (i, &sample) in clip.samples.iter().enumerate() {
            let Some(slot) = self.samples.get_mut(offset + i) else {
                break;
            };
            *slot = (*slot + sample).clamp(-1.0, 1.0);
        }
    }

    /// Write the track as 16-bit PCM WAV.
    pub fn to_wav_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;

        Ok(())
    }
}

/// Convert a duration in seconds to a sample count.
pub fn secs_to_samples(secs: f32, sample_rate: u32) -> usize {
    (secs * sample_rate as f32).round() as usize
}

/// Load samples and spec from a WAV file.
fn load_wav(path: impl AsRef<Path>) -> Result<(Vec<f32>, WavSpec)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<hound::Result<_>>()?,
        SampleFormat::Int => reader
            .samples::<i16>()
            .map(|s| s.map(|s| s as f32 / i16::MAX as f32))
            .collect::<hound::Result<_>>()?,
    };

    Ok((samples, spec))
}
