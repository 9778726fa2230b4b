//! External TTS collaborator invoked through a shell command template.

use dubops_core::audio::Clip;
use dubops_core::error::{Error, SynthesisError};
use dubops_core::synth::Synthesizer;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Renders text through a user-supplied command template.
///
/// The template must contain `{text}` and `{output}` placeholders; each
/// request substitutes the cache path for its index and a quoted
/// environment-variable reference for the segment text, so quotes and
/// apostrophes in translated text never reach the shell as syntax. A
/// clip already present in the cache directory is reused without
/// invoking the command, so an interrupted run resumes where it
/// stopped. Renders at a foreign sample rate are resampled to
/// `sample_rate` in place, so cached clips are always at master rate.
#[derive(Debug)]
pub struct CommandSynthesizer {
    template: String,
    cache_dir: PathBuf,
    sample_rate: u32,
}

impl CommandSynthesizer {
    pub fn new(template: String, cache_dir: PathBuf, sample_rate: u32) -> Self {
        Self {
            template,
            cache_dir,
            sample_rate,
        }
    }

    /// Cache path for the clip of one segment.
    pub fn clip_path(&self, index: usize) -> PathBuf {
        self.cache_dir.join(format!("segment_{index:04}.wav"))
    }

    async fn render(&self, index: usize, text: &str, path: &Path) -> Result<(), SynthesisError> {
        // The text goes through the environment, not the command line;
        // substituting it verbatim would let a quote in the translation
        // break the shell syntax
        let command_line = self
            .template
            .replace("{output}", &path.to_string_lossy())
            .replace("{text}", "\"$TEXT\"");

        tracing::debug!(index, command = %command_line, "synthesizing segment");

        let output = Command::new("sh")
            .arg("-c")
            .arg(&command_line)
            .env("TEXT", text)
            .output()
            .await
            .map_err(|e| SynthesisError::Backend(Box::new(e)))?;

        if !output.status.success() {
            // Drop any partial render so a retry regenerates it
            std::fs::remove_file(path).ok();

            return Err(SynthesisError::Backend(
                format!(
                    "tts command exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                )
                .into(),
            ));
        }

        Ok(())
    }
}

impl Synthesizer for CommandSynthesizer {
    async fn synthesize(&self, index: usize, text: &str) -> Result<Clip, SynthesisError> {
        let path = self.clip_path(index);

        if path.exists() {
            tracing::debug!(index, path = %path.display(), "reusing cached clip");
        } else {
            self.render(index, text, &path).await?;
        }

        let clip = read_clip(&path)?;

        if clip.sample_rate == self.sample_rate {
            return Ok(clip);
        }

        tracing::debug!(
            index,
            rendered_rate = clip.sample_rate,
            master_rate = self.sample_rate,
            "resampling rendered clip"
        );

        let resampled = path.with_extension("resampled.wav");
        crate::ffmpeg::decode_to_wav(&path, &resampled, self.sample_rate)
            .map_err(|e| SynthesisError::Backend(e.into()))?;
        std::fs::rename(&resampled, &path).map_err(|e| SynthesisError::Backend(Box::new(e)))?;

        read_clip(&path)
    }
}

fn read_clip(path: &Path) -> Result<Clip, SynthesisError> {
    Clip::from_wav_file(path).map_err(|e| match e {
        Error::Audio(audio) => SynthesisError::UnreadableClip(Box::new(audio)),
        other => SynthesisError::Backend(Box::new(other)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    const RATE: u32 = 24000;

    fn write_fixture_wav(path: &Path, sample_rate: u32, samples: usize) {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, spec).unwrap();
        for _ in 0..samples {
            writer.write_sample(1000i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[tokio::test]
    async fn runs_command_and_reads_rendered_clip() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("fixture.wav");
        write_fixture_wav(&fixture, RATE, 2400);

        let template = format!("cp {} {{output}}", fixture.display());
        let synth = CommandSynthesizer::new(template, dir.path().to_path_buf(), RATE);

        let clip = synth.synthesize(0, "hello").await.unwrap();

        assert_eq!(clip.sample_rate, RATE);
        assert_eq!(clip.samples.len(), 2400);
        assert!(synth.clip_path(0).exists());
    }

    #[tokio::test]
    async fn reuses_cached_clip_without_invoking_command() {
        let dir = tempfile::tempdir().unwrap();
        let synth = CommandSynthesizer::new("false".into(), dir.path().to_path_buf(), RATE);
        write_fixture_wav(&synth.clip_path(3), RATE, 240);

        // The command would fail; the cached clip must short-circuit it
        let clip = synth.synthesize(3, "ignored").await.unwrap();

        assert_eq!(clip.samples.len(), 240);
    }

    #[tokio::test]
    async fn quoted_text_does_not_break_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("fixture.wav");
        write_fixture_wav(&fixture, RATE, 2400);

        let said = dir.path().join("said.txt");
        let template = format!(
            "printf '%s' {{text}} > {} && cp {} {{output}}",
            said.display(),
            fixture.display()
        );
        let synth = CommandSynthesizer::new(template, dir.path().to_path_buf(), RATE);

        let text = r#"it's "fine", isn't it?"#;
        let clip = synth.synthesize(0, text).await.unwrap();

        assert_eq!(clip.samples.len(), 2400);
        // The command saw the text byte-for-byte, quotes included
        assert_eq!(std::fs::read_to_string(&said).unwrap(), text);
    }

    #[tokio::test]
    async fn failed_command_reports_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let synth = CommandSynthesizer::new("exit 7".into(), dir.path().to_path_buf(), RATE);

        let result = synth.synthesize(1, "hello").await;

        assert!(matches!(result, Err(SynthesisError::Backend(_))));
    }

    #[tokio::test]
    async fn unreadable_output_reports_unreadable_clip() {
        let dir = tempfile::tempdir().unwrap();
        let template = "echo not-a-wav > {output}".to_string();
        let synth = CommandSynthesizer::new(template, dir.path().to_path_buf(), RATE);

        let result = synth.synthesize(2, "hello").await;

        assert!(matches!(result, Err(SynthesisError::UnreadableClip(_))));
    }

    #[tokio::test]
    #[ignore = "ffmpeg binary required"]
    async fn foreign_rate_render_is_resampled_to_master() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("fixture.wav");
        write_fixture_wav(&fixture, 22_050, 22_050);

        let template = format!("cp {} {{output}}", fixture.display());
        let synth = CommandSynthesizer::new(template, dir.path().to_path_buf(), RATE);

        let clip = synth.synthesize(0, "hello").await.unwrap();

        assert_eq!(clip.sample_rate, RATE);
        assert!((clip.duration_secs() - 1.0).abs() < 0.05);

        // The cache now holds the resampled clip
        let cached = Clip::from_wav_file(synth.clip_path(0)).unwrap();
        assert_eq!(cached.sample_rate, RATE);
    }
}
