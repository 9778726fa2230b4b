//! Ffmpeg/ffprobe collaborator wrappers.
//!
//! Media probing, pitch-preserving tempo correction (atempo filter), and
//! the final ducking remux all shell out to the system ffmpeg tools.

use dubops_core::audio::Clip;
use dubops_core::error::AudioError;
use dubops_core::timeline::TempoCorrector;
use eyre::{Context, Result, eyre};
use std::path::Path;
use std::process::Command;

/// Probe the total media duration in seconds via ffprobe.
pub fn probe_duration(path: &Path) -> Result<f32> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .wrap_err("failed to run ffprobe")?;

    if !output.status.success() {
        return Err(eyre!(
            "ffprobe failed for {:?}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let duration = stdout
        .trim()
        .parse()
        .wrap_err_with(|| format!("unexpected ffprobe duration output: {stdout:?}"))?;

    tracing::debug!(path = %path.display(), duration, "probed media duration");

    Ok(duration)
}

/// Pitch-preserving tempo correction through the ffmpeg atempo filter.
///
/// The clip is written to a temp WAV, run through `-filter:a atempo=f`,
/// and read back at its own sample rate.
#[derive(Debug)]
pub struct AtempoCorrector;

impl TempoCorrector for AtempoCorrector {
    fn stretch(&self, clip: &Clip, factor: f32) -> std::result::Result<Clip, AudioError> {
        let fail = |reason: String| AudioError::TempoCorrection { factor, reason };

        let dir = tempfile::tempdir().map_err(|e| fail(e.to_string()))?;
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");

        clip.to_wav_file(&input).map_err(|e| fail(e.to_string()))?;

        let result = Command::new("ffmpeg")
            .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(&input)
            .args(["-filter:a", &format!("atempo={factor}")])
            .arg(&output)
            .output()
            .map_err(|e| fail(e.to_string()))?;

        if !result.status.success() {
            return Err(fail(
                String::from_utf8_lossy(&result.stderr).trim().to_string(),
            ));
        }

        Clip::from_wav_file(&output).map_err(|e| fail(e.to_string()))
    }
}

/// Decode any media's audio to a mono WAV at the given sample rate.
pub fn decode_to_wav(input: &Path, output: &Path, sample_rate: u32) -> Result<()> {
    run_ffmpeg(
        Command::new("ffmpeg")
            .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(input)
            .args(["-ac", "1", "-ar", &sample_rate.to_string(), "-vn"])
            .arg(output),
        "decode",
    )
}

/// Remux the dubbed track over the source media with background ducking.
///
/// The original audio is attenuated to `bg_gain` and the dubbed track is
/// mixed on top; the video stream is copied untouched.
pub fn mix_and_remux(video: &Path, dubbed_wav: &Path, output: &Path, bg_gain: f32) -> Result<()> {
    let filtergraph =
        format!("[0:a]volume={bg_gain}[bg];[bg][1:a]amix=inputs=2:duration=first[a_out]");

    run_ffmpeg(
        Command::new("ffmpeg")
            .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(video)
            .arg("-i")
            .arg(dubbed_wav)
            .args(["-filter_complex", &filtergraph])
            .args(["-map", "0:v?", "-map", "[a_out]"])
            .args(["-c:v", "copy"])
            .arg(output),
        "remux",
    )
}

fn run_ffmpeg(command: &mut Command, stage: &str) -> Result<()> {
    let output = command
        .output()
        .wrap_err_with(|| format!("failed to run ffmpeg ({stage})"))?;

    if !output.status.success() {
        return Err(eyre!(
            "ffmpeg {stage} failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    Ok(())
}
