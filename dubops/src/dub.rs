//! Mix subcommand - synthesize translated segments and mix a dubbed video.

use crate::ffmpeg::{self, AtempoCorrector};
use crate::synthesis::CommandSynthesizer;
use color_eyre::Section;
use dubops_core::audio::Track;
use dubops_core::error::ConfigError;
use dubops_core::synth::{SynthConfig, SynthPool};
use dubops_core::timeline::{AlignConfig, TrackAssembler};
use dubops_core::types::Segment;
use eyre::{Context, Result};
use std::path::PathBuf;

/// CLI arguments for dubbing a video from a translated segment script.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Path to source video
    pub video: PathBuf,

    /// Path to translated segment script (JSON array of {text, start, end})
    pub script: PathBuf,

    /// Output video path (default: same as input with .dubbed.mp4 extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TTS command template with {text} and {output} placeholders
    #[arg(long)]
    pub tts_command: String,

    /// Linear gain applied to the original audio under the dub
    #[arg(long, default_value_t = 0.2)]
    pub bg_gain: f32,

    /// Directory for rendered clips; reruns skip segments already present
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    #[command(flatten)]
    pub synth_config: SynthConfig,

    #[command(flatten)]
    pub align_config: AlignConfig,
}

/// Resolved configuration for dubbing.
#[derive(Debug)]
pub struct Config {
    pub video: PathBuf,
    pub script: PathBuf,
    pub output: Option<PathBuf>,
    pub tts_command: String,
    pub bg_gain: f32,
    pub cache_dir: Option<PathBuf>,
    pub synth_config: SynthConfig,
    pub align_config: AlignConfig,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        if !(0.0..=1.0).contains(&args.bg_gain) {
            return Err(ConfigError::InvalidBackgroundGain(args.bg_gain).into());
        }

        Ok(Self {
            video: args.video,
            script: args.script,
            output: args.output,
            tts_command: args.tts_command,
            bg_gain: args.bg_gain,
            cache_dir: args.cache_dir,
            synth_config: args.synth_config,
            align_config: args.align_config,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    // Resolve output path
    let output = config
        .output
        .clone()
        .unwrap_or_else(|| config.video.with_extension("dubbed.mp4"));

    tracing::info!(
        video = ?config.video.display(),
        script = ?config.script.display(),
        output = ?output.display(),
        "dubbing"
    );

    let segments = crate::seg::read_segments(&config.script)
        .suggestion("generate a segment script with: dub seg <words.json>")?;
    let total_duration = ffmpeg::probe_duration(&config.video)?;

    tracing::info!(
        segments = segments.len(),
        total_duration,
        "synthesizing dubbed track"
    );

    // A user cache dir persists across runs; otherwise clips live in a
    // temp dir deleted when the guard drops
    let (cache_dir, _guard) = match config.cache_dir.clone() {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .wrap_err_with(|| format!("failed to create cache dir: {:?}", dir.display()))?;
            (dir, None)
        }
        None => {
            let temp = tempfile::tempdir().wrap_err("failed to create temp cache dir")?;
            (temp.path().to_path_buf(), Some(temp))
        }
    };

    let track = synthesize_track(&config, &segments, cache_dir, total_duration)?;

    let dubbed_wav = output.with_extension("dub.wav");
    track.to_wav_file(&dubbed_wav)
        .wrap_err_with(|| format!("failed to export track: {:?}", dubbed_wav.display()))?;

    tracing::info!(track = ?dubbed_wav.display(), "remuxing over source media");

    ffmpeg::mix_and_remux(&config.video, &dubbed_wav, &output, config.bg_gain)
        .with_note(|| format!("assembled track kept at: {:?}", dubbed_wav.display()))?;

    std::fs::remove_file(&dubbed_wav).ok();

    tracing::info!(output = ?output.display(), "dub complete");

    Ok(())
}

/// Synthesize all clips and assemble the dubbed track.
///
/// Synthesis futures share one OS thread; the concurrency that matters
/// is in-flight external requests, not CPU.
fn synthesize_track(
    config: &Config,
    segments: &[Segment],
    cache_dir: PathBuf,
    total_duration: f32,
) -> Result<Track> {
    let synthesizer = CommandSynthesizer::new(
        config.tts_command.clone(),
        cache_dir,
        config.align_config.sample_rate,
    );
    let pool = SynthPool::new(
        synthesizer,
        config.synth_config,
        config.align_config.sample_rate,
    )?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build async runtime")?;

    let clips = runtime.block_on(pool.synthesize_all(segments));

    let assembler = TrackAssembler::new(config.align_config, AtempoCorrector)?;
    let clips = clips.into_iter().map(Some).collect();

    Ok(assembler.assemble(segments, clips, total_duration))
}
