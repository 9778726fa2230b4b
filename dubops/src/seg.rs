//! Seg subcommand - regroup recognized words into translation-ready segments.

use dubops_core::segment::Segmenter;
use dubops_core::types::{Segment, Word};
use eyre::{Context, Result};
use std::path::{Path, PathBuf};

/// CLI arguments for transcript segmentation.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Path to recognizer word output (JSON array of {text, start, end})
    pub path: PathBuf,

    /// Output segment script path (default: same as input with .segments.json extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub segmenter: Segmenter,
}

/// Resolved configuration for transcript segmentation.
#[derive(Debug)]
pub struct Config {
    pub path: PathBuf,
    pub output: Option<PathBuf>,
    pub segmenter: Segmenter,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        Ok(Self {
            path: args.path,
            output: args.output,
            segmenter: args.segmenter,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    // Resolve output path
    let output = config
        .output
        .unwrap_or_else(|| config.path.with_extension("segments.json"));

    tracing::info!(
        input = ?config.path.display(),
        output = ?output.display(),
        "segmenting transcript"
    );

    let words = read_words(&config.path)?;
    let segments = config.segmenter.regroup(&words);

    tracing::info!(
        words = words.len(),
        segments = segments.len(),
        "transcript regrouped"
    );

    write_segments(&output, &segments)
}

/// Read a word-level transcript from a JSON file.
pub fn read_words(path: &Path) -> Result<Vec<Word>> {
    let data = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read transcript: {:?}", path.display()))?;

    serde_json::from_str(&data)
        .wrap_err_with(|| format!("failed to parse transcript: {:?}", path.display()))
}

/// Read a segment script from a JSON file.
pub fn read_segments(path: &Path) -> Result<Vec<Segment>> {
    let data = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read segment script: {:?}", path.display()))?;

    serde_json::from_str(&data)
        .wrap_err_with(|| format!("failed to parse segment script: {:?}", path.display()))
}

/// Write a segment script as pretty-printed JSON.
fn write_segments(path: &Path, segments: &[Segment]) -> Result<()> {
    let data = serde_json::to_string_pretty(segments)?;

    std::fs::write(path, data)
        .wrap_err_with(|| format!("failed to write segment script: {:?}", path.display()))
}
