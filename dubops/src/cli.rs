//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use eyre::Result;

#[derive(Debug, Parser)]
#[command(name = "dub")]
#[command(about = "Isochronic dubbing tools for timed transcripts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Regroup recognized words into translation-ready segments
    Seg(crate::seg::Args),

    /// Synthesize translated segments and mix a dubbed video
    Mix(crate::dub::Args),
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    match cli.command {
        Commands::Seg(args) => crate::seg::execute(args.try_into()?),
        Commands::Mix(args) => crate::dub::execute(args.try_into()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dubops_core::segment::Segmenter;

    fn assert_default_segmenter(segmenter: &Segmenter) {
        assert!((segmenter.max_duration - 6.0).abs() < 0.001);
        assert!((segmenter.silence_gap - 0.75).abs() < 0.001);
    }

    #[test]
    fn parses_seg_command() {
        let cli = Cli::parse_from(["dub", "seg", "words.json"]);

        match &cli.command {
            Commands::Seg(crate::seg::Args {
                path,
                output: None,
                segmenter,
            }) if path.to_str() == Some("words.json") => {
                assert_default_segmenter(segmenter);
            }
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_seg_with_output() {
        let cli = Cli::parse_from(["dub", "seg", "words.json", "-o", "segments.json"]);

        match &cli.command {
            Commands::Seg(crate::seg::Args {
                path,
                output: Some(output),
                segmenter,
            }) if path.to_str() == Some("words.json")
                && output.to_str() == Some("segments.json") =>
            {
                assert_default_segmenter(segmenter);
            }
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_seg_with_tuning() {
        let cli = Cli::parse_from([
            "dub",
            "seg",
            "words.json",
            "--max-duration",
            "4.5",
            "--silence-gap",
            "0.5",
        ]);

        match &cli.command {
            Commands::Seg(args) => {
                assert!((args.segmenter.max_duration - 4.5).abs() < 0.001);
                assert!((args.segmenter.silence_gap - 0.5).abs() < 0.001);
            }
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_mix_command() {
        let cli = Cli::parse_from([
            "dub",
            "mix",
            "video.mp4",
            "translated.json",
            "--tts-command",
            "say -o {output} {text}",
        ]);

        match &cli.command {
            Commands::Mix(args) => {
                assert_eq!(args.video.to_str(), Some("video.mp4"));
                assert_eq!(args.script.to_str(), Some("translated.json"));
                assert_eq!(args.tts_command, "say -o {output} {text}");
                assert!((args.bg_gain - 0.2).abs() < 0.001);
                assert_eq!(args.synth_config.concurrency, 3);
                assert!((args.align_config.max_speed_factor - 1.25).abs() < 0.001);
            }
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_mix_with_overrides() {
        let cli = Cli::parse_from([
            "dub",
            "mix",
            "video.mp4",
            "translated.json",
            "--tts-command",
            "tts {text} {output}",
            "-o",
            "dubbed.mp4",
            "--bg-gain",
            "0.1",
            "--concurrency",
            "5",
            "--max-speed-factor",
            "1.5",
        ]);

        match &cli.command {
            Commands::Mix(args) => {
                assert_eq!(args.output.as_deref().and_then(|p| p.to_str()), Some("dubbed.mp4"));
                assert!((args.bg_gain - 0.1).abs() < 0.001);
                assert_eq!(args.synth_config.concurrency, 5);
                assert!((args.align_config.max_speed_factor - 1.5).abs() < 0.001);
            }
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn rejects_mix_without_tts_command() {
        assert!(Cli::try_parse_from(["dub", "mix", "video.mp4", "translated.json"]).is_err());
    }
}
