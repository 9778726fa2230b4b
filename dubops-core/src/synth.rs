//! Concurrent synthesis orchestration.
//!
//! Dispatches synthesis requests for all segments of one media item
//! concurrently, bounded by a counting semaphore, with bounded retries
//! per request. The segment→clip mapping is fixed by index before
//! dispatch, so results are deterministic regardless of completion
//! order. A request that fails permanently degrades to a silent clip of
//! the target slot duration; the batch itself never fails.

use crate::audio::Clip;
use crate::error::{ConfigError, SynthesisError};
use crate::retry::RetryPolicy;
use crate::types::Segment;
use futures::future::join_all;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Default number of simultaneous in-flight synthesis requests
const DEFAULT_CONCURRENCY: usize = 3;

/// Speech synthesis collaborator.
///
/// `index` identifies the owning segment so implementations can cache
/// rendered clips on disk for idempotent resumption.
pub trait Synthesizer {
    async fn synthesize(&self, index: usize, text: &str) -> Result<Clip, SynthesisError>;
}

/// Synthesis dispatch configuration.
#[derive(clap::Args, Clone, Copy, Debug)]
pub struct SynthConfig {
    /// Maximum simultaneous in-flight synthesis requests
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Retry attempts per synthesis request
    #[arg(long, default_value_t = 5)]
    pub retry_count: u32,

    /// Backoff base delay between retries in seconds
    #[arg(long, default_value_t = 2.0)]
    pub backoff_secs: f32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            retry_count: 5,
            backoff_secs: 2.0,
        }
    }
}

impl SynthConfig {
    /// Retry policy derived from the configured count and base delay.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_count,
            Duration::from_secs_f32(self.backoff_secs.max(0.0)),
        )
    }
}

/// Bounded-concurrency synthesis dispatcher for one media item.
#[derive(Debug)]
pub struct SynthPool<S> {
    synthesizer: S,
    config: SynthConfig,
    sample_rate: u32,
}

impl<S: Synthesizer> SynthPool<S> {
    /// Create a pool, validating the configuration.
    pub fn new(synthesizer: S, config: SynthConfig, sample_rate: u32) -> Result<Self, ConfigError> {
        if config.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        Ok(Self {
            synthesizer,
            config,
            sample_rate,
        })
    }

    /// Synthesize clips for all segments, index-ordered.
    ///
    /// Trivial text short-circuits to silence without an external call.
    /// Exhausted retries degrade to a silent clip of the slot duration.
    pub async fn synthesize_all(&self, segments: &[Segment]) -> Vec<Clip> {
        let semaphore = Semaphore::new(self.config.concurrency);
        let retry = self.config.retry_policy();

        let requests = segments.iter().enumerate().map(|(index, segment)| {
            let semaphore = &semaphore;
            async move {
                let slot = segment.slot().max(0.0);
                let text = segment.text.trim();

                if is_trivial(text) {
                    tracing::debug!(index, "trivial text, substituting silence");
                    return Clip::silent(slot, self.sample_rate);
                }

                // The semaphore is never closed, so acquire cannot fail
                let Ok(_permit) = semaphore.acquire().await else {
                    return Clip::silent(slot, self.sample_rate);
                };

                match retry.run(|| self.synthesizer.synthesize(index, text)).await {
                    Ok(clip) => clip,
                    Err(error) => {
                        tracing::warn!(
                            index,
                            attempts = self.config.retry_count,
                            %error,
                            "synthesis failed permanently, substituting silence"
                        );
                        Clip::silent(slot, self.sample_rate)
                    }
                }
            }
        });

        join_all(requests).await
    }
}

/// Whether text is empty or bare punctuation, not worth a service call.
fn is_trivial(text: &str) -> bool {
    text.chars().all(|c| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const RATE: u32 = 1000;

    fn quick_config() -> SynthConfig {
        SynthConfig {
            backoff_secs: 0.0,
            ..SynthConfig::default()
        }
    }

    /// Yields a constant-amplitude clip encoding the segment index.
    struct IndexSynth;

    impl Synthesizer for IndexSynth {
        async fn synthesize(&self, index: usize, _text: &str) -> Result<Clip, SynthesisError> {
            // Later segments finish first to scramble completion order
            tokio::time::sleep(Duration::from_millis(20u64.saturating_sub(index as u64 * 5))).await;
            Ok(Clip::new(vec![index as f32 / 100.0; 10], RATE))
        }
    }

    /// Always fails.
    struct DownSynth {
        calls: Cell<u32>,
    }

    impl Synthesizer for DownSynth {
        async fn synthesize(&self, _index: usize, _text: &str) -> Result<Clip, SynthesisError> {
            self.calls.set(self.calls.get() + 1);
            Err(SynthesisError::Backend("service unavailable".into()))
        }
    }

    /// Panics when invoked; for asserting the short-circuit path.
    struct UnreachableSynth;

    impl Synthesizer for UnreachableSynth {
        async fn synthesize(&self, index: usize, text: &str) -> Result<Clip, SynthesisError> {
            panic!("unexpected synthesis call for segment {index}: {text:?}");
        }
    }

    /// Tracks the maximum number of concurrent in-flight calls.
    struct GaugeSynth {
        in_flight: Cell<usize>,
        peak: Cell<usize>,
    }

    impl Synthesizer for GaugeSynth {
        async fn synthesize(&self, _index: usize, _text: &str) -> Result<Clip, SynthesisError> {
            self.in_flight.set(self.in_flight.get() + 1);
            self.peak.set(self.peak.get().max(self.in_flight.get()));
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.set(self.in_flight.get() - 1);
            Ok(Clip::silent(0.1, RATE))
        }
    }

    fn spoken_segments(n: usize) -> Vec<Segment> {
        (0..n)
            .map(|i| Segment::new(format!("line {i}"), i as f32, i as f32 + 1.0))
            .collect()
    }

    #[tokio::test]
    async fn results_are_index_ordered() {
        let pool = SynthPool::new(IndexSynth, quick_config(), RATE).unwrap();

        let clips = pool.synthesize_all(&spoken_segments(4)).await;

        assert_eq!(clips.len(), 4);
        for (i, clip) in clips.iter().enumerate() {
            assert!((clip.samples[0] - i as f32 / 100.0).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn exhausted_retries_degrade_to_slot_silence() {
        let synth = DownSynth {
            calls: Cell::new(0),
        };
        let pool = SynthPool::new(synth, quick_config(), RATE).unwrap();

        let segments = vec![Segment::new("hello", 1.0, 3.5)];
        let clips = pool.synthesize_all(&segments).await;

        assert_eq!(clips.len(), 1);
        assert!((clips[0].duration_secs() - 2.5).abs() < 1e-3);
        assert!(clips[0].samples.iter().all(|&s| s == 0.0));
        assert_eq!(pool.synthesizer.calls.get(), 5);
    }

    #[tokio::test]
    async fn trivial_text_short_circuits_to_silence() {
        let pool = SynthPool::new(UnreachableSynth, quick_config(), RATE).unwrap();

        let segments = vec![Segment::new("...", 0.0, 1.0), Segment::new("  ", 1.0, 1.5)];
        let clips = pool.synthesize_all(&segments).await;

        assert!((clips[0].duration_secs() - 1.0).abs() < 1e-3);
        assert!((clips[1].duration_secs() - 0.5).abs() < 1e-3);
    }

    #[tokio::test]
    async fn in_flight_requests_stay_within_limit() {
        let synth = GaugeSynth {
            in_flight: Cell::new(0),
            peak: Cell::new(0),
        };
        let config = SynthConfig {
            concurrency: 2,
            ..quick_config()
        };
        let pool = SynthPool::new(synth, config, RATE).unwrap();

        pool.synthesize_all(&spoken_segments(6)).await;

        assert!(pool.synthesizer.peak.get() <= 2);
        assert!(pool.synthesizer.peak.get() >= 1);
    }

    #[test]
    fn rejects_zero_concurrency() {
        let config = SynthConfig {
            concurrency: 0,
            ..SynthConfig::default()
        };

        assert!(matches!(
            SynthPool::new(UnreachableSynth, config, RATE),
            Err(ConfigError::ZeroConcurrency)
        ));
    }
}
