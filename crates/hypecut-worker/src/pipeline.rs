//! The end-to-end highlight pipeline.
//!
//! Detection runs as a single synchronous pass; acquisition and
//! normalization of independent intervals run on a bounded task pool.
//! Artifacts are tagged with their originating interval index so the final
//! EDL order is a plain sort, never completion order.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use hypecut_detect::{bin_events, detect_candidates, refine_intervals};
use hypecut_edl::Edl;
use hypecut_media::{
    fetch_segment, normalize_segment, ByteRangeSource, FetchPlanner, NormalizeTarget, SourceVideo,
};
use hypecut_models::{ChatEvent, ClipArtifact, FetchPlan, RefinedInterval, RunReport, RunSummary};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};

/// What a completed run hands back to the caller.
#[derive(Debug)]
pub struct PipelineOutput {
    /// The refined intervals detection produced.
    pub intervals: Vec<RefinedInterval>,
    /// Normalized clips, in original interval order.
    pub artifacts: Vec<ClipArtifact>,
    /// Path of the written EDL, absent in dry runs.
    pub edl_path: Option<PathBuf>,
    /// Run accounting.
    pub summary: RunSummary,
}

/// Outcome of one fetch+normalize task.
enum TaskOutcome {
    Done(Box<ClipArtifact>),
    FetchFailed(hypecut_media::MediaError),
    NormalizeFailed(hypecut_media::MediaError),
}

/// The highlight pipeline, parameterized by worker configuration.
pub struct Pipeline {
    config: WorkerConfig,
}

impl Pipeline {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    /// Run detection and, unless dry-run, acquisition and export.
    ///
    /// `byte_source` is the seekable handle the fetch collaborator
    /// supplied for `source`; it is never touched in dry-run mode.
    pub async fn run(
        &self,
        events: &[ChatEvent],
        stream_duration: f64,
        source: &SourceVideo,
        byte_source: Arc<dyn ByteRangeSource>,
    ) -> WorkerResult<PipelineOutput> {
        self.config.analysis.validate()?;

        let (intervals, dropped) = self.detect(events, stream_duration)?;
        let detected = intervals.len();
        info!(detected, dropped, "detection complete");

        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        self.write_intervals(&intervals).await?;

        if self.config.analysis.dry_run {
            let summary = RunSummary {
                detected,
                events_dropped: dropped,
                ..Default::default()
            };
            self.write_summary(&summary).await?;
            info!(?summary, "dry run complete, no fetch or transcode issued");
            return Ok(PipelineOutput {
                intervals,
                artifacts: Vec::new(),
                edl_path: None,
                summary,
            });
        }

        tokio::fs::create_dir_all(&self.config.work_dir).await?;

        let planner = FetchPlanner::new(self.config.snap_fallback)?;
        let plans = planner.plan(&intervals, source);

        let (artifacts, fetched, skipped) = self.acquire(plans, byte_source).await?;

        if artifacts.len() != detected - skipped {
            return Err(WorkerError::ExportInconsistency {
                detected,
                skipped,
                actual: artifacts.len(),
            });
        }

        let edl = Edl::assemble(self.config.edl_title.as_str(), &artifacts)?;
        let edl_path = self.config.output_dir.join("highlights.edl");
        tokio::fs::write(&edl_path, edl.to_cmx3600()).await?;

        let summary = RunSummary {
            detected,
            fetched,
            skipped,
            exported: edl.events.len(),
            events_dropped: dropped,
        };
        self.write_summary(&summary).await?;
        info!(?summary, edl = %edl_path.display(), "run complete");

        Ok(PipelineOutput {
            intervals,
            artifacts,
            edl_path: Some(edl_path),
            summary,
        })
    }

    /// Detection half: bin, score, refine. Pure and synchronous.
    fn detect(
        &self,
        events: &[ChatEvent],
        stream_duration: f64,
    ) -> WorkerResult<(Vec<RefinedInterval>, u64)> {
        let cfg = &self.config.analysis;
        let (bins, dropped) = bin_events(events, cfg.bin_width, stream_duration)?;
        let (_, candidates) = detect_candidates(&bins, cfg.rolling_window, cfg.z_threshold)?;
        let intervals = refine_intervals(
            &candidates,
            cfg.padding_pre,
            cfg.padding_post,
            cfg.merge_threshold,
            stream_duration,
        )?;
        Ok((intervals, dropped))
    }

    /// Bounded parallel fetch+normalize over the plans.
    ///
    /// Returns artifacts sorted by interval index, the fetched count, and
    /// the skipped count. Individual failures skip their interval; only a
    /// panicked task aborts the batch.
    async fn acquire(
        &self,
        plans: Vec<FetchPlan>,
        byte_source: Arc<dyn ByteRangeSource>,
    ) -> WorkerResult<(Vec<ClipArtifact>, usize, usize)> {
        let semaphore = Arc::new(Semaphore::new(self.config.analysis.fetch_concurrency_limit));
        let target = NormalizeTarget {
            fps: self.config.target_fps,
            timeout_secs: (self.config.transcode_timeout_secs > 0)
                .then_some(self.config.transcode_timeout_secs),
            ..Default::default()
        };

        let mut tasks: JoinSet<(usize, TaskOutcome)> = JoinSet::new();
        for (index, plan) in plans.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let byte_source = byte_source.clone();
            let target = target.clone();
            let raw_path = self.config.work_dir.join(format!("segment_{index:03}.ts"));
            let clip_path = self.config.output_dir.join(format!("clip_{index:03}.mp4"));

            tasks.spawn(async move {
                // Closed semaphore only happens on shutdown.
                let Ok(_permit) = semaphore.acquire().await else {
                    return (
                        index,
                        TaskOutcome::FetchFailed(hypecut_media::MediaError::fetch_failed(
                            "worker shutting down",
                        )),
                    );
                };

                if let Err(e) = fetch_segment(byte_source.as_ref(), &plan, &raw_path).await {
                    return (index, TaskOutcome::FetchFailed(e));
                }
                match normalize_segment(&plan, &raw_path, &clip_path, &target).await {
                    Ok(artifact) => (index, TaskOutcome::Done(Box::new(artifact))),
                    Err(e) => (index, TaskOutcome::NormalizeFailed(e)),
                }
            });
        }

        let mut indexed: Vec<(usize, ClipArtifact)> = Vec::new();
        let mut fetched = 0usize;
        let mut skipped = 0usize;

        while let Some(joined) = tasks.join_next().await {
            let (index, outcome) =
                joined.map_err(|e| WorkerError::TaskPanicked(e.to_string()))?;
            match outcome {
                TaskOutcome::Done(artifact) => {
                    fetched += 1;
                    indexed.push((index, *artifact));
                }
                TaskOutcome::FetchFailed(e) => {
                    skipped += 1;
                    warn!(interval = index, error = %e, "fetch failed, skipping interval");
                }
                TaskOutcome::NormalizeFailed(e) => {
                    fetched += 1;
                    skipped += 1;
                    warn!(interval = index, error = %e, "normalize failed, skipping interval");
                }
            }
        }

        // Completion order is arbitrary; the EDL needs interval order.
        indexed.sort_by_key(|(index, _)| *index);
        let artifacts = indexed.into_iter().map(|(_, a)| a).collect();
        Ok((artifacts, fetched, skipped))
    }

    async fn write_intervals(&self, intervals: &[RefinedInterval]) -> WorkerResult<()> {
        let path = self.config.output_dir.join("intervals.json");
        let json = serde_json::to_string_pretty(intervals)?;
        tokio::fs::write(&path, json).await?;
        Ok(())
    }

    async fn write_summary(&self, summary: &RunSummary) -> WorkerResult<()> {
        let path = self.config.output_dir.join("summary.json");
        let report = RunReport::new(*summary, self.config.analysis.clone());
        tokio::fs::write(&path, serde_json::to_string_pretty(&report)?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use hypecut_media::{ByteRangeSource, MediaResult};
    use hypecut_models::{AnalysisConfig, ByteRange};

    /// Byte-range source that counts every read so tests can prove a dry
    /// run never touches it.
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl ByteRangeSource for CountingSource {
        async fn size(&self) -> MediaResult<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }

        async fn copy_range(&self, _range: ByteRange, _dest: &Path) -> MediaResult<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    /// Byte-range source whose reads always fail, standing in for an
    /// unreachable asset.
    struct FailingSource;

    #[async_trait::async_trait]
    impl ByteRangeSource for FailingSource {
        async fn size(&self) -> MediaResult<u64> {
            Ok(1_000)
        }

        async fn copy_range(&self, _range: ByteRange, _dest: &Path) -> MediaResult<u64> {
            Err(hypecut_media::MediaError::fetch_failed("source unavailable"))
        }
    }

    fn scenario_config(out: &Path) -> WorkerConfig {
        WorkerConfig {
            analysis: AnalysisConfig {
                bin_width: 10.0,
                rolling_window: 3,
                z_threshold: 3.0,
                padding_pre: 20.0,
                padding_post: 10.0,
                merge_threshold: 15.0,
                fetch_concurrency_limit: 2,
                dry_run: true,
            },
            work_dir: out.join("work"),
            output_dir: out.join("out"),
            ..Default::default()
        }
    }

    /// One event per unit of count, spread inside each 10s bin.
    fn scenario_events() -> Vec<ChatEvent> {
        let counts = [1, 1, 1, 1, 1, 1, 50, 1, 1, 1];
        let mut events = Vec::new();
        for (bin, &n) in counts.iter().enumerate() {
            for k in 0..n {
                let t = bin as f64 * 10.0 + (k as f64 + 0.5) * (10.0 / n as f64);
                events.push(ChatEvent::at(t));
            }
        }
        events
    }

    #[tokio::test]
    async fn test_dry_run_detects_scenario_interval_without_io() {
        let dir = tempfile::tempdir().unwrap();
        let config = scenario_config(dir.path());
        let source = SourceVideo {
            path: dir.path().join("stream.ts"),
            total_bytes: 0,
            keyframe_index: None,
        };
        let counting = Arc::new(CountingSource::new());

        let out = Pipeline::new(config)
            .run(&scenario_events(), 100.0, &source, counting.clone())
            .await
            .unwrap();

        // Spike at bin 6 -> candidate [60, 70) -> padded [40, 80).
        assert_eq!(out.intervals, vec![RefinedInterval::new(40.0, 80.0)]);
        assert_eq!(out.summary.detected, 1);
        assert_eq!(out.summary.exported, 0);
        assert!(out.edl_path.is_none());
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dry_run_emits_serialized_intervals() {
        let dir = tempfile::tempdir().unwrap();
        let config = scenario_config(dir.path());
        let intervals_path = config.output_dir.join("intervals.json");
        let source = SourceVideo {
            path: dir.path().join("stream.ts"),
            total_bytes: 0,
            keyframe_index: None,
        };

        Pipeline::new(config)
            .run(&scenario_events(), 100.0, &source, Arc::new(CountingSource::new()))
            .await
            .unwrap();

        let json = tokio::fs::read_to_string(intervals_path).await.unwrap();
        let parsed: Vec<RefinedInterval> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![RefinedInterval::new(40.0, 80.0)]);
    }

    #[tokio::test]
    async fn test_dry_run_matches_direct_detection() {
        // The dry-run flag must not perturb detection output.
        let dir = tempfile::tempdir().unwrap();
        let config = scenario_config(dir.path());
        let events = scenario_events();

        let (bins, _) = bin_events(&events, 10.0, 100.0).unwrap();
        let (_, candidates) = detect_candidates(&bins, 3, 3.0).unwrap();
        let direct = refine_intervals(&candidates, 20.0, 10.0, 15.0, 100.0).unwrap();

        let source = SourceVideo {
            path: dir.path().join("stream.ts"),
            total_bytes: 0,
            keyframe_index: None,
        };
        let out = Pipeline::new(config)
            .run(&events, 100.0, &source, Arc::new(CountingSource::new()))
            .await
            .unwrap();

        assert_eq!(out.intervals, direct);
    }

    #[tokio::test]
    async fn test_failed_fetch_skips_interval_and_batch_completes() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = scenario_config(dir.path());
        config.analysis.dry_run = false;
        let source = SourceVideo {
            path: dir.path().join("stream.ts"),
            total_bytes: 1_000,
            keyframe_index: None,
        };

        let out = Pipeline::new(config)
            .run(&scenario_events(), 100.0, &source, Arc::new(FailingSource))
            .await
            .unwrap();

        // The failed interval is a recorded skip, not a fatal error, and
        // the accounting still satisfies the export-consistency check.
        assert_eq!(out.summary.detected, 1);
        assert_eq!(out.summary.skipped, 1);
        assert_eq!(out.summary.fetched, 0);
        assert_eq!(out.summary.exported, 0);
        assert!(out.artifacts.is_empty());

        let edl_text = tokio::fs::read_to_string(out.edl_path.unwrap())
            .await
            .unwrap();
        assert!(edl_text.starts_with("TITLE:"));
    }

    #[tokio::test]
    async fn test_invalid_config_is_fatal_before_detection() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = scenario_config(dir.path());
        config.analysis.bin_width = -1.0;
        let source = SourceVideo {
            path: dir.path().join("stream.ts"),
            total_bytes: 0,
            keyframe_index: None,
        };

        let err = Pipeline::new(config)
            .run(&scenario_events(), 100.0, &source, Arc::new(CountingSource::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::Config(_)));
    }

    #[tokio::test]
    async fn test_unsorted_events_abort_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = scenario_config(dir.path());
        let source = SourceVideo {
            path: dir.path().join("stream.ts"),
            total_bytes: 0,
            keyframe_index: None,
        };
        let events = vec![ChatEvent::at(50.0), ChatEvent::at(10.0)];

        let err = Pipeline::new(config)
            .run(&events, 100.0, &source, Arc::new(CountingSource::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::Detect(_)));
    }
}
