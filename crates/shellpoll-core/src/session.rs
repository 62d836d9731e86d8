//! Polling session: owns the metrics, runs every group, finalizes once.
//!
//! The session is the run coordinator. Each group gets its own task; the
//! session ends when every group has spent its sample budget, when any group
//! fails, or when the interrupt signal fires. Whatever ends it, the remaining
//! groups are told to stop at their next suspension point and commands already
//! running are left to finish on their own.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::config::{MetricDefinition, PollOptions};
use crate::error::{PollError, Result};
use crate::group::{Group, group_by_interval};
use crate::metric::{Metric, MetricSnapshot};
use crate::report::{SessionSummary, write_snapshot};
use crate::runner::CommandRunner;
use crate::scheduler::{GroupOutcome, ScheduleOptions, run_group, stopped};

/// How a session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// Every group spent its sample budget.
    Completed,
    /// The interrupt signal fired first.
    Interrupted,
    /// A group failed; the first failure wins.
    Failed(PollError),
}

impl SessionOutcome {
    /// Whether the process should exit with status 0.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Result of the one finalize call that actually ran.
#[derive(Debug)]
pub struct Finalized {
    pub summary: SessionSummary,
    /// `None` when no output path is configured.
    pub snapshot: Option<Result<PathBuf>>,
}

/// A polling run from start to finalize.
pub struct Session {
    metrics: Vec<Arc<Metric>>,
    options: PollOptions,
    started_at: Instant,
    finalized: AtomicBool,
}

impl Session {
    /// Build metrics in configuration order.
    pub fn new(definitions: &[MetricDefinition], options: PollOptions) -> Self {
        let metrics = definitions
            .iter()
            .map(|def| Arc::new(Metric::from_definition(def, options.frequency)))
            .collect();
        Self {
            metrics,
            options,
            started_at: Instant::now(),
            finalized: AtomicBool::new(false),
        }
    }

    pub fn metrics(&self) -> &[Arc<Metric>] {
        &self.metrics
    }

    pub fn options(&self) -> &PollOptions {
        &self.options
    }

    pub fn groups(&self) -> Vec<Group> {
        group_by_interval(&self.metrics)
    }

    /// `{name, history}` for every metric, in configuration order.
    pub fn snapshots(&self) -> Vec<MetricSnapshot> {
        self.metrics.iter().map(|m| m.snapshot()).collect()
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::SeqCst)
    }

    /// Schedule every group concurrently until the session ends.
    ///
    /// `interrupt` turning true ends the session immediately, even mid-tick.
    /// A dropped interrupt sender means the session is never interrupted.
    pub async fn run<R: CommandRunner>(
        &self,
        runner: Arc<R>,
        mut interrupt: watch::Receiver<bool>,
    ) -> SessionOutcome {
        let groups = self.groups();
        let schedule = ScheduleOptions {
            samples: self.options.samples,
            verbose: self.options.verbose,
        };
        log::info!(
            "polling {} metrics in {} groups",
            self.metrics.len(),
            groups.len()
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        let mut tasks = JoinSet::new();
        for group in groups {
            tasks.spawn(run_group(
                group,
                Arc::clone(&runner),
                schedule,
                stop_rx.clone(),
            ));
        }

        let outcome = loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    None => break SessionOutcome::Completed,
                    Some(Ok(Ok(GroupOutcome::Done | GroupOutcome::Interrupted))) => {}
                    Some(Ok(Err(e))) => break SessionOutcome::Failed(e),
                    Some(Err(e)) => {
                        break SessionOutcome::Failed(PollError::Execution {
                            metric: "scheduler".to_string(),
                            reason: format!("group task did not finish: {e}"),
                        });
                    }
                },
                () = stopped(&mut interrupt) => break SessionOutcome::Interrupted,
            }
        };

        // Remaining groups wind down on their own; nothing is killed.
        stop_tx.send_replace(true);
        tasks.detach_all();

        match &outcome {
            SessionOutcome::Failed(e) => log::warn!("session failed ({}): {e}", e.kind()),
            SessionOutcome::Interrupted => log::info!("session interrupted"),
            SessionOutcome::Completed => log::info!("session completed"),
        }
        outcome
    }

    /// Print the summary and write the snapshot file, exactly once.
    ///
    /// Later calls return `None` without printing or writing anything. The
    /// summary is printed before the snapshot is written, so a failed write
    /// never hides it.
    pub fn finalize<W: Write>(&self, outcome: &SessionOutcome, console: &mut W) -> Option<Finalized> {
        if self
            .finalized
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("session already finalized");
            return None;
        }

        let snapshots = self.snapshots();
        let summary = SessionSummary::from_snapshots(&snapshots)
            .with_frequency(self.options.frequency)
            .with_elapsed(self.elapsed())
            .with_interrupted(matches!(outcome, SessionOutcome::Interrupted));

        if let Err(e) = summary.render(console).and_then(|()| console.flush()) {
            log::warn!("failed to print summary: {e}");
        }

        let snapshot = self.options.out.as_ref().map(|path| {
            write_snapshot(path, &snapshots).map(|()| path.clone())
        });

        Some(Finalized { summary, snapshot })
    }
}
