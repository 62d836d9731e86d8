//! Group scheduler: drives one group through repeated ticks.
//!
//! A tick stamps the wall-clock second, runs every member concurrently and
//! waits for all of them to settle. The group then either stops (failure,
//! sample budget spent, interval overrun) or sleeps until one interval after
//! the tick started. Ticks of one group never overlap.
//!
//! ```text
//! Idle → Running → (Sleeping → Running)* → Done | Failed
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::clock::unix_seconds;
use crate::error::{PollError, Result};
use crate::group::Group;
use crate::runner::CommandRunner;

/// Lifecycle of a scheduled group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Idle,
    Running,
    Sleeping,
    Done,
    Failed,
}

impl std::fmt::Display for GroupState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Sleeping => write!(f, "sleeping"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// How a group stopped without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOutcome {
    /// The sample budget was spent.
    Done,
    /// The stop signal arrived during a tick or between ticks.
    Interrupted,
}

/// Per-group scheduling knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleOptions {
    /// Ticks to run before stopping; `None` runs until stopped.
    pub samples: Option<u32>,
    /// Print each member's sample after a successful run.
    pub verbose: bool,
}

struct Tracker {
    interval: Duration,
    state: GroupState,
}

impl Tracker {
    fn enter(&mut self, next: GroupState) {
        log::debug!(
            "group every {}s: {} -> {}",
            self.interval.as_secs(),
            self.state,
            next
        );
        self.state = next;
    }
}

/// Run `group` until its sample budget is spent, it fails, or `stop` turns true.
///
/// A dropped stop sender is treated as "never stop".
pub async fn run_group<R: CommandRunner>(
    group: Group,
    runner: Arc<R>,
    options: ScheduleOptions,
    mut stop: watch::Receiver<bool>,
) -> Result<GroupOutcome> {
    let mut tracker = Tracker {
        interval: group.interval,
        state: GroupState::Idle,
    };
    let mut remaining = options.samples;
    let mut ticks = 0u64;

    loop {
        if *stop.borrow() {
            log::debug!("group every {}s: stopped before tick", group.interval.as_secs());
            return Ok(GroupOutcome::Interrupted);
        }

        tracker.enter(GroupState::Running);
        let started = Instant::now();
        let stamp = unix_seconds(SystemTime::now());
        ticks += 1;

        let result = tokio::select! {
            result = run_tick(&group, &runner, stamp, options.verbose) => result,
            () = stopped(&mut stop) => {
                log::debug!("group every {}s: stopped during tick {ticks}", group.interval.as_secs());
                return Ok(GroupOutcome::Interrupted);
            }
        };

        if let Err(e) = result {
            tracker.enter(GroupState::Failed);
            return Err(e);
        }

        if let Some(left) = remaining.as_mut() {
            *left = left.saturating_sub(1);
            if *left == 0 {
                tracker.enter(GroupState::Done);
                return Ok(GroupOutcome::Done);
            }
        }

        let elapsed = started.elapsed();
        let Some(delay) = group.interval.checked_sub(elapsed) else {
            tracker.enter(GroupState::Failed);
            return Err(PollError::DeadlineExceeded {
                interval: group.interval,
                elapsed,
            });
        };

        tracker.enter(GroupState::Sleeping);
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = stopped(&mut stop) => {
                log::debug!("group every {}s: stopped while sleeping", group.interval.as_secs());
                return Ok(GroupOutcome::Interrupted);
            }
        }
    }
}

/// Run every member once and wait for all of them.
///
/// Returns the first error in completion order, after every member settled.
async fn run_tick<R: CommandRunner>(
    group: &Group,
    runner: &Arc<R>,
    stamp: u64,
    verbose: bool,
) -> Result<()> {
    let mut tasks = JoinSet::new();
    for metric in &group.members {
        let metric = Arc::clone(metric);
        let runner = Arc::clone(runner);
        tasks.spawn(async move {
            match metric.run(runner.as_ref(), stamp).await {
                Ok(_) => {
                    if verbose {
                        metric.report();
                    }
                    Ok(())
                }
                Err(e) => {
                    log::warn!("{} probe failed: {e}", e.kind());
                    Err(e)
                }
            }
        });
    }

    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        let result = joined.unwrap_or_else(|e| {
            Err(PollError::Execution {
                metric: format!("group every {}s", group.interval.as_secs()),
                reason: format!("probe task did not finish: {e}"),
            })
        });
        if let Err(e) = result {
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Resolves once the stop flag is true; never resolves if the sender is gone.
pub(crate) async fn stopped(stop: &mut watch::Receiver<bool>) {
    if stop.wait_for(|s| *s).await.is_err() {
        std::future::pending::<()>().await;
    }
}
