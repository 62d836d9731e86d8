//! # shellpoll-core
//!
//! **Run shell probes on a schedule and keep what they measured.**
//!
//! `shellpoll-core` periodically executes a configured set of external
//! measurement commands ("measure disk latency", "count open connections"),
//! records the number each one prints as a timestamped sample, and reports
//! aggregate statistics when the session ends.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use shellpoll_core::{MetricDefinition, PollOptions, Session, ShellRunner};
//!
//! # async fn demo() {
//! let definitions = vec![MetricDefinition {
//!     name: "load".to_string(),
//!     command: "cut -d' ' -f1 /proc/loadavg".to_string(),
//!     frequency: Some(5),
//! }];
//! let options = PollOptions {
//!     samples: Some(3),
//!     ..Default::default()
//! };
//!
//! let session = Session::new(&definitions, options);
//! let (_interrupt_tx, interrupt_rx) = tokio::sync::watch::channel(false);
//! let outcome = session.run(Arc::new(ShellRunner), interrupt_rx).await;
//! session.finalize(&outcome, &mut std::io::stdout());
//! # }
//! ```
//!
//! ## Architecture
//!
//! Definitions → Metrics → Groups (by interval) → one Scheduler per group → Reporter
//!
//! Every group ticks independently: all members run concurrently, the tick
//! waits for every member to settle, and the next tick starts one interval
//! after the previous one started. A member failure, a tick slower than its
//! interval, or an interrupt ends the session; the reporter then runs exactly
//! once.

pub mod clock;
pub mod config;
pub mod error;
pub mod group;
pub mod metric;
pub mod report;
pub mod runner;
pub mod scheduler;
pub mod session;

pub use config::{
    DEFAULT_CONFIG_PATH, DEFAULT_FREQUENCY_SECS, MetricDefinition, PollOptions, load_definitions,
    parse_definitions,
};
pub use error::{PollError, Result};
pub use group::{Group, group_by_interval};
pub use metric::{Metric, MetricSnapshot, Sample};
pub use report::{MetricSummary, SessionSummary, load_snapshot, write_snapshot};
pub use runner::{CommandOutput, CommandRunner, ShellRunner};
pub use scheduler::{GroupOutcome, GroupState, ScheduleOptions, run_group};
pub use session::{Finalized, Session, SessionOutcome};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
