//! Error taxonomy for a polling session.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Everything that can end a polling session early.
///
/// `Configuration` happens before scheduling starts. `Execution`, `Output` and
/// `DeadlineExceeded` are fatal to the group that produced them. `Sink` only
/// affects the snapshot file; the console summary has already been printed.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("unable to load config {path}: {reason}")]
    Configuration { path: PathBuf, reason: String },

    /// The command exited non-zero or could not be started.
    #[error("{metric}: {reason}")]
    Execution { metric: String, reason: String },

    /// The command wrote to stderr or did not print a finite number.
    #[error("{metric}: {reason}")]
    Output { metric: String, reason: String },

    #[error("command is too slow: a tick took {elapsed:?} but the interval is {interval:?}")]
    DeadlineExceeded {
        interval: Duration,
        elapsed: Duration,
    },

    #[error("unable to write {path}: {source}")]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PollError {
    /// Short category label used in logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Execution { .. } => "execution",
            Self::Output { .. } => "output",
            Self::DeadlineExceeded { .. } => "deadline",
            Self::Sink { .. } => "sink",
        }
    }
}

pub type Result<T> = std::result::Result<T, PollError>;
