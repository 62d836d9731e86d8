//! End-of-session reporting: console summary and JSON snapshot file.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::{PollError, Result};
use crate::metric::MetricSnapshot;

/// Aggregate statistics for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    pub name: String,
    pub samples: usize,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// What the reporter prints when a session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub metric_count: usize,
    /// History length of the first metric.
    pub samples_taken: usize,
    pub frequency_secs: Option<u64>,
    pub elapsed: Option<Duration>,
    pub interrupted: bool,
    pub metrics: Vec<MetricSummary>,
}

impl SessionSummary {
    pub fn from_snapshots(snapshots: &[MetricSnapshot]) -> Self {
        let metrics: Vec<MetricSummary> = snapshots
            .iter()
            .map(|s| MetricSummary {
                name: s.name.clone(),
                samples: s.history.len(),
                average: s.average(),
                min: s.min(),
                max: s.max(),
            })
            .collect();

        Self {
            metric_count: metrics.len(),
            samples_taken: metrics.first().map_or(0, |m| m.samples),
            frequency_secs: None,
            elapsed: None,
            interrupted: false,
            metrics,
        }
    }

    pub fn with_frequency(mut self, secs: u64) -> Self {
        self.frequency_secs = Some(secs);
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }

    pub fn with_interrupted(mut self, interrupted: bool) -> Self {
        self.interrupted = interrupted;
        self
    }

    /// Write the human-readable summary.
    pub fn render<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out)?;
        writeln!(
            out,
            "Measured {} metrics {} times",
            self.metric_count, self.samples_taken
        )?;
        if let Some(secs) = self.frequency_secs {
            writeln!(out, "  Frequency: {secs}s")?;
        }
        if let Some(elapsed) = self.elapsed {
            writeln!(out, "  Elapsed:   {:.1}s", elapsed.as_secs_f64())?;
        }
        if self.interrupted {
            writeln!(out, "  Stopped:   interrupted")?;
        }
        writeln!(out)?;

        writeln!(
            out,
            "{:<28} {:>8} {:>12} {:>12} {:>12}",
            "Metric", "Samples", "Average", "Min", "Max"
        )?;
        writeln!(out, "{}", "-".repeat(76))?;
        for m in &self.metrics {
            writeln!(
                out,
                "{:<28} {:>8} {:>12} {:>12} {:>12}",
                m.name,
                m.samples,
                format_stat(m.average),
                format_stat(m.min),
                format_stat(m.max)
            )?;
        }
        Ok(())
    }
}

fn format_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"))
}

/// Write snapshots as a JSON array indented with four spaces.
pub fn write_snapshot(path: &Path, snapshots: &[MetricSnapshot]) -> Result<()> {
    let json = to_pretty_json(snapshots).map_err(|e| PollError::Sink {
        path: path.to_path_buf(),
        source: std::io::Error::other(e),
    })?;
    fs::write(path, json).map_err(|source| PollError::Sink {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a snapshot file written by [`write_snapshot`].
pub fn load_snapshot(path: &Path) -> std::io::Result<Vec<MetricSnapshot>> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(std::io::Error::other)
}

fn to_pretty_json(snapshots: &[MetricSnapshot]) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    snapshots.serialize(&mut ser)?;
    Ok(buf)
}
