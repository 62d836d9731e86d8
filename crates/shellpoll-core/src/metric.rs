//! A named probe and the samples it has produced.

use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::format_iso8601;
use crate::config::MetricDefinition;
use crate::error::{PollError, Result};
use crate::runner::{CommandOutput, CommandRunner};

/// One observation: unix seconds of the tick start and the value printed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: u64,
    pub value: f64,
}

/// A probe command plus its append-only sample history.
///
/// The history is only ever appended to by [`Metric::run`]; the mutex
/// serializes those appends against readers taking snapshots.
#[derive(Debug)]
pub struct Metric {
    name: String,
    command: String,
    interval: Duration,
    history: Mutex<Vec<Sample>>,
}

impl Metric {
    pub fn new(name: impl Into<String>, command: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            interval,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Build a metric from its configuration, resolving the default frequency.
    pub fn from_definition(def: &MetricDefinition, default_frequency_secs: u64) -> Self {
        Self::new(
            def.name.trim(),
            def.command.clone(),
            def.interval(default_frequency_secs),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Polling interval this metric is grouped by.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run the command once and append the parsed value stamped with `time`.
    ///
    /// Nothing is appended unless the command exited cleanly, kept stderr
    /// empty and printed a finite number.
    pub async fn run<R: CommandRunner>(&self, runner: &R, time: u64) -> Result<Sample> {
        let output = runner
            .execute(&self.command)
            .await
            .map_err(|e| PollError::Execution {
                metric: self.name.clone(),
                reason: format!("failed to start `{}`: {e}", self.command),
            })?;
        let value = self.parse_output(&output)?;

        let mut history = self.history.lock().unwrap();
        // A wall clock stepping backwards must not reorder the history.
        let time = history.last().map_or(time, |last| time.max(last.time));
        let sample = Sample { time, value };
        history.push(sample);
        Ok(sample)
    }

    fn parse_output(&self, output: &CommandOutput) -> Result<f64> {
        if !output.success {
            let status = output
                .code
                .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit status {c}"));
            let stderr = output.stderr.trim();
            let reason = if stderr.is_empty() {
                status
            } else {
                format!("{status}: {stderr}")
            };
            return Err(PollError::Execution {
                metric: self.name.clone(),
                reason,
            });
        }

        let stderr = output.stderr.trim();
        if !stderr.is_empty() {
            return Err(PollError::Output {
                metric: self.name.clone(),
                reason: format!("wrote to stderr: {stderr}"),
            });
        }

        let stdout = output.stdout.trim();
        match leading_number(stdout) {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(PollError::Output {
                metric: self.name.clone(),
                reason: format!("invalid return value {stdout:?}"),
            }),
        }
    }

    /// Print the most recent sample as `name :: timestamp :: value`.
    pub fn report(&self) {
        if let Some(line) = self.report_line() {
            println!("{line}");
        }
    }

    /// The line [`Metric::report`] prints, or `None` before the first sample.
    pub fn report_line(&self) -> Option<String> {
        let last = *self.history.lock().unwrap().last()?;
        Some(format!(
            "{} :: {} :: {}",
            self.name,
            format_iso8601(last.time),
            last.value
        ))
    }

    /// Copy of the history so far.
    pub fn history(&self) -> Vec<Sample> {
        self.history.lock().unwrap().clone()
    }

    /// Number of samples taken so far.
    pub fn sample_count(&self) -> usize {
        self.history.lock().unwrap().len()
    }

    pub fn min(&self) -> Option<f64> {
        min_value(&self.history.lock().unwrap())
    }

    pub fn max(&self) -> Option<f64> {
        max_value(&self.history.lock().unwrap())
    }

    /// Arithmetic mean of every sample so far.
    pub fn average(&self) -> Option<f64> {
        average_value(&self.history.lock().unwrap())
    }

    /// Serializable `{name, history}` view; the command is not included.
    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            name: self.name.clone(),
            history: self.history(),
        }
    }
}

/// Serialized form of a metric at session end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub name: String,
    pub history: Vec<Sample>,
}

impl MetricSnapshot {
    pub fn min(&self) -> Option<f64> {
        min_value(&self.history)
    }

    pub fn max(&self) -> Option<f64> {
        max_value(&self.history)
    }

    pub fn average(&self) -> Option<f64> {
        average_value(&self.history)
    }
}

/// Parse the longest decimal number at the start of `text`, ignoring
/// leading whitespace and whatever follows (`"12.5 ms"` reads as 12.5).
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    text[..end].parse().ok()
}

fn min_value(history: &[Sample]) -> Option<f64> {
    history.iter().map(|s| s.value).reduce(f64::min)
}

fn max_value(history: &[Sample]) -> Option<f64> {
    history.iter().map(|s| s.value).reduce(f64::max)
}

fn average_value(history: &[Sample]) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let sum: f64 = history.iter().map(|s| s.value).sum();
    Some(sum / history.len() as f64)
}
