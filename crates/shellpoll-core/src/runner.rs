//! Command execution seam.
//!
//! Every probe is executed through a [`CommandRunner`]. The default
//! [`ShellRunner`] hands the command line to the platform shell on tokio's
//! non-blocking process support; tests substitute a scripted runner.

use std::future::Future;
use std::process::Stdio;

use tokio::process::Command;

/// Captured result of one command execution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    /// Whether the process reported success.
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Something that can run a probe command to completion.
pub trait CommandRunner: Send + Sync + 'static {
    /// Run `command` and capture its output.
    ///
    /// An `Err` means the command could not be started at all; a command that
    /// ran and failed is an `Ok` with `success == false`.
    fn execute(
        &self,
        command: &str,
    ) -> impl Future<Output = std::io::Result<CommandOutput>> + Send;
}

/// Runs commands through `sh -c` (or `cmd /C` on Windows).
///
/// Children are not killed when the future is dropped, so an abandoned tick
/// leaves its commands running to natural completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    async fn execute(&self, command: &str) -> std::io::Result<CommandOutput> {
        let output = shell(command).stdin(Stdio::null()).output().await?;
        Ok(CommandOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

// ---------------------------------------------------------------------------
// Scripted runner for unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::{CommandOutput, CommandRunner};

    enum Script {
        Output {
            stdout: String,
            stderr: String,
            code: i32,
            delay: Duration,
        },
        Sequence(Vec<String>),
        SpawnFailure,
    }

    /// Deterministic runner keyed by the exact command string.
    pub(crate) struct FakeRunner {
        scripts: HashMap<String, Script>,
        calls: Mutex<HashMap<String, usize>>,
    }

    impl FakeRunner {
        pub(crate) fn new() -> Self {
            Self {
                scripts: HashMap::new(),
                calls: Mutex::new(HashMap::new()),
            }
        }

        fn script(mut self, command: &str, stdout: &str, stderr: &str, code: i32, delay: Duration) -> Self {
            self.scripts.insert(
                command.to_string(),
                Script::Output {
                    stdout: stdout.to_string(),
                    stderr: stderr.to_string(),
                    code,
                    delay,
                },
            );
            self
        }

        pub(crate) fn stdout(self, command: &str, stdout: &str) -> Self {
            self.script(command, stdout, "", 0, Duration::ZERO)
        }

        pub(crate) fn stderr(self, command: &str, stdout: &str, stderr: &str) -> Self {
            self.script(command, stdout, stderr, 0, Duration::ZERO)
        }

        pub(crate) fn exit(self, command: &str, code: i32, stderr: &str) -> Self {
            self.script(command, "", stderr, code, Duration::ZERO)
        }

        pub(crate) fn slow(self, command: &str, stdout: &str, delay: Duration) -> Self {
            self.script(command, stdout, "", 0, delay)
        }

        /// Each call prints the next value; the last one repeats.
        pub(crate) fn sequence(mut self, command: &str, values: &[&str]) -> Self {
            self.scripts.insert(
                command.to_string(),
                Script::Sequence(values.iter().map(|v| v.to_string()).collect()),
            );
            self
        }

        pub(crate) fn spawn_failure(mut self, command: &str) -> Self {
            self.scripts
                .insert(command.to_string(), Script::SpawnFailure);
            self
        }

        pub(crate) fn calls(&self, command: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .get(command)
                .copied()
                .unwrap_or(0)
        }
    }

    impl CommandRunner for FakeRunner {
        async fn execute(&self, command: &str) -> std::io::Result<CommandOutput> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                let n = calls.entry(command.to_string()).or_insert(0);
                *n += 1;
                *n
            };

            match self.scripts.get(command) {
                Some(Script::Output {
                    stdout,
                    stderr,
                    code,
                    delay,
                }) => {
                    if !delay.is_zero() {
                        tokio::time::sleep(*delay).await;
                    }
                    Ok(CommandOutput {
                        code: Some(*code),
                        success: *code == 0,
                        stdout: stdout.clone(),
                        stderr: stderr.clone(),
                    })
                }
                Some(Script::Sequence(values)) => {
                    let idx = (call - 1).min(values.len().saturating_sub(1));
                    Ok(CommandOutput {
                        code: Some(0),
                        success: true,
                        stdout: values.get(idx).cloned().unwrap_or_default(),
                        stderr: String::new(),
                    })
                }
                Some(Script::SpawnFailure) => Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such program",
                )),
                None => Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("unscripted command: {command}"),
                )),
            }
        }
    }
}
