//! Time-bounded external process execution.
//!
//! Every renderer that shells out goes through [`BoundedCommand`]: the child
//! gets a null stdin, both output pipes are drained concurrently so a chatty
//! process cannot block on a full pipe, and the wait is raced against a timer.
//! On expiry the child is killed before the call returns.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::ports::RenderError;

/// A single external command with a hard deadline.
///
/// # Example
///
/// ```rust,ignore
/// let output = BoundedCommand::new("pandoc", Duration::from_secs(30))
///     .args(["-f", "html", "-o", "out.docx", "in.html"])
///     .current_dir(doc_dir)
///     .run()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct BoundedCommand {
    program: OsString,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    timeout: Duration,
}

/// Exit status and captured output of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Ways a bounded command can fail to complete.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{program} not found")]
    NotFound { program: String },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {} seconds", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    /// Maps the failure onto the renderer error taxonomy.
    pub fn into_render_error(self, renderer: &str) -> RenderError {
        match self {
            Self::NotFound { .. } => RenderError::unavailable(renderer, self.to_string()),
            Self::TimedOut { timeout, .. } => RenderError::timeout(renderer, timeout.as_secs()),
            Self::Spawn { .. } => RenderError::unavailable(renderer, self.to_string()),
            Self::Wait { .. } => RenderError::failed(renderer, self.to_string()),
        }
    }
}

impl BoundedCommand {
    pub fn new(program: impl Into<OsString>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Working directory for the child.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Runs the command to completion or until the timeout fires.
    pub async fn run(&self) -> Result<CommandOutput, CommandError> {
        let program = self.program_name();

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        tracing::debug!(
            program = %program,
            args = ?self.args,
            timeout_secs = self.timeout.as_secs(),
            "Spawning external process"
        );

        let mut child = command.spawn().map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => CommandError::NotFound {
                program: program.clone(),
            },
            _ => CommandError::Spawn {
                program: program.clone(),
                source,
            },
        })?;

        let mut stdout_task = tokio::spawn(drain(child.stdout.take()));
        let mut stderr_task = tokio::spawn(drain(child.stderr.take()));

        // The deadline covers the drains too: a detached grandchild can keep
        // the pipes open after the child itself has exited.
        let completion = async {
            let status = child.wait().await?;
            let stdout = (&mut stdout_task).await.unwrap_or_default();
            let stderr = (&mut stderr_task).await.unwrap_or_default();
            Ok::<_, std::io::Error>(CommandOutput {
                status,
                stdout,
                stderr,
            })
        };

        match tokio::time::timeout(self.timeout, completion).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(source)) => {
                stdout_task.abort();
                stderr_task.abort();
                Err(CommandError::Wait { program, source })
            }
            Err(_) => {
                if let Ok(None) = child.try_wait() {
                    if let Err(e) = child.kill().await {
                        tracing::warn!(program = %program, error = %e, "Failed to kill timed out process");
                    }
                }
                stdout_task.abort();
                stderr_task.abort();
                Err(CommandError::TimedOut {
                    program,
                    timeout: self.timeout,
                })
            }
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    String::from_utf8_lossy(&buf).into_owned()
}

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════
