use std::process::Stdio;

use async_trait::async_trait;
use branch_pipeline_core::command::CommandSpec;
use branch_pipeline_core::contract::SIGNAL_EXIT_CODE;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// `None` when the child was terminated by a signal.
    pub code: Option<i32>,
    pub stdout_lines: usize,
    pub stderr_lines: usize,
}

impl ExitOutcome {
    pub fn exit_code(&self) -> i32 {
        self.code.unwrap_or(SIGNAL_EXIT_CODE)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    #[error("failed to spawn '{program}': {message}")]
    Spawn { program: String, message: String },

    #[error("failed to wait for '{program}': {message}")]
    Wait { program: String, message: String },
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CommandSpec) -> Result<ExitOutcome, RunError>;
}

pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, command: &CommandSpec) -> Result<ExitOutcome, RunError> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .envs(command.env.iter().map(|(key, value)| (key, value)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|error| RunError::Spawn {
                program: command.program.clone(),
                message: error.to_string(),
            })?;

        tracing::info!(
            component = "child_process",
            event = "spawned",
            program = %command.program,
            pid = child.id()
        );

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (stdout_lines, stderr_lines) = tokio::join!(
            drain_lines(stdout, "stdout"),
            drain_lines(stderr, "stderr")
        );

        let status = child.wait().await.map_err(|error| RunError::Wait {
            program: command.program.clone(),
            message: error.to_string(),
        })?;

        tracing::info!(
            component = "child_process",
            event = "exited",
            code = status.code(),
            stdout_lines,
            stderr_lines
        );

        Ok(ExitOutcome {
            code: status.code(),
            stdout_lines,
            stderr_lines,
        })
    }
}

async fn drain_lines<R>(reader: Option<R>, stream: &'static str) -> usize
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return 0;
    };

    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();
    let mut lines = 0usize;
    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buffer);
                tracing::info!(
                    component = "child_process",
                    stream,
                    line = %line.trim_end_matches(['\r', '\n'])
                );
                lines += 1;
            }
            Err(error) => {
                tracing::warn!(
                    component = "child_process",
                    stream,
                    error = %error,
                    "stopped reading child output"
                );
                break;
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use super::*;

    const FLOOD_LINES: usize = 20_000;

    async fn run_within_deadline(script: &str) -> ExitOutcome {
        let command = CommandSpec::shell(script, Path::new("/tmp"));
        tokio::time::timeout(Duration::from_secs(30), TokioCommandRunner.run(&command))
            .await
            .expect("child output should be drained without blocking")
            .expect("sh should spawn")
    }

    #[tokio::test]
    async fn streams_both_outputs_and_reports_exit_code() {
        let command = CommandSpec::shell(
            "echo first; echo second; echo oops >&2; exit 3",
            Path::new("/tmp"),
        );

        let outcome = TokioCommandRunner
            .run(&command)
            .await
            .expect("sh should spawn");

        assert_eq!(outcome.code, Some(3));
        assert_eq!(outcome.exit_code(), 3);
        assert_eq!(outcome.stdout_lines, 2);
        assert_eq!(outcome.stderr_lines, 1);
    }

    #[tokio::test]
    async fn passes_home_to_the_child() {
        let command = CommandSpec::shell(
            r#"test "$HOME" = /scratch-home"#,
            Path::new("/scratch-home"),
        );

        let outcome = TokioCommandRunner
            .run(&command)
            .await
            .expect("sh should spawn");

        assert_eq!(outcome.exit_code(), 0);
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let command = CommandSpec {
            program: "definitely-not-a-real-deploy-cli".to_string(),
            args: Vec::new(),
            env: Vec::new(),
        };

        let error = TokioCommandRunner
            .run(&command)
            .await
            .expect_err("spawn should fail");
        match error {
            RunError::Spawn { program, .. } => {
                assert_eq!(program, "definitely-not-a-real-deploy-cli")
            }
            other => panic!("expected a spawn error, got {other:?}"),
        }
    }

    #[test]
    fn signal_termination_maps_to_sentinel_code() {
        let outcome = ExitOutcome {
            code: None,
            stdout_lines: 0,
            stderr_lines: 0,
        };
        assert_eq!(outcome.exit_code(), SIGNAL_EXIT_CODE);
    }

    #[tokio::test]
    async fn large_stderr_before_stdout_does_not_block() {
        let script = format!(
            "yes 'stderr filler line' | head -n {FLOOD_LINES} >&2; echo done"
        );

        let outcome = run_within_deadline(&script).await;

        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(outcome.stderr_lines, FLOOD_LINES);
        assert_eq!(outcome.stdout_lines, 1);
    }

    #[tokio::test]
    async fn large_stdout_before_stderr_does_not_block() {
        let script = format!(
            "yes 'stdout filler line' | head -n {FLOOD_LINES}; echo done >&2"
        );

        let outcome = run_within_deadline(&script).await;

        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(outcome.stdout_lines, FLOOD_LINES);
        assert_eq!(outcome.stderr_lines, 1);
    }
}
