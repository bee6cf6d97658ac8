//! External process execution

#[cfg(test)]
use mockall::automock;

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

/// A fully described external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Variables added on top of the inherited environment
    pub envs: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Human readable command line, used in logs and error messages
    pub fn display(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `-1` when the process was killed by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external commands to completion
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the command and captures its output. A non-zero exit code is not an
    /// error at this level; only failing to start the process is.
    async fn run(&self, command: &CommandSpec) -> std::io::Result<CommandOutput>;
}

/// Runs commands as child processes of the current one
#[derive(Debug, Default)]
pub struct SystemCommandRunner;

#[async_trait::async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, command: &CommandSpec) -> std::io::Result<CommandOutput> {
        debug!("Executing: {}", command.display());

        let output = Command::new(&command.program)
            .args(&command.args)
            .envs(command.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let result = CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        for line in result.stdout.lines() {
            info!("{}", line);
        }
        debug!("{} exited with code {}", command.display(), result.exit_code);

        Ok(result)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_arguments() {
        let spec = CommandSpec::new("/usr/bin/dotnet").args(["nuget", "locals"]);

        assert_eq!(spec.display(), "/usr/bin/dotnet nuget locals");
    }

    #[tokio::test]
    async fn system_runner_captures_output_and_exit_code() {
        let spec = CommandSpec::new("sh")
            .args(["-c", "echo \"$GREETING\"; echo oops >&2; exit 3"])
            .env("GREETING", "hello");

        let output = SystemCommandRunner.run(&spec).await.unwrap();

        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stderr, "oops\n");
        assert!(!output.success());
    }

    #[tokio::test]
    async fn system_runner_fails_for_missing_program() {
        let spec = CommandSpec::new("/nonexistent/definitely-not-here");

        let result = SystemCommandRunner.run(&spec).await;

        assert_eq!(result.unwrap_err().kind(), std::io::ErrorKind::NotFound);
    }
}
