//! Shell command execution.

use super::ShellRunner;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Outcome of a shell command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Whether the command exited with status zero.
    pub success: bool,
    /// Stdout followed by stderr.
    pub output: String,
}

impl CommandOutput {
    /// A successful result with the given output.
    #[must_use]
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    /// A failed result with the given output.
    #[must_use]
    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// Runs commands through `sh -c`.
#[derive(Debug, Clone, Default)]
pub struct SystemShell {
    working_dir: Option<PathBuf>,
}

impl SystemShell {
    /// Creates a shell running in the process working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs commands inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: Some(dir.into()),
        }
    }
}

#[async_trait]
impl ShellRunner for SystemShell {
    async fn run(&self, command: &str) -> CommandOutput {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c").arg(command);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        match cmd.output().await {
            Ok(out) => {
                let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
                output.push_str(&String::from_utf8_lossy(&out.stderr));
                debug!(command, status = ?out.status.code(), "Shell command finished");
                CommandOutput {
                    success: out.status.success(),
                    output,
                }
            }
            Err(e) => CommandOutput::failed(e.to_string()),
        }
    }
}
