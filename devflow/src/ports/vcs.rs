//! Git integration over the shell port.

use super::{ShellRunner, VersionControl};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Commits and pushes with the `git` CLI.
pub struct GitVersionControl {
    shell: Arc<dyn ShellRunner>,
}

impl std::fmt::Debug for GitVersionControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitVersionControl").finish_non_exhaustive()
    }
}

impl GitVersionControl {
    /// Creates a git collaborator that runs commands through `shell`.
    #[must_use]
    pub fn new(shell: Arc<dyn ShellRunner>) -> Self {
        Self { shell }
    }
}

#[async_trait]
impl VersionControl for GitVersionControl {
    async fn commit_and_push(&self, message: &str) -> bool {
        let status = self.shell.run("git status").await;
        if !status.success {
            warn!("No git repository found, skipping push");
            return true;
        }

        let add = self.shell.run("git add .").await;
        if !add.success {
            debug!(output = %add.output, "git add reported a failure");
        }

        let commit = self
            .shell
            .run(&format!("git commit -m {}", shell_quote(message)))
            .await;
        if !commit.success {
            debug!(output = %commit.output, "git commit reported a failure");
        }

        let push = self.shell.run("git push").await;
        if push.success {
            info!(message, "Code pushed to repository successfully");
        } else {
            warn!(output = %push.output, "Git push failed");
        }
        push.success
    }
}

/// Version control for runs started with git disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledVersionControl;

#[async_trait]
impl VersionControl for DisabledVersionControl {
    async fn commit_and_push(&self, message: &str) -> bool {
        debug!(message, "Version control disabled, skipping push");
        true
    }
}

/// Quotes `arg` for POSIX `sh`.
///
/// ```
/// use devflow::ports::shell_quote;
///
/// assert_eq!(shell_quote("it's"), r#"'it'\''s'"#);
/// ```
#[must_use]
pub fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::super::{CommandOutput, MockShellRunner};
    use super::*;
    use mockall::predicate::eq;
    use mockall::Sequence;

    #[tokio::test]
    async fn test_missing_repository_is_a_successful_skip() {
        let mut shell = MockShellRunner::new();
        shell
            .expect_run()
            .with(eq("git status"))
            .times(1)
            .returning(|_| CommandOutput::failed("fatal: not a git repository"));

        let vcs = GitVersionControl::new(Arc::new(shell));
        assert!(vcs.commit_and_push("Implement phase").await);
    }

    #[tokio::test]
    async fn test_commit_sequence() {
        let mut seq = Sequence::new();
        let mut shell = MockShellRunner::new();
        for command in [
            "git status",
            "git add .",
            "git commit -m 'Implement Core'",
            "git push",
        ] {
            shell
                .expect_run()
                .with(eq(command))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| CommandOutput::ok(""));
        }

        let vcs = GitVersionControl::new(Arc::new(shell));
        assert!(vcs.commit_and_push("Implement Core").await);
    }

    #[tokio::test]
    async fn test_push_failure_is_reported_not_raised() {
        let mut shell = MockShellRunner::new();
        shell
            .expect_run()
            .withf(|cmd| cmd != "git push")
            .returning(|_| CommandOutput::ok(""));
        shell
            .expect_run()
            .with(eq("git push"))
            .returning(|_| CommandOutput::failed("rejected"));

        let vcs = GitVersionControl::new(Arc::new(shell));
        assert!(!vcs.commit_and_push("docs").await);
    }

    #[tokio::test]
    async fn test_disabled_always_succeeds() {
        assert!(DisabledVersionControl.commit_and_push("anything").await);
    }

    #[test]
    fn test_shell_quote_plain() {
        assert_eq!(shell_quote("Add docs"), "'Add docs'");
    }
}
