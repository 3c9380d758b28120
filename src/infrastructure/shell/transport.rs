use async_trait::async_trait;
use std::borrow::Cow;
use std::process::Output;
use tokio::process::Command;

use super::parse::parse_snapshot;
use crate::domain::errors::{MutationError, TransportError};
use crate::domain::models::{MutationTarget, StateSnapshot};
use crate::domain::ports::{DiagnosticRunner, MutationApplier, SnapshotSource};

/// Transport that reaches the system under test through shell commands.
///
/// Every call spawns `<shell> -c <command>` and waits for it to exit; the
/// child is killed if the calling future is dropped (for example when the
/// background reporter is cancelled mid-command).
#[derive(Debug, Clone)]
pub struct ShellTransport {
    /// Shell used to run every command.
    shell: String,
    /// Snapshot command template; `{selector}` is replaced by the scenario selector.
    snapshot_command: String,
}

impl ShellTransport {
    /// Create a transport running commands through `sh`.
    pub fn new(snapshot_command: impl Into<String>) -> Self {
        Self::with_shell("sh", snapshot_command)
    }

    /// Create a transport running commands through a specific shell.
    pub fn with_shell(shell: impl Into<String>, snapshot_command: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            snapshot_command: snapshot_command.into(),
        }
    }

    /// Snapshot command template.
    pub fn snapshot_command(&self) -> &str {
        &self.snapshot_command
    }

    /// Render a mutation command for `target`.
    ///
    /// The substituted id or scope is shell-quoted when it contains anything
    /// beyond plain word characters; templates must not quote placeholders.
    pub fn render_change(target: &MutationTarget, change: &str) -> String {
        match target {
            MutationTarget::Entity(id) => change.replace("{entity}", &quote(id.as_str())),
            MutationTarget::Scope(name) => change.replace("{scope}", &quote(name)),
        }
    }

    /// Render the snapshot command for `selector`, shell-quoted the same way.
    pub fn render_snapshot(&self, selector: &str) -> String {
        self.snapshot_command.replace("{selector}", &quote(selector))
    }

    async fn run(&self, command: &str) -> Result<Output, TransportError> {
        tracing::debug!(shell = %self.shell, command = %command, "Running shell command");

        Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                tracing::error!(command = %command, error = %e, "Failed to spawn shell command");
                TransportError::Unreachable {
                    command: command.to_string(),
                    reason: e.to_string(),
                }
            })
    }

    async fn run_checked(&self, command: &str) -> Result<String, TransportError> {
        let output = self.run(command).await?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(command_failed(command, &output))
        }
    }
}

fn quote(value: &str) -> Cow<'_, str> {
    shell_escape::unix::escape(Cow::Borrowed(value))
}

fn command_failed(command: &str, output: &Output) -> TransportError {
    TransportError::CommandFailed {
        command: command.to_string(),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

#[async_trait]
impl SnapshotSource for ShellTransport {
    async fn fetch_snapshot(&self, selector: &str) -> Result<StateSnapshot, TransportError> {
        let command = self.render_snapshot(selector);
        let stdout = self.run_checked(&command).await?;
        parse_snapshot(&stdout)
    }
}

#[async_trait]
impl MutationApplier for ShellTransport {
    async fn apply_mutation(
        &self,
        target: &MutationTarget,
        change: &str,
    ) -> Result<(), MutationError> {
        let command = Self::render_change(target, change);
        let output = self.run(&command).await?;

        if output.status.success() {
            tracing::info!(mutation_target = %target, command = %command, "Mutation accepted");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(mutation_target = %target, command = %command, stderr = %stderr, "Mutation rejected");
            Err(MutationError::Rejected {
                target: target.clone(),
                reason: format!("{}: {stderr}", output.status),
            })
        }
    }
}

#[async_trait]
impl DiagnosticRunner for ShellTransport {
    async fn run_diagnostic(&self, command: &str) -> Result<String, TransportError> {
        self.run_checked(command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_change_entity() {
        let command = ShellTransport::render_change(
            &MutationTarget::Entity("pod1".into()),
            "kubectl label pod/{entity} foo=bar",
        );
        assert_eq!(command, "kubectl label pod/pod1 foo=bar");
    }

    #[test]
    fn test_render_change_scope() {
        let command = ShellTransport::render_change(
            &MutationTarget::Scope("default".to_string()),
            "kubectl label ns/{scope} foo=bar",
        );
        assert_eq!(command, "kubectl label ns/default foo=bar");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_snapshot_parses_stdout() {
        let transport = ShellTransport::new("printf 'pod1 id-a\\npod2 {selector}\\n'");
        let snapshot = transport.fetch_snapshot("id-b").await.expect("fetch");
        assert_eq!(snapshot.get(&"pod1".into()), Some("id-a"));
        assert_eq!(snapshot.get(&"pod2".into()), Some("id-b"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_snapshot_command() {
        let transport = ShellTransport::new("echo boom >&2; exit 3");
        match transport.fetch_snapshot("all").await {
            Err(TransportError::CommandFailed { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("Expected CommandFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rejected_mutation() {
        let transport = ShellTransport::new("true");
        let result = transport
            .apply_mutation(&MutationTarget::Scope("default".to_string()), "exit 1")
            .await;
        assert!(matches!(result, Err(MutationError::Rejected { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_shell_is_unreachable() {
        let transport = ShellTransport::with_shell("/nonexistent/shell", "true");
        let result = transport.run_diagnostic("uptime").await;
        assert!(matches!(result, Err(TransportError::Unreachable { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_diagnostic_returns_stdout() {
        let transport = ShellTransport::new("true");
        let output = transport.run_diagnostic("echo up").await.expect("run");
        assert_eq!(output, "up\n");
    }

    #[test]
    fn test_render_change_quotes_unsafe_entity() {
        let command = ShellTransport::render_change(
            &MutationTarget::Entity("pod1; touch /tmp/pwned".into()),
            "kubectl label pod/{entity} foo=bar",
        );
        assert_eq!(command, "kubectl label pod/'pod1; touch /tmp/pwned' foo=bar");
    }

    #[test]
    fn test_render_snapshot_quotes_selector() {
        let transport = ShellTransport::new("kubectl get pods -l {selector}");
        assert_eq!(
            transport.render_snapshot("app=web"),
            "kubectl get pods -l app=web"
        );
        assert_eq!(
            transport.render_snapshot("app in (web, api)"),
            "kubectl get pods -l 'app in (web, api)'"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_selector_is_not_interpreted_by_shell() {
        let transport = ShellTransport::new("printf '%s\\n' {selector}");
        let snapshot = transport
            .fetch_snapshot("$(echo injected)")
            .await
            .expect("fetch");
        assert_eq!(snapshot.get(&"$(echo".into()), Some("injected)"));
        assert!(!snapshot.contains(&"injected".into()));
    }
}
