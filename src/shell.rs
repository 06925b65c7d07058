//! 命令执行器 - shell 命令与 docker CLI

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::{AgentError, Result};

/// docker CLI 允许的一级子命令
const DOCKER_SUBCOMMANDS: [&str; 16] = [
    "ps", "images", "run", "start", "stop", "restart", "rm", "rmi", "logs", "inspect", "pull",
    "exec", "container", "image", "network", "volume",
];

/// 一次命令执行的结果
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// 面向模型的文本：成功时返回stdout，失败时返回 `Error: ...`
    pub fn render(&self) -> String {
        if self.success() {
            let stdout = self.stdout.trim_end();
            if stdout.is_empty() {
                "Command completed with no output".to_string()
            } else {
                stdout.to_string()
            }
        } else {
            let detail = if self.stderr.trim().is_empty() {
                self.stdout.trim_end()
            } else {
                self.stderr.trim_end()
            };
            match self.exit_code {
                Some(code) => format!("Error (exit code {}): {}", code, detail),
                None => format!("Error (terminated by signal): {}", detail),
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShellRunner {
    base_dir: PathBuf,
    timeout: Duration,
}

impl ShellRunner {
    pub fn new(base_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            base_dir: base_dir.into(),
            timeout,
        }
    }

    async fn execute(&self, mut command: Command, shown: &str) -> Result<CommandOutput> {
        command
            .current_dir(&self.base_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(dir = %self.base_dir.display(), "running `{}`", shown);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| AgentError::Timeout {
                operation: shown.to_string(),
                seconds: self.timeout.as_secs_f64(),
            })??;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// 通过 `sh -c` 在 base_dir 中执行命令
    pub async fn run(&self, command_line: &str) -> Result<CommandOutput> {
        if command_line.trim().is_empty() {
            return Err(AgentError::InvalidInput("command must not be empty".into()));
        }
        let mut command = Command::new("sh");
        command.arg("-c").arg(command_line);
        self.execute(command, command_line).await
    }

    /// 执行 docker CLI，仅限容器、镜像、网络、数据卷相关子命令
    pub async fn docker(&self, args: &[String]) -> Result<CommandOutput> {
        let subcommand = args
            .first()
            .ok_or_else(|| AgentError::InvalidInput("docker subcommand is required".into()))?;
        if !DOCKER_SUBCOMMANDS.contains(&subcommand.as_str()) {
            return Err(AgentError::InvalidInput(format!(
                "docker subcommand `{}` is not allowed",
                subcommand
            )));
        }
        let mut command = Command::new("docker");
        command.args(args);
        self.execute(command, &format!("docker {}", args.join(" ")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn runner(dir: &TempDir) -> ShellRunner {
        ShellRunner::new(dir.path(), Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_run_captures_stdout_in_base_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();

        let output = runner(&dir).run("ls").await.unwrap();

        assert!(output.success());
        assert!(output.stdout.contains("marker.txt"));
        assert_eq!(output.render(), "marker.txt");
    }

    #[tokio::test]
    async fn test_run_reports_failures() {
        let dir = TempDir::new().unwrap();
        let output = runner(&dir).run("echo broken >&2; exit 3").await.unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.render(), "Error (exit code 3): broken");
    }

    #[tokio::test]
    async fn test_empty_command_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            runner(&dir).run("   ").await,
            Err(AgentError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_enforced() {
        let dir = TempDir::new().unwrap();
        let runner = ShellRunner::new(dir.path(), Duration::from_millis(100));
        match runner.run("sleep 5").await {
            Err(AgentError::Timeout { operation, .. }) => assert_eq!(operation, "sleep 5"),
            other => panic!("expected a timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_docker_rejects_unknown_subcommands() {
        let dir = TempDir::new().unwrap();
        let runner = runner(&dir);
        assert!(runner.docker(&[]).await.is_err());
        assert!(runner.docker(&["system".into(), "prune".into()]).await.is_err());
    }

    #[test]
    fn test_render_empty_success() {
        let output = CommandOutput {
            exit_code: Some(0),
            stdout: "\n".into(),
            stderr: String::new(),
        };
        assert_eq!(output.render(), "Command completed with no output");
    }
}
