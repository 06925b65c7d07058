//! shell 与 docker 工具

use rig::tool::Tool;
use serde::Deserialize;

use super::ToolActivity;
use crate::shell::ShellRunner;

#[derive(Debug, Clone)]
pub struct AgentToolShell {
    runner: ShellRunner,
    activity: ToolActivity,
}

#[derive(Debug, Clone)]
pub struct AgentToolDocker {
    runner: ShellRunner,
    activity: ToolActivity,
}

#[derive(Debug, Deserialize)]
pub struct ShellArgs {
    pub command: String,
}

#[derive(Debug, Deserialize)]
pub struct DockerArgs {
    pub args: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("command tool error: {0}")]
pub struct CommandToolError(String);

impl AgentToolShell {
    pub fn new(runner: ShellRunner) -> Self {
        Self {
            runner,
            activity: ToolActivity::default(),
        }
    }

    pub fn with_activity(mut self, activity: ToolActivity) -> Self {
        self.activity = activity;
        self
    }
}

impl AgentToolDocker {
    pub fn new(runner: ShellRunner) -> Self {
        Self {
            runner,
            activity: ToolActivity::default(),
        }
    }

    pub fn with_activity(mut self, activity: ToolActivity) -> Self {
        self.activity = activity;
        self
    }
}

impl Tool for AgentToolShell {
    const NAME: &'static str = "run_shell_command";

    type Error = CommandToolError;
    type Args = ShellArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Run a shell command (sh -c) in the current working directory and return its output. Non-zero exit codes are reported as errors with stderr.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "command": { "type": "string", "description": "the command line to execute" }
                },
                "required": ["command"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...run_shell_command@{}", args.command);
        self.activity.record();
        match self.runner.run(&args.command).await {
            Ok(output) => Ok(output.render()),
            Err(e) => Err(CommandToolError(e.to_string())),
        }
    }
}

impl Tool for AgentToolDocker {
    const NAME: &'static str = "docker";

    type Error = CommandToolError;
    type Args = DockerArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Manage docker containers, images, networks and volumes by running the docker CLI, e.g. [\"ps\", \"-a\"] or [\"network\", \"ls\"].".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "args": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "arguments passed to the docker CLI; the first one is the subcommand"
                    }
                },
                "required": ["args"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...docker@{:?}", args.args);
        self.activity.record();
        match self.runner.docker(&args.args).await {
            Ok(output) => Ok(output.render()),
            Err(e) => Err(CommandToolError(e.to_string())),
        }
    }
}
