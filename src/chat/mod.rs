//! 开发者命令行助手：逐行读取输入，附带工作目录与最近历史转发给带工具的Agent

use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::llm::{ModelGateway, Toolset};
use crate::session::{SessionStore, SessionTurn};

const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "bye"];

const ASSISTANT_SYSTEM_PROMPT: &str = r#"You are a Linux administration and development assistant running inside the user's terminal.
You can read and write files, run shell commands and manage Docker containers, images, networks and volumes through your tools.
All relative paths are resolved against the current working directory given with each message.
Inspect before you change anything, prefer the least destructive command that does the job, and never delete files or directories unless the user explicitly asks for it.
Report what you did and the relevant output concisely in markdown."#;

/// 控制指令：exit / quit / bye，忽略大小写与首尾空白
pub fn is_exit_command(line: &str) -> bool {
    let trimmed = line.trim();
    EXIT_COMMANDS
        .iter()
        .any(|command| trimmed.eq_ignore_ascii_case(command))
}

/// 工作目录：显式参数优先，其次 ORIGINAL_PWD，最后是进程当前目录
pub fn resolve_working_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os("ORIGINAL_PWD").map(PathBuf::from))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn context_message(working_dir: &Path, message: &str) -> String {
    format!(
        "Current working directory: {}\n\nUser message: {}",
        working_dir.display(),
        message
    )
}

fn render_history(turns: &[SessionTurn]) -> String {
    let mut history = String::from("Previous conversation:\n");
    for turn in turns {
        history.push_str(&format!(
            "User: {}\nAssistant: {}\n",
            turn.user_message, turn.agent_response
        ));
    }
    history
}

/// 会话持久化所需的标识
pub struct SessionBinding<'a> {
    pub store: &'a SessionStore,
    pub user_id: String,
    pub session_id: String,
}

/// 一次对话循环的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub answered: usize,
    pub failed: usize,
}

/// 交互式对话循环
pub struct ChatLoop<'a, G: ModelGateway> {
    gateway: &'a G,
    working_dir: PathBuf,
    history_turns: usize,
    session: Option<SessionBinding<'a>>,
}

impl<'a, G: ModelGateway> ChatLoop<'a, G> {
    pub fn new(gateway: &'a G, working_dir: PathBuf) -> Self {
        Self {
            gateway,
            working_dir,
            history_turns: 0,
            session: None,
        }
    }

    /// 绑定会话存储；history_turns 轮最近对话会随每条消息一并发送
    pub fn with_session(mut self, session: SessionBinding<'a>, history_turns: usize) -> Self {
        self.session = Some(session);
        self.history_turns = history_turns;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn build_message(&self, message: &str) -> String {
        let context = context_message(&self.working_dir, message);
        let Some(session) = &self.session else {
            return context;
        };

        match session
            .store
            .recent_turns(&session.session_id, self.history_turns)
        {
            Ok(turns) if !turns.is_empty() => format!("{}\n{}", render_history(&turns), context),
            Ok(_) => context,
            Err(e) => {
                tracing::warn!("failed to load chat history: {}", e);
                context
            }
        }
    }

    fn record(&self, message: &str, response: &str) {
        if let Some(session) = &self.session {
            if let Err(e) =
                session
                    .store
                    .append(&session.session_id, &session.user_id, message, response)
            {
                tracing::warn!("failed to persist chat turn: {}", e);
            }
        }
    }

    /// 读取输入直到退出指令或EOF；单条消息失败只打印错误，不终止循环
    pub async fn run<R, W>(&self, input: R, output: &mut W) -> Result<ChatSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut summary = ChatSummary::default();

        loop {
            output.write_all(b"You> ").await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                output.write_all("\n👋 Goodbye!\n".as_bytes()).await?;
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            if is_exit_command(&line) {
                output.write_all("👋 Goodbye!\n".as_bytes()).await?;
                break;
            }

            output.write_all("🤔 Agent thinking...\n".as_bytes()).await?;
            let message = self.build_message(&line);
            let toolset = Toolset::Workspace {
                base_dir: self.working_dir.clone(),
            };

            match self
                .gateway
                .prompt_with_tools(ASSISTANT_SYSTEM_PROMPT, &message, toolset)
                .await
            {
                Ok(response) => {
                    output
                        .write_all(format!("{}\n\n", response.trim_end()).as_bytes())
                        .await?;
                    self.record(&line, &response);
                    summary.answered += 1;
                }
                Err(e) => {
                    tracing::error!("agent call failed: {}", e);
                    output
                        .write_all(format!("❌ Agent error: {}\n\n", e).as_bytes())
                        .await?;
                    summary.failed += 1;
                }
            }
            output.flush().await?;
        }

        output.flush().await?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests;
