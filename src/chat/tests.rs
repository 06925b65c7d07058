use super::*;
use crate::error::AgentError;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// 回显网关：消息中含 "fail" 时返回错误
#[derive(Default)]
struct EchoGateway {
    received: Mutex<Vec<(String, Toolset)>>,
}

#[async_trait]
impl ModelGateway for EchoGateway {
    async fn extract<T>(&self, _system_prompt: &str, _user_prompt: &str) -> Result<T>
    where
        T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
    {
        Err(AgentError::Generation("not scripted".into()))
    }

    async fn prompt(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        Err(AgentError::Generation("not scripted".into()))
    }

    async fn prompt_with_tools(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
        toolset: Toolset,
    ) -> Result<String> {
        self.received
            .lock()
            .unwrap()
            .push((user_prompt.to_string(), toolset));
        let message = user_prompt
            .rsplit("User message: ")
            .next()
            .unwrap_or_default()
            .to_string();
        if message.contains("fail") {
            return Err(AgentError::Generation("model unavailable".into()));
        }
        Ok(format!("echo: {}", message))
    }
}

impl EchoGateway {
    fn messages(&self) -> Vec<String> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|(message, _)| message.clone())
            .collect()
    }
}

#[test]
fn test_exit_commands() {
    for line in ["exit", "QUIT", "  Bye  ", "Exit\n"] {
        assert!(is_exit_command(line), "{line:?}");
    }
    for line in ["exit now", "goodbye", "", "q"] {
        assert!(!is_exit_command(line), "{line:?}");
    }
}

#[test]
fn test_context_message_format() {
    assert_eq!(
        context_message(Path::new("/srv/app"), "list files"),
        "Current working directory: /srv/app\n\nUser message: list files"
    );
}

#[test]
fn test_explicit_dir_wins() {
    assert_eq!(
        resolve_working_dir(Some(PathBuf::from("/tmp/project"))),
        PathBuf::from("/tmp/project")
    );
}

#[tokio::test]
async fn test_loop_forwards_messages_and_stops_on_exit() {
    let gateway = EchoGateway::default();
    let chat = ChatLoop::new(&gateway, PathBuf::from("/work"));
    let input: &[u8] = b"list files\n\n   \nshow disk usage\nexit\nnever sent\n";
    let mut output: Vec<u8> = Vec::new();

    let summary = chat.run(input, &mut output).await.unwrap();

    assert_eq!(summary, ChatSummary { answered: 2, failed: 0 });
    assert_eq!(
        gateway.messages(),
        vec![
            "Current working directory: /work\n\nUser message: list files",
            "Current working directory: /work\n\nUser message: show disk usage",
        ]
    );
    let rendered = String::from_utf8(output).unwrap();
    assert!(rendered.contains("echo: show disk usage"));
    assert!(rendered.contains("Goodbye"));
}

#[tokio::test]
async fn test_workspace_toolset_rooted_at_working_dir() {
    let gateway = EchoGateway::default();
    let chat = ChatLoop::new(&gateway, PathBuf::from("/work"));
    let input: &[u8] = b"pwd\n";
    chat.run(input, &mut Vec::<u8>::new()).await.unwrap();

    let received = gateway.received.lock().unwrap();
    assert_eq!(
        received[0].1,
        Toolset::Workspace {
            base_dir: PathBuf::from("/work")
        }
    );
}

#[tokio::test]
async fn test_agent_error_does_not_end_loop() {
    let gateway = EchoGateway::default();
    let chat = ChatLoop::new(&gateway, PathBuf::from("/work"));
    let input: &[u8] = b"please fail\nstill here\n";
    let mut output: Vec<u8> = Vec::new();

    // EOF 结束循环
    let summary = chat.run(input, &mut output).await.unwrap();

    assert_eq!(summary, ChatSummary { answered: 1, failed: 1 });
    let rendered = String::from_utf8(output).unwrap();
    assert!(rendered.contains("❌ Agent error"));
    assert!(rendered.contains("echo: still here"));
}

#[tokio::test]
async fn test_session_history_and_persistence() {
    let store = SessionStore::in_memory().unwrap();
    let gateway = EchoGateway::default();
    let chat = ChatLoop::new(&gateway, PathBuf::from("/work")).with_session(
        SessionBinding {
            store: &store,
            user_id: "alice".into(),
            session_id: "s1".into(),
        },
        1,
    );

    let input: &[u8] = b"first\nsecond\nthird\nbye\n";
    chat.run(input, &mut Vec::<u8>::new()).await.unwrap();

    let turns = store.read_sessions(Some("s1"), Some("alice")).unwrap();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[2].agent_response, "echo: third");

    let messages = gateway.messages();
    assert!(!messages[0].contains("Previous conversation"));
    // 只携带最近一轮
    assert!(messages[2].contains("User: second\nAssistant: echo: second"));
    assert!(!messages[2].contains("User: first"));
}

#[tokio::test]
async fn test_failed_turns_are_not_persisted() {
    let store = SessionStore::in_memory().unwrap();
    let gateway = EchoGateway::default();
    let chat = ChatLoop::new(&gateway, PathBuf::from("/work")).with_session(
        SessionBinding {
            store: &store,
            user_id: "alice".into(),
            session_id: "s1".into(),
        },
        3,
    );

    let input: &[u8] = b"fail please\n";
    chat.run(input, &mut Vec::<u8>::new()).await.unwrap();
    assert!(store.read_all().unwrap().is_empty());
}
