use agent_lab::assistants::{Assistant, Persona};
use agent_lab::chat::{ChatLoop, SessionBinding};
use agent_lab::config::DnsConfig;
use agent_lab::dns::{DnsLookup, DnsRecord, DomainToolkit, LookupFailure, RecordKind, Verdict};
use agent_lab::files::FileToolkit;
use agent_lab::llm::tools::files::{AgentToolFiles, FilesArgs};
use agent_lab::session::SessionStore;
use agent_lab::{AgentError, IdeaPipeline, ModelGateway, Result, Toolset};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// 不联网的网关：结构化提取按类型名返回固定数据，工具对话回显最后一行
#[derive(Default)]
struct OfflineGateway {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ModelGateway for OfflineGateway {
    async fn extract<T>(&self, _system_prompt: &str, user_prompt: &str) -> Result<T>
    where
        T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
    {
        self.prompts.lock().unwrap().push(user_prompt.to_string());
        let value = match std::any::type_name::<T>().rsplit("::").next() {
            Some("IdeaClarification") => serde_json::json!({
                "originality": "Crowded craft market, novel curation angle",
                "mission": "Make handmade leather ornaments easy to discover",
                "objectives": "Reach 1,000 monthly buyers",
                "current_date": ""
            }),
            Some("MarketResearch") => serde_json::json!({
                "total_addressable_market": "$2.1B",
                "serviceable_available_market": "$300M",
                "serviceable_obtainable_market": "$4M",
                "target_customer_segments": "Holiday gift shoppers"
            }),
            other => {
                return Err(AgentError::Generation(format!(
                    "no fixture for {:?}",
                    other
                )));
            }
        };
        Ok(serde_json::from_value(value)?)
    }

    async fn prompt(&self, _system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(user_prompt.to_string());
        Ok("Final report: proceed with a pilot.".to_string())
    }

    async fn prompt_with_tools(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
        toolset: Toolset,
    ) -> Result<String> {
        self.prompts.lock().unwrap().push(user_prompt.to_string());
        let last_line = user_prompt.lines().last().unwrap_or_default();
        Ok(format!("[{:?}] {}", toolset, last_line))
    }
}

#[tokio::test]
async fn test_idea_pipeline_end_to_end() {
    let pipeline = IdeaPipeline::new(OfflineGateway::default());
    let (state, timing) = pipeline
        .run("A marketplace for handmade leather ornaments")
        .await
        .unwrap();

    assert!(state.is_complete());
    assert!(!state.clarification.unwrap().current_date.is_empty());
    assert!(state.competitor_analysis.unwrap().starts_with("[Research]"));
    assert_eq!(
        state.final_report.as_deref(),
        Some("Final report: proceed with a pilot.")
    );
    assert!(timing.generate_timing_report().contains("report_generator"));

    let prompts = pipeline.gateway().prompts.lock().unwrap().clone();
    let report_prompt = prompts.last().unwrap();
    assert!(report_prompt.contains("competitor_analysis_report:\n[Research]"));
}

#[tokio::test]
async fn test_chat_session_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let db_file = temp_dir.path().join("tmp").join("agent_sessions.db");
    let gateway = OfflineGateway::default();

    {
        let store = SessionStore::open(&db_file).unwrap();
        let chat = ChatLoop::new(&gateway, temp_dir.path().to_path_buf()).with_session(
            SessionBinding {
                store: &store,
                user_id: "alice".into(),
                session_id: "s1".into(),
            },
            3,
        );
        let input: &[u8] = b"list the files\nquit\n";
        let summary = chat.run(input, &mut Vec::<u8>::new()).await.unwrap();
        assert_eq!(summary.answered, 1);
    }

    let store = SessionStore::open(&db_file).unwrap();
    assert_eq!(
        store.last_session_id_by_user("alice").unwrap().as_deref(),
        Some("s1")
    );
    let turns = store.recent_turns("s1", 3).unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].user_message, "list the files");
    assert!(turns[0].agent_response.contains("User message: list the files"));
}

#[test]
fn test_file_tool_dispatch_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let tool = AgentToolFiles::new(FileToolkit::new(temp_dir.path().to_path_buf()));

    let saved = tool
        .dispatch(&FilesArgs {
            action: "save_file".into(),
            file_name: Some("notes/todo.md".into()),
            contents: Some("- ship it".into()),
            ..Default::default()
        })
        .unwrap();
    assert!(!saved.starts_with("Error"));

    let read = tool
        .dispatch(&FilesArgs {
            action: "read_file".into(),
            file_name: Some("notes/todo.md".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(read, "- ship it");

    let missing = tool
        .dispatch(&FilesArgs {
            action: "read_file".into(),
            file_name: Some("nope.md".into()),
            ..Default::default()
        })
        .unwrap();
    assert!(missing.starts_with("Error reading file"));
}

/// 所有查询都返回 NXDOMAIN 的解析器
struct NxResolver;

#[async_trait]
impl DnsLookup for NxResolver {
    async fn lookup(
        &self,
        _domain: &str,
        _kind: RecordKind,
    ) -> std::result::Result<Vec<DnsRecord>, LookupFailure> {
        Err(LookupFailure::NxDomain)
    }

    async fn reverse(&self, _ip: IpAddr) -> std::result::Result<Vec<String>, LookupFailure> {
        Err(LookupFailure::NxDomain)
    }
}

#[tokio::test]
async fn test_quick_scan_unregistered_domain_is_stable() {
    let toolkit = DomainToolkit::with_resolver(Arc::new(NxResolver), &DnsConfig::default());

    let first = toolkit.quick_scan("Does-Not-Exist.example.").await;
    let second = toolkit.quick_scan("does-not-exist.example").await;

    assert_eq!(first.verdict(), Verdict::Unregistered);
    assert_eq!(first.domain, "does-not-exist.example");
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_workspace_toolset_is_comparable() {
    let a = Toolset::Workspace {
        base_dir: PathBuf::from("/srv"),
    };
    assert_eq!(a.clone(), a);
    assert_ne!(a, Toolset::Research);
}

#[tokio::test]
async fn test_pubmed_assistant_routes_through_pubmed_tools() {
    let assistant = Assistant::new(OfflineGateway::default(), Persona::PubMed);

    let answer = assistant
        .ask("What helps with migraine prevention?")
        .await
        .unwrap();

    assert_eq!(answer, "[PubMed] What helps with migraine prevention?");
}
