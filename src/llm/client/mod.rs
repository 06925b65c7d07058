//! LLM客户端 - 提供统一的LLM服务接口

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    cache::CacheManager,
    config::Config,
    dns::DomainToolkit,
    error::{AgentError, Result},
    files::FileToolkit,
    hackernews::HackerNewsClient,
    llm::{
        gateway::{ModelGateway, Toolset},
        tools::{
            domain::AgentToolDomain,
            files::AgentToolFiles,
            hackernews::AgentToolHackerNews,
            pubmed::AgentToolPubMed,
            ToolActivity,
            shell::{AgentToolDocker, AgentToolShell},
            web_search::AgentToolWebSearch,
        },
    },
    pubmed::PubMedClient,
    shell::ShellRunner,
};

mod providers;
mod react;
mod react_executor;
pub mod retry;
pub mod utils;

pub use react::{ReActConfig, ReActResponse};
pub use retry::{RetryPolicy, retry_before_side_effects, retry_with_backoff};

use providers::{AgentTools, ProviderClient};
use react_executor::ReActExecutor;
use utils::evaluate_befitting_model;

const EXTRACT_CACHE: &str = "extract";
const PROMPT_CACHE: &str = "prompt";

/// LLM客户端 - 提供统一的LLM服务接口
#[derive(Clone)]
pub struct LLMClient {
    config: Config,
    client: ProviderClient,
    cache: Arc<CacheManager>,
    retry: RetryPolicy,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = ProviderClient::new(&config.llm)?;
        let cache = Arc::new(CacheManager::new(config.cache.clone()));
        let retry = RetryPolicy::from(&config.llm);
        Ok(Self {
            client,
            cache,
            retry,
            config,
        })
    }

    /// 检查模型连接和功能是否正常
    pub async fn check_connection(&self) -> Result<()> {
        println!("🔄 正在检查模型连接...");
        let agent = self.client.create_agent(
            &self.config.llm.model_efficient,
            "You are a helpful assistant.",
            &self.config.llm,
        );
        match retry_with_backoff(&self.retry, || agent.prompt("Hello")).await {
            Ok(_) => {
                println!("✅ 模型连接正常");
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ 模型连接失败: {}", e);
                Err(e)
            }
        }
    }

    fn react_config(&self) -> ReActConfig {
        ReActConfig {
            max_iterations: self.config.llm.max_iterations,
            verbose: self.config.verbose,
            return_partial_on_max_depth: true,
        }
    }

    /// 按工具组合装配Agent工具；带副作用的工具共享同一个调用计数
    fn build_tools(&self, toolset: &Toolset, activity: &ToolActivity) -> AgentTools {
        let web_search = || Some(AgentToolWebSearch::new(self.config.search.clone()));
        match toolset {
            Toolset::Research => AgentTools {
                web_search: web_search(),
                ..AgentTools::default()
            },
            Toolset::DomainScan => AgentTools {
                web_search: web_search(),
                domain: Some(AgentToolDomain::new(DomainToolkit::new(&self.config.dns))),
                ..AgentTools::default()
            },
            Toolset::Workspace { base_dir } => {
                let runner = ShellRunner::new(
                    base_dir.clone(),
                    Duration::from_secs(self.config.shell.timeout_seconds),
                );
                AgentTools {
                    files: Some(
                        AgentToolFiles::new(FileToolkit::new(base_dir.clone()))
                            .with_activity(activity.clone()),
                    ),
                    shell: Some(AgentToolShell::new(runner.clone()).with_activity(activity.clone())),
                    docker: Some(AgentToolDocker::new(runner).with_activity(activity.clone())),
                    ..AgentTools::default()
                }
            }
            Toolset::PubMed => AgentTools {
                pubmed: Some(AgentToolPubMed::new(PubMedClient::new(&self.config.sources))),
                ..AgentTools::default()
            },
            Toolset::HackerNews => AgentTools {
                web_search: web_search(),
                hackernews: Some(AgentToolHackerNews::new(HackerNewsClient::new(
                    &self.config.sources,
                ))),
                ..AgentTools::default()
            },
        }
    }

    fn cache_key(kind: &str, model: &str, system_prompt: &str, user_prompt: &str) -> String {
        format!("{}\n{}\n{}\n{}", kind, model, system_prompt, user_prompt)
    }

    /// 依次尝试首选模型与备选模型；备选模型会收到上一次的错误信息
    async fn extract_uncached<T>(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        models: Vec<String>,
    ) -> Result<T>
    where
        T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
    {
        let llm_config = &self.config.llm;
        let mut prompt = user_prompt.to_string();
        let mut last_error = None;

        for model in &models {
            let extractor = self
                .client
                .create_extractor::<T>(model, system_prompt, llm_config);

            match retry_with_backoff(&self.retry, || extractor.extract(&prompt)).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    eprintln!("❌ 调用模型服务出错 (模型 {}): {}", model, e);
                    prompt = format!(
                        "{}\n\n**Note** A previous attempt failed with the error \"{}\". Make sure to avoid it this time.",
                        user_prompt, e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AgentError::Generation("no model configured".into())))
    }
}

#[async_trait]
impl ModelGateway for LLMClient {
    async fn extract<T>(&self, system_prompt: &str, user_prompt: &str) -> Result<T>
    where
        T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
    {
        let (befitting_model, fallover_model) =
            evaluate_befitting_model(&self.config.llm, system_prompt, user_prompt);

        let key = Self::cache_key(
            std::any::type_name::<T>(),
            &befitting_model,
            system_prompt,
            user_prompt,
        );
        if let Ok(Some(cached)) = self.cache.get::<T>(EXTRACT_CACHE, &key).await {
            tracing::debug!("extract served from cache");
            return Ok(cached);
        }

        let models = std::iter::once(befitting_model)
            .chain(fallover_model)
            .collect::<Vec<_>>();
        let result: T = self
            .extract_uncached(system_prompt, user_prompt, models)
            .await?;

        if let Err(e) = self.cache.set(EXTRACT_CACHE, &key, &result).await {
            tracing::warn!("failed to write extract cache: {}", e);
        }
        Ok(result)
    }

    async fn prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let (befitting_model, _) =
            evaluate_befitting_model(&self.config.llm, system_prompt, user_prompt);

        let key = Self::cache_key("prompt", &befitting_model, system_prompt, user_prompt);
        if let Ok(Some(cached)) = self.cache.get::<String>(PROMPT_CACHE, &key).await {
            tracing::debug!("prompt served from cache");
            return Ok(cached);
        }

        let agent = self
            .client
            .create_agent(&befitting_model, system_prompt, &self.config.llm);
        let response = retry_with_backoff(&self.retry, || agent.prompt(user_prompt)).await?;

        if let Err(e) = self.cache.set(PROMPT_CACHE, &key, &response).await {
            tracing::warn!("failed to write prompt cache: {}", e);
        }
        Ok(response)
    }

    async fn prompt_with_tools(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        toolset: Toolset,
    ) -> Result<String> {
        let (befitting_model, _) =
            evaluate_befitting_model(&self.config.llm, system_prompt, user_prompt);
        let activity = ToolActivity::default();
        let tools = self.build_tools(&toolset, &activity);
        let agent = self.client.create_agent_with_tools(
            &befitting_model,
            system_prompt,
            &self.config.llm,
            &tools,
        );
        let react_config = self.react_config();

        let response = retry_before_side_effects(&self.retry, &activity, || {
            ReActExecutor::execute(&agent, user_prompt, &react_config)
        })
        .await?;

        if response.stopped_by_max_depth {
            tracing::warn!(
                iterations = response.iterations_used,
                tool_calls = response.tool_calls_history.len(),
                "returning partial answer"
            );
        }
        Ok(response.content)
    }
}
