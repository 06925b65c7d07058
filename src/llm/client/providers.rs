//! LLM Provider支持模块

use anyhow::Result;
use rig::{
    agent::Agent,
    client::CompletionClient,
    completion::{Prompt, PromptError},
    extractor::Extractor,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    config::{LLMConfig, LLMProvider},
    error::AgentError,
    llm::tools::{
        domain::AgentToolDomain, files::AgentToolFiles, hackernews::AgentToolHackerNews,
        pubmed::AgentToolPubMed, shell::AgentToolDocker, shell::AgentToolShell,
        time::AgentToolTime, web_search::AgentToolWebSearch,
    },
};

/// 一次Agent构建所挂载的工具
#[derive(Clone, Default)]
pub struct AgentTools {
    pub web_search: Option<AgentToolWebSearch>,
    pub domain: Option<AgentToolDomain>,
    pub files: Option<AgentToolFiles>,
    pub shell: Option<AgentToolShell>,
    pub docker: Option<AgentToolDocker>,
    pub pubmed: Option<AgentToolPubMed>,
    pub hackernews: Option<AgentToolHackerNews>,
}

/// 在agent builder上挂载时间工具以及所有已配置的工具，然后构建Agent
macro_rules! build_with_tools {
    ($builder:expr, $tools:expr) => {{
        let tools: &AgentTools = $tools;
        let mut builder = $builder.tool(AgentToolTime::new());
        if let Some(tool) = &tools.web_search {
            builder = builder.tool(tool.clone());
        }
        if let Some(tool) = &tools.domain {
            builder = builder.tool(tool.clone());
        }
        if let Some(tool) = &tools.files {
            builder = builder.tool(tool.clone());
        }
        if let Some(tool) = &tools.shell {
            builder = builder.tool(tool.clone());
        }
        if let Some(tool) = &tools.docker {
            builder = builder.tool(tool.clone());
        }
        if let Some(tool) = &tools.pubmed {
            builder = builder.tool(tool.clone());
        }
        if let Some(tool) = &tools.hackernews {
            builder = builder.tool(tool.clone());
        }
        builder.build()
    }};
}

/// 统一的Provider客户端枚举
#[derive(Clone)]
pub enum ProviderClient {
    OpenAI(rig::providers::openai::Client),
    Anthropic(rig::providers::anthropic::Client),
    DeepSeek(rig::providers::deepseek::Client),
    Ollama(rig::providers::ollama::Client),
}

impl ProviderClient {
    /// 根据配置创建相应的provider客户端
    pub fn new(config: &LLMConfig) -> Result<Self> {
        match config.provider {
            LLMProvider::OpenAI => {
                let client = rig::providers::openai::Client::builder(&config.api_key)
                    .base_url(&config.api_base_url)
                    .build();
                Ok(ProviderClient::OpenAI(client))
            }
            LLMProvider::Anthropic => {
                let client =
                    rig::providers::anthropic::ClientBuilder::new(&config.api_key).build()?;
                Ok(ProviderClient::Anthropic(client))
            }
            LLMProvider::DeepSeek => {
                let client = rig::providers::deepseek::Client::builder(&config.api_key)
                    .base_url(&config.api_base_url)
                    .build();
                Ok(ProviderClient::DeepSeek(client))
            }
            LLMProvider::Ollama => {
                let client = rig::providers::ollama::Client::builder().build();
                Ok(ProviderClient::Ollama(client))
            }
        }
    }

    /// 创建不带工具的Agent
    pub fn create_agent(
        &self,
        model: &str,
        system_prompt: &str,
        config: &LLMConfig,
    ) -> ProviderAgent {
        match self {
            ProviderClient::OpenAI(client) => {
                let agent = client
                    .completion_model(model)
                    .completions_api()
                    .into_agent_builder()
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .temperature(config.temperature)
                    .build();
                ProviderAgent::OpenAI(agent)
            }
            ProviderClient::Anthropic(client) => {
                let agent = client
                    .agent(model)
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .temperature(config.temperature)
                    .build();
                ProviderAgent::Anthropic(agent)
            }
            ProviderClient::DeepSeek(client) => {
                let agent = client
                    .agent(model)
                    .preamble(system_prompt)
                    .temperature(config.temperature)
                    .build();
                ProviderAgent::DeepSeek(agent)
            }
            ProviderClient::Ollama(client) => {
                let agent = client
                    .agent(model)
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .temperature(config.temperature)
                    .build();
                ProviderAgent::Ollama(agent)
            }
        }
    }

    /// 创建带工具的Agent
    pub fn create_agent_with_tools(
        &self,
        model: &str,
        system_prompt: &str,
        config: &LLMConfig,
        tools: &AgentTools,
    ) -> ProviderAgent {
        match self {
            ProviderClient::OpenAI(client) => {
                let agent = build_with_tools!(
                    client
                        .completion_model(model)
                        .completions_api()
                        .into_agent_builder()
                        .preamble(system_prompt)
                        .max_tokens(config.max_tokens.into())
                        .temperature(config.temperature),
                    tools
                );
                ProviderAgent::OpenAI(agent)
            }
            ProviderClient::Anthropic(client) => {
                let agent = build_with_tools!(
                    client
                        .agent(model)
                        .preamble(system_prompt)
                        .max_tokens(config.max_tokens.into())
                        .temperature(config.temperature),
                    tools
                );
                ProviderAgent::Anthropic(agent)
            }
            ProviderClient::DeepSeek(client) => {
                let agent = build_with_tools!(
                    client
                        .agent(model)
                        .preamble(system_prompt)
                        .max_tokens(config.max_tokens.into())
                        .temperature(config.temperature),
                    tools
                );
                ProviderAgent::DeepSeek(agent)
            }
            ProviderClient::Ollama(client) => {
                let agent = build_with_tools!(
                    client
                        .agent(model)
                        .preamble(system_prompt)
                        .max_tokens(config.max_tokens.into())
                        .temperature(config.temperature),
                    tools
                );
                ProviderAgent::Ollama(agent)
            }
        }
    }

    /// 创建Extractor
    pub fn create_extractor<T>(
        &self,
        model: &str,
        system_prompt: &str,
        config: &LLMConfig,
    ) -> ProviderExtractor<T>
    where
        T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
    {
        match self {
            ProviderClient::OpenAI(client) => {
                let extractor = client
                    .extractor_completions_api::<T>(model)
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .build();
                ProviderExtractor::OpenAI(extractor)
            }
            ProviderClient::Anthropic(client) => {
                let extractor = client
                    .extractor::<T>(model)
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .build();
                ProviderExtractor::Anthropic(extractor)
            }
            ProviderClient::DeepSeek(client) => {
                let extractor = client
                    .extractor::<T>(model)
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .build();
                ProviderExtractor::DeepSeek(extractor)
            }
            ProviderClient::Ollama(client) => {
                let extractor = client
                    .extractor::<T>(model)
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .build();
                ProviderExtractor::Ollama(extractor)
            }
        }
    }
}

/// 统一的Agent枚举
pub enum ProviderAgent {
    OpenAI(Agent<rig::providers::openai::CompletionModel>),
    Anthropic(Agent<rig::providers::anthropic::completion::CompletionModel>),
    DeepSeek(Agent<rig::providers::deepseek::CompletionModel>),
    Ollama(Agent<rig::providers::ollama::CompletionModel<reqwest::Client>>),
}

impl ProviderAgent {
    /// 执行prompt
    pub async fn prompt(&self, prompt: &str) -> Result<String, AgentError> {
        let result = match self {
            ProviderAgent::OpenAI(agent) => agent.prompt(prompt).await,
            ProviderAgent::Anthropic(agent) => agent.prompt(prompt).await,
            ProviderAgent::DeepSeek(agent) => agent.prompt(prompt).await,
            ProviderAgent::Ollama(agent) => agent.prompt(prompt).await,
        };
        result.map_err(AgentError::from_provider)
    }

    /// 执行多轮对话
    pub async fn multi_turn(
        &self,
        prompt: &str,
        max_iterations: usize,
    ) -> Result<String, PromptError> {
        match self {
            ProviderAgent::OpenAI(agent) => agent.prompt(prompt).multi_turn(max_iterations).await,
            ProviderAgent::Anthropic(agent) => {
                agent.prompt(prompt).multi_turn(max_iterations).await
            }
            ProviderAgent::DeepSeek(agent) => agent.prompt(prompt).multi_turn(max_iterations).await,
            ProviderAgent::Ollama(agent) => agent.prompt(prompt).multi_turn(max_iterations).await,
        }
    }
}

/// 统一的Extractor枚举
pub enum ProviderExtractor<T>
where
    T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
{
    OpenAI(Extractor<rig::providers::openai::CompletionModel, T>),
    Anthropic(Extractor<rig::providers::anthropic::completion::CompletionModel, T>),
    DeepSeek(Extractor<rig::providers::deepseek::CompletionModel, T>),
    Ollama(Extractor<rig::providers::ollama::CompletionModel<reqwest::Client>, T>),
}

impl<T> ProviderExtractor<T>
where
    T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
{
    /// 执行提取，限流错误保持可重试，其余归为结构化输出失败
    pub async fn extract(&self, prompt: &str) -> Result<T, AgentError> {
        let result = match self {
            ProviderExtractor::OpenAI(extractor) => extractor.extract(prompt).await,
            ProviderExtractor::Anthropic(extractor) => extractor.extract(prompt).await,
            ProviderExtractor::DeepSeek(extractor) => extractor.extract(prompt).await,
            ProviderExtractor::Ollama(extractor) => extractor.extract(prompt).await,
        };

        result.map_err(|err| match AgentError::from_provider(&err) {
            rate_limited @ AgentError::RateLimited(_) => rate_limited,
            _ => AgentError::StructuredOutput {
                target: std::any::type_name::<T>().to_string(),
                reason: err.to_string(),
            },
        })
    }
}
