//! 网络搜索工具（Tavily）

use rig::tool::Tool;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::{AgentError, Result};

/// 单条搜索结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// 网络搜索工具
#[derive(Debug, Clone)]
pub struct AgentToolWebSearch {
    config: SearchConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
pub struct WebSearchArgs {
    pub query: String,
    pub max_results: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
#[error("web search failed: {0}")]
pub struct WebSearchToolError(String);

impl AgentToolWebSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn request_body(&self, query: &str, max_results: Option<usize>) -> serde_json::Value {
        serde_json::json!({
            "query": query,
            "search_depth": self.config.search_depth,
            "max_results": max_results.unwrap_or(self.config.max_results),
            "include_answer": true,
        })
    }

    pub async fn search(&self, query: &str, max_results: Option<usize>) -> Result<SearchResponse> {
        if self.config.api_key.trim().is_empty() {
            return Err(AgentError::Search(
                "search API key is not configured (TAVILY_API_KEY)".into(),
            ));
        }
        if query.trim().is_empty() {
            return Err(AgentError::InvalidInput("search query must not be empty".into()));
        }

        let url = format!("{}/search", self.config.api_base_url.trim_end_matches('/'));
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(query, max_results))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AgentError::Search(format!("{}: {}", status, body)));
        }

        Ok(resp.json::<SearchResponse>().await?)
    }
}

impl Tool for AgentToolWebSearch {
    const NAME: &'static str = "web_search";

    type Error = WebSearchToolError;
    type Args = WebSearchArgs;
    type Output = SearchResponse;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Search the web for up-to-date information. Returns a short answer plus the top results with title, url and content snippet.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "the search query"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "maximum number of results to return"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...web_search@{:?}", args);
        self.search(&args.query, args.max_results)
            .await
            .map_err(|e| WebSearchToolError(e.to_string()))
    }
}
