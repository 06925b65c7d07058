//! PubMed 检索工具

use rig::tool::Tool;
use serde::Deserialize;

use crate::pubmed::{PubMedClient, render_articles};

#[derive(Debug, Clone)]
pub struct AgentToolPubMed {
    client: PubMedClient,
}

#[derive(Debug, Deserialize)]
pub struct PubMedArgs {
    pub query: String,
}

#[derive(Debug, thiserror::Error)]
#[error("PubMed search failed: {0}")]
pub struct PubMedToolError(String);

impl AgentToolPubMed {
    pub fn new(client: PubMedClient) -> Self {
        Self { client }
    }
}

impl Tool for AgentToolPubMed {
    const NAME: &'static str = "pubmed_search";

    type Error = PubMedToolError;
    type Args = PubMedArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Search PubMed for peer-reviewed biomedical literature. Returns publication date, title, journal, link and abstract of the most relevant articles.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "PubMed search terms, e.g. \"long covid fatigue treatment\""
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...pubmed_search@{}", args.query);
        self.client
            .query(&args.query)
            .await
            .map(|articles| render_articles(&articles))
            .map_err(|e| PubMedToolError(e.to_string()))
    }
}
