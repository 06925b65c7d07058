//! Hacker News 工具

use rig::tool::Tool;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::hackernews::HackerNewsClient;

#[derive(Debug, Clone)]
pub struct AgentToolHackerNews {
    client: HackerNewsClient,
}

#[derive(Debug, Default, Deserialize)]
pub struct HackerNewsArgs {
    pub action: String,
    pub num_stories: Option<usize>,
    pub username: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("hacker news tool error: {0}")]
pub struct HackerNewsToolError(String);

impl AgentToolHackerNews {
    pub fn new(client: HackerNewsClient) -> Self {
        Self { client }
    }

    pub async fn dispatch(&self, args: &HackerNewsArgs) -> Result<Value, HackerNewsToolError> {
        let failed = |e: crate::error::AgentError| HackerNewsToolError(e.to_string());
        match args.action.as_str() {
            "get_top_stories" => {
                let stories = self
                    .client
                    .get_top_stories(args.num_stories.unwrap_or(10))
                    .await
                    .map_err(failed)?;
                let rendered: Vec<Value> = stories
                    .iter()
                    .map(|story| {
                        json!({
                            "id": story.id,
                            "title": story.title,
                            "url": story.link(),
                            "score": story.score,
                            "by": story.by,
                            "comments": story.descendants,
                        })
                    })
                    .collect();
                Ok(Value::Array(rendered))
            }
            "get_user_details" => {
                let username = args.username.as_deref().unwrap_or_default();
                let user = self.client.get_user(username).await.map_err(failed)?;
                Ok(json!({
                    "id": user.id,
                    "karma": user.karma,
                    "about": user.about,
                    "total_items_submitted": user.submitted.len(),
                }))
            }
            other => Err(HackerNewsToolError(format!("unknown action `{}`", other))),
        }
    }
}

impl Tool for AgentToolHackerNews {
    const NAME: &'static str = "hacker_news";

    type Error = HackerNewsToolError;
    type Args = HackerNewsArgs;
    type Output = Value;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Read Hacker News: get the current top stories (title, url, score, author, comment count) or details about a user.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "action": { "type": "string", "enum": ["get_top_stories", "get_user_details"] },
                    "num_stories": { "type": "integer", "description": "number of top stories (get_top_stories, default 10, max 30)" },
                    "username": { "type": "string", "description": "Hacker News username (get_user_details)" }
                },
                "required": ["action"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...hacker_news@{}", args.action);
        self.dispatch(&args).await
    }
}
