use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::llm::{ModelGateway, Toolset};

const RESEARCH_PROMPT: &str = r#"You coordinate a small Hacker News research team.
1. First, use the hacker_news tool to find the stories the user is asking about.
2. Then search the web for each story with web_search to get more context.
3. Keep the story links; they are needed for the references.
Finally, write thoughtful and engaging research notes covering every story, with the links you used."#;

const ARTICLE_PROMPT: &str = "You turn research notes about Hacker News stories into a short article. Keep only facts present in the notes and list every link you relied on.";

/// 成稿
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct HnArticle {
    /// 文章标题
    pub title: String,
    /// 正文摘要
    pub summary: String,
    /// 引用的链接
    #[serde(default)]
    pub reference_links: Vec<String>,
}

impl HnArticle {
    pub fn to_markdown(&self) -> String {
        let mut text = format!("# {}\n\n{}\n", self.title.trim(), self.summary.trim());
        if !self.reference_links.is_empty() {
            text.push_str("\n## References\n");
            for link in &self.reference_links {
                text.push_str(&format!("- {}\n", link));
            }
        }
        text
    }
}

/// 先用工具调研，再提取成结构化文章
pub struct HnDigest<G: ModelGateway> {
    gateway: G,
}

impl<G: ModelGateway> HnDigest<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub async fn write(&self, request: &str) -> Result<HnArticle> {
        let request = request.trim();
        if request.is_empty() {
            return Err(AgentError::InvalidInput("request must not be empty".into()));
        }

        println!("📰 正在调研 Hacker News...");
        let notes = self
            .gateway
            .prompt_with_tools(RESEARCH_PROMPT, request, Toolset::HackerNews)
            .await?;
        if notes.trim().is_empty() {
            return Err(AgentError::EmptyOutput {
                stage: "hn_research",
                field: "notes",
            });
        }

        let article: HnArticle = self
            .gateway
            .extract(
                ARTICLE_PROMPT,
                &format!("Request: {}\n\nResearch notes:\n{}", request, notes),
            )
            .await?;
        if article.title.trim().is_empty() || article.summary.trim().is_empty() {
            return Err(AgentError::EmptyOutput {
                stage: "hn_article",
                field: "summary",
            });
        }
        Ok(article)
    }
}
