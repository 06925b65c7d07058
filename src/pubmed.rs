//! PubMed 检索 - NCBI E-utilities 的 esearch / esummary / efetch

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::SourcesConfig;
use crate::error::{AgentError, Result};

const SERVICE: &str = "PubMed";

/// 一篇检索到的文章
#[derive(Debug, Clone, PartialEq)]
pub struct PubMedArticle {
    pub uid: String,
    pub title: String,
    pub published: String,
    pub journal: String,
    pub summary: String,
}

impl PubMedArticle {
    pub fn link(&self) -> String {
        format!("https://pubmed.ncbi.nlm.nih.gov/{}/", self.uid)
    }
}

impl std::fmt::Display for PubMedArticle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Published: {}\nTitle: {}\nJournal: {}\nLink: {}\nSummary:\n{}",
            self.published,
            self.title,
            self.journal,
            self.link(),
            self.summary
        )
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    esearchresult: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

/// 从 esearch 的JSON中取出文章ID
pub(crate) fn parse_search_ids(raw: &str) -> Result<Vec<String>> {
    let envelope: SearchEnvelope = serde_json::from_str(raw)?;
    Ok(envelope.esearchresult.idlist)
}

/// 从 esummary 的JSON中按ID顺序取出标题、日期和期刊，缺失的ID跳过
pub(crate) fn parse_summaries(raw: &Value, ids: &[String]) -> Vec<PubMedArticle> {
    let field = |entry: &Value, name: &str| {
        entry
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string()
    };

    ids.iter()
        .filter_map(|uid| {
            let entry = raw.get("result")?.get(uid)?;
            if entry.get("error").is_some() {
                return None;
            }
            let journal = Some(field(entry, "fulljournalname"))
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| field(entry, "source"));
            Some(PubMedArticle {
                uid: uid.clone(),
                title: field(entry, "title"),
                published: field(entry, "pubdate"),
                journal,
                summary: String::new(),
            })
        })
        .collect()
}

/// 截断到最多 `max_chars` 个字符
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}

/// 面向模型的检索结果文本
pub fn render_articles(articles: &[PubMedArticle]) -> String {
    if articles.is_empty() {
        return "No good PubMed Result was found".to_string();
    }
    articles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Clone)]
pub struct PubMedClient {
    http: reqwest::Client,
    config: SourcesConfig,
}

impl PubMedClient {
    pub fn new(config: &SourcesConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            config: config.clone(),
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!(
            "{}/{}.fcgi",
            self.config.pubmed_base_url.trim_end_matches('/'),
            name
        )
    }

    async fn get_text(&self, name: &str, params: &[(&str, &str)]) -> Result<String> {
        let mut request = self.http.get(self.endpoint(name)).query(params);
        if !self.config.pubmed_api_key.is_empty() {
            request = request.query(&[("api_key", self.config.pubmed_api_key.as_str())]);
        }
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AgentError::Source {
                service: SERVICE,
                reason: format!("{} returned {}", name, status),
            });
        }
        Ok(resp.text().await?)
    }

    pub async fn search_ids(&self, query: &str) -> Result<Vec<String>> {
        let retmax = self.config.pubmed_max_results.to_string();
        let raw = self
            .get_text(
                "esearch",
                &[
                    ("db", "pubmed"),
                    ("term", query),
                    ("retmax", &retmax),
                    ("retmode", "json"),
                    ("sort", "relevance"),
                ],
            )
            .await?;
        parse_search_ids(&raw)
    }

    async fn abstract_text(&self, uid: &str) -> Result<String> {
        let raw = self
            .get_text(
                "efetch",
                &[
                    ("db", "pubmed"),
                    ("id", uid),
                    ("rettype", "abstract"),
                    ("retmode", "text"),
                ],
            )
            .await?;
        Ok(truncate_chars(raw.trim(), self.config.pubmed_max_chars))
    }

    /// 检索并返回带摘要的文章列表
    pub async fn query(&self, query: &str) -> Result<Vec<PubMedArticle>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AgentError::InvalidInput("PubMed query must not be empty".into()));
        }

        let ids = self.search_ids(query).await?;
        tracing::debug!(query, hits = ids.len(), "pubmed search finished");
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.join(",");
        let raw = self
            .get_text(
                "esummary",
                &[("db", "pubmed"), ("id", &joined), ("retmode", "json")],
            )
            .await?;
        let mut articles = parse_summaries(&serde_json::from_str(&raw)?, &ids);

        for article in &mut articles {
            article.summary = match self.abstract_text(&article.uid).await {
                Ok(text) if !text.is_empty() => text,
                Ok(_) => "No abstract available".to_string(),
                Err(e) => {
                    tracing::warn!(uid = %article.uid, "failed to fetch abstract: {}", e);
                    "No abstract available".to_string()
                }
            };
        }
        Ok(articles)
    }
}
