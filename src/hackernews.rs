//! Hacker News 数据 - 官方 Firebase API

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::SourcesConfig;
use crate::error::{AgentError, Result};

const SERVICE: &str = "Hacker News";

/// 单次最多取回的热门条目数
pub const MAX_STORIES: usize = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HnStory {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub by: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub descendants: Option<i64>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
}

impl HnStory {
    /// 原文链接，Ask HN 等无外链条目指向讨论页
    pub fn link(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| format!("https://news.ycombinator.com/item?id={}", self.id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HnUser {
    pub id: String,
    #[serde(default)]
    pub karma: i64,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub submitted: Vec<u64>,
}

/// 请求数量限制在 1..=MAX_STORIES
pub fn clamp_story_count(requested: usize) -> usize {
    requested.clamp(1, MAX_STORIES)
}

#[derive(Debug, Clone)]
pub struct HackerNewsClient {
    http: reqwest::Client,
    base_url: String,
}

impl HackerNewsClient {
    pub fn new(config: &SourcesConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: config.hackernews_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let resp = self
            .http
            .get(format!("{}/{}", self.base_url, path))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AgentError::Source {
                service: SERVICE,
                reason: format!("{} returned {}", path, status),
            });
        }
        Ok(resp.json::<T>().await?)
    }

    pub async fn get_item(&self, id: u64) -> Result<Option<HnStory>> {
        self.get_json(&format!("item/{}.json", id)).await
    }

    /// 按热度排序的前 `count` 条，保持官方排序
    pub async fn get_top_stories(&self, count: usize) -> Result<Vec<HnStory>> {
        let ids: Vec<u64> = self.get_json("topstories.json").await?;
        let ids: Vec<u64> = ids.into_iter().take(clamp_story_count(count)).collect();

        let mut tasks = tokio::task::JoinSet::new();
        for (rank, id) in ids.into_iter().enumerate() {
            let client = self.clone();
            tasks.spawn(async move { (rank, client.get_item(id).await) });
        }

        let mut ranked = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((rank, Ok(Some(story)))) => ranked.push((rank, story)),
                Ok((_, Ok(None))) => {}
                Ok((rank, Err(e))) => tracing::warn!(rank, "failed to fetch story: {}", e),
                Err(e) => tracing::warn!("story task failed: {}", e),
            }
        }
        ranked.sort_by_key(|(rank, _)| *rank);
        Ok(ranked.into_iter().map(|(_, story)| story).collect())
    }

    pub async fn get_user(&self, username: &str) -> Result<HnUser> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AgentError::InvalidInput("username must not be empty".into()));
        }
        let user: Option<HnUser> = self.get_json(&format!("user/{}.json", username)).await?;
        user.ok_or_else(|| AgentError::Source {
            service: SERVICE,
            reason: format!("user `{}` does not exist", username),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_parsing_and_link_fallback() {
        let raw = r#"{"by":"dang","descendants":12,"id":8863,"kids":[1,2],"score":111,"time":1175714200,"title":"My YC app","type":"story","url":"http://www.getdropbox.com/u/2/screencast.html"}"#;
        let story: HnStory = serde_json::from_str(raw).unwrap();
        assert_eq!(story.score, Some(111));
        assert_eq!(story.link(), "http://www.getdropbox.com/u/2/screencast.html");

        let ask: HnStory = serde_json::from_str(r#"{"id":121003,"title":"Ask HN: ..."}"#).unwrap();
        assert_eq!(ask.link(), "https://news.ycombinator.com/item?id=121003");
    }

    #[test]
    fn test_deleted_item_is_null() {
        let item: Option<HnStory> = serde_json::from_str("null").unwrap();
        assert!(item.is_none());
    }

    #[test]
    fn test_user_parsing() {
        let raw = r#"{"about":"founder","created":1173923446,"id":"jl","karma":2937,"submitted":[8265435,8168423]}"#;
        let user: HnUser = serde_json::from_str(raw).unwrap();
        assert_eq!(user.id, "jl");
        assert_eq!(user.submitted.len(), 2);
    }

    #[test]
    fn test_story_count_is_clamped() {
        assert_eq!(clamp_story_count(0), 1);
        assert_eq!(clamp_story_count(5), 5);
        assert_eq!(clamp_story_count(500), MAX_STORIES);
    }
}
