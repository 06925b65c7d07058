//! 模型网关 - 应用层与具体模型服务之间的接缝

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

/// Agent可用的工具组合
#[derive(Debug, Clone, PartialEq)]
pub enum Toolset {
    /// 网络搜索 + 时间
    Research,
    /// DNS/WHOIS/信誉查询 + 网络搜索 + 时间
    DomainScan,
    /// 文件操作 + shell + docker + 时间，全部以 base_dir 为根
    Workspace { base_dir: PathBuf },
    /// PubMed 文献检索 + 时间
    PubMed,
    /// Hacker News + 网络搜索 + 时间
    HackerNews,
}

/// 文本生成能力的抽象
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// 结构化数据提取
    async fn extract<T>(&self, system_prompt: &str, user_prompt: &str) -> Result<T>
    where
        T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static;

    /// 单轮对话（不使用工具）
    async fn prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// 使用工具的多轮对话（ReAct）
    async fn prompt_with_tools(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        toolset: Toolset,
    ) -> Result<String>;
}
