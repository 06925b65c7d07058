use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "agent-lab.toml";

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "anthropic" | "claude" => Ok(LLMProvider::Anthropic),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// LLM模型配置
    pub llm: LLMConfig,

    /// 网络搜索配置
    pub search: SearchConfig,

    /// 域名扫描配置
    pub dns: DnsConfig,

    /// 会话存储配置
    pub session: SessionConfig,

    /// 命令执行配置
    pub shell: ShellConfig,

    /// PubMed、Hacker News、YouTube 等公开数据源
    pub sources: SourcesConfig,

    /// 缓存配置
    pub cache: CacheConfig,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 高能效模型，用于常规推理任务
    pub model_efficient: String,

    /// 高质量模型，用于长上下文任务，以及作为efficient失效情况下的兜底
    pub model_powerful: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 限流时的最大重试次数
    pub retry_attempts: u32,

    /// 指数退避的基础间隔（毫秒）
    pub retry_base_delay_ms: u64,

    /// 超时时间（秒）
    pub timeout_seconds: u64,

    /// ReAct模式的最大迭代次数
    pub max_iterations: usize,
}

/// 网络搜索配置（Tavily）
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub api_key: String,

    pub api_base_url: String,

    /// 单次搜索返回的最大结果数
    pub max_results: usize,

    /// basic 或 advanced
    pub search_depth: String,
}

/// 域名扫描配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DnsConfig {
    /// WHOIS根服务器
    pub whois_server: String,

    /// WHOIS与DNS查询超时（秒）
    pub timeout_seconds: u64,

    /// IP地理位置API
    pub geolocation_url: String,

    /// Google Safe Browsing API
    pub safe_browsing_url: String,

    pub safe_browsing_api_key: String,
}

/// 会话存储配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// 本地状态目录（用户标识文件所在目录）
    pub state_dir: PathBuf,

    /// SQLite数据库文件
    pub db_file: PathBuf,

    /// 对话时携带的历史轮数
    pub history_turns: usize,
}

/// 命令执行配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ShellConfig {
    /// 单条 shell/docker 命令的超时时间（秒）
    pub timeout_seconds: u64,
}

/// 公开数据源配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    /// NCBI E-utilities 基地址
    pub pubmed_base_url: String,

    /// NCBI API KEY，可选
    pub pubmed_api_key: String,

    /// 单次检索返回的文章数
    pub pubmed_max_results: usize,

    /// 单篇摘要保留的最大字符数
    pub pubmed_max_chars: usize,

    /// Hacker News Firebase API 基地址
    pub hackernews_base_url: String,

    /// 字幕语言偏好，按顺序匹配
    pub youtube_languages: Vec<String>,

    /// HTTP请求超时（秒）
    pub timeout_seconds: u64,
}

/// 缓存配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// 是否启用缓存
    pub enabled: bool,

    /// 缓存目录
    pub cache_dir: PathBuf,

    /// 缓存过期时间（小时）
    pub expire_hours: u64,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 加载配置：显式路径优先，其次当前目录下的默认配置文件，都没有则使用默认值
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let default_config_path = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(DEFAULT_CONFIG_FILE);

        if default_config_path.exists() {
            Self::from_file(&default_config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// 用户标识文件路径
    pub fn user_file(&self) -> PathBuf {
        self.session.state_dir.join("user.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LLMConfig::default(),
            search: SearchConfig::default(),
            dns: DnsConfig::default(),
            session: SessionConfig::default(),
            shell: ShellConfig::default(),
            sources: SourcesConfig::default(),
            cache: CacheConfig::default(),
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("AGENT_LAB_LLM_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.openai.com/v1"),
            model_efficient: String::from("gpt-4o-mini"),
            model_powerful: String::from("gpt-4o"),
            max_tokens: 8192,
            temperature: 0.1,
            retry_attempts: 5,
            retry_base_delay_ms: 100,
            timeout_seconds: 300,
            max_iterations: 10,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("TAVILY_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.tavily.com"),
            max_results: 5,
            search_depth: String::from("advanced"),
        }
    }
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            whois_server: String::from("whois.iana.org"),
            timeout_seconds: 10,
            geolocation_url: String::from("http://ip-api.com/json"),
            safe_browsing_url: String::from(
                "https://safebrowsing.googleapis.com/v4/threatMatches:find",
            ),
            safe_browsing_api_key: std::env::var("GOOGLE_API_KEY").unwrap_or_default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("tmp"),
            db_file: PathBuf::from("tmp/agent_sessions.db"),
            history_turns: 3,
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 120,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            pubmed_base_url: String::from("https://eutils.ncbi.nlm.nih.gov/entrez/eutils"),
            pubmed_api_key: std::env::var("NCBI_API_KEY").unwrap_or_default(),
            pubmed_max_results: 3,
            pubmed_max_chars: 2000,
            hackernews_base_url: String::from("https://hacker-news.firebaseio.com/v0"),
            youtube_languages: vec!["bn".into(), "en".into(), "ar".into()],
            timeout_seconds: 20,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_dir: PathBuf::from(".agent-lab/cache"),
            expire_hours: 24 * 7,
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
