use crate::assistants::VideoStyle;
use crate::config::{Config, LLMProvider};
use crate::scanner::ScanMode;
use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Agent Lab - 基于LLM Agent的一组命令行小工具
#[derive(Parser, Debug)]
#[command(name = "agent-lab")]
#[command(
    about = "LLM agent toolbox: startup idea validation, domain security scanning, resume screening, a developer assistant and research helpers."
)]
#[command(version)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// 所有子命令共享的配置覆盖项
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// 配置文件路径
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 是否启用详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// LLM Provider (openai, anthropic, deepseek, ollama)
    #[arg(long, global = true)]
    pub llm_provider: Option<String>,

    /// LLM API基地址
    #[arg(long, global = true)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long, global = true, env = "AGENT_LAB_LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// 高能效模型，用于常规推理
    #[arg(long, global = true)]
    pub model_efficient: Option<String>,

    /// 高质量模型，用于长提示词以及efficient模型失败后的兜底
    #[arg(long, global = true)]
    pub model_powerful: Option<String>,

    /// 最大tokens数
    #[arg(long, global = true)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long, global = true)]
    pub temperature: Option<f64>,

    /// 工具调用的最大轮数
    #[arg(long, global = true)]
    pub max_iterations: Option<usize>,

    /// Tavily搜索 API KEY
    #[arg(long, global = true, env = "TAVILY_API_KEY", hide_env_values = true)]
    pub search_api_key: Option<String>,

    /// 是否禁用缓存
    #[arg(long, global = true)]
    pub no_cache: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 验证创业想法：澄清 → 市场调研 → 竞品分析 → 报告
    Validate {
        /// 创业想法描述
        idea: String,

        /// 报告输出文件
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 由Agent执行域名安全扫描
    Scan {
        /// 域名或URL
        domain: String,

        /// 扫描深度 (quick, deep)
        #[arg(short, long, default_value = "quick")]
        mode: ScanMode,

        /// 报告输出文件
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 不经过模型的确定性DNS快速扫描
    DnsFacts {
        /// 域名或URL
        domain: String,
    },

    /// 交互式开发助手（文件、shell、docker工具）
    Chat {
        /// 工作目录，默认取 ORIGINAL_PWD 或当前目录
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// 用户标识，指定后保存到本地
        #[arg(short, long)]
        user: Option<String>,

        /// 继续该用户最近一次的会话
        #[arg(long = "continue")]
        resume_session: bool,
    },

    /// 批量筛选简历，匹配的写入CSV表格
    Resumes {
        /// 简历目录（.pdf/.txt/.md）
        #[arg(short, long, default_value = "./resume")]
        folder: PathBuf,

        /// 职位描述
        #[arg(short, long, conflicts_with = "job_file", required_unless_present = "job_file")]
        job: Option<String>,

        /// 从文件读取职位描述
        #[arg(long)]
        job_file: Option<PathBuf>,

        /// 特殊要求
        #[arg(short, long, default_value = "")]
        requirements: String,

        /// 输出的CSV文件
        #[arg(short, long, default_value = "resume_evaluation.csv")]
        output: PathBuf,
    },

    /// 金融问答（网络搜索）
    Finance {
        /// 问题，如 "Which is a better investment right now, NVDA or Microsoft?"
        question: String,

        /// 回答输出文件
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// PubMed 文献问答
    Pubmed {
        /// 研究问题
        question: String,

        /// 回答输出文件
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 个性化营养方案
    Nutrition {
        /// 个人情况与目标
        request: String,

        /// 方案输出文件
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Hacker News 热门故事调研与成文
    Hn {
        /// 调研要求
        #[arg(default_value = "Write an article about the top 2 stories on hackernews")]
        request: String,

        /// 文章输出文件
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 根据字幕总结 YouTube 视频
    YtSummary {
        /// 视频链接或ID
        url: String,

        /// 输出形式 (summary, blog)
        #[arg(short, long, default_value = "summary")]
        style: VideoStyle,

        /// 输出文件
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl GlobalArgs {
    /// 加载配置文件并用命令行参数覆盖
    pub fn into_config(self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(self, config: &mut Config) {
        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的provider: {}，使用配置中的provider",
                    provider_str
                );
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model_efficient) = self.model_efficient {
            config.llm.model_efficient = model_efficient;
        }
        if let Some(model_powerful) = self.model_powerful {
            config.llm.model_powerful = model_powerful;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.llm.max_iterations = max_iterations;
        }
        if let Some(search_api_key) = self.search_api_key {
            config.search.api_key = search_api_key;
        }

        // 缓存配置
        if self.no_cache {
            config.cache.enabled = false;
        }
        config.verbose = config.verbose || self.verbose;
    }
}
