//! 各子命令的启动流程：装配配置、模型客户端与应用组件

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::assistants::{Assistant, HnDigest, Persona, VideoStyle, VideoSummarizer};
use crate::chat::{ChatLoop, SessionBinding, resolve_working_dir};
use crate::config::Config;
use crate::dns::DomainToolkit;
use crate::llm::LLMClient;
use crate::pipeline::IdeaPipeline;
use crate::resume::{EvaluationSheet, JobBrief, ResumeScreener};
use crate::scanner::{DomainScanner, ScanMode, normalize_domain};
use crate::session::{SessionStore, create_session_id, load_user_id, save_user_id};
use crate::youtube::YoutubeTranscripts;

mod timing;

pub use timing::TimingScope;

const DEFAULT_USER_ID: &str = "default";

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
    println!("💾 已保存到 {}", path.display());
    Ok(())
}

/// 启动创业想法验证流水线
pub async fn launch_validate(config: &Config, idea: &str, output: Option<&Path>) -> Result<()> {
    let client = LLMClient::new(config.clone())?;
    client.check_connection().await?;

    let pipeline = IdeaPipeline::new(client);
    let (state, timing) = pipeline.run(idea).await?;
    let report = state.final_report.unwrap_or_default();

    println!("\n{}\n", report);
    println!("{}", timing.generate_timing_report());

    if let Some(path) = output {
        write_output(path, &report)?;
    }
    Ok(())
}

/// 启动域名安全扫描
pub async fn launch_scan(
    config: &Config,
    domain: &str,
    mode: ScanMode,
    output: Option<&Path>,
) -> Result<()> {
    let client = LLMClient::new(config.clone())?;
    client.check_connection().await?;

    let report = DomainScanner::new(client).scan(domain, mode).await?;
    println!("\n{}", report);

    if let Some(path) = output {
        write_output(path, &report)?;
    }
    Ok(())
}

/// 不经过模型的确定性DNS快速扫描
pub async fn launch_dns_facts(config: &Config, domain: &str) -> Result<()> {
    let domain = normalize_domain(domain)?;
    let toolkit = DomainToolkit::new(&config.dns);
    let report = toolkit.quick_scan(&domain).await;
    println!("{}", report);
    Ok(())
}

/// 确定用户标识：命令行参数 > 本地文件 > 环境变量USER > 默认值
fn resolve_user_id(config: &Config, explicit: Option<&str>) -> Result<String> {
    let user_file = config.user_file();
    if let Some(user_id) = explicit.map(str::trim).filter(|id| !id.is_empty()) {
        save_user_id(&user_file, user_id)?;
        return Ok(user_id.to_string());
    }
    if let Some(user_id) = load_user_id(&user_file)? {
        return Ok(user_id);
    }

    let user_id = std::env::var("USER")
        .ok()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_USER_ID.to_string());
    save_user_id(&user_file, &user_id)?;
    Ok(user_id)
}

/// 启动交互式开发助手
pub async fn launch_chat(
    config: &Config,
    dir: Option<PathBuf>,
    user: Option<&str>,
    resume_session: bool,
) -> Result<()> {
    let working_dir = resolve_working_dir(dir);
    let client = LLMClient::new(config.clone())?;

    let store = SessionStore::open(&config.session.db_file)
        .with_context(|| format!("Failed to open session database {:?}", config.session.db_file))?;
    let user_id = resolve_user_id(config, user)?;
    let previous_session = if resume_session {
        store.last_session_id_by_user(&user_id)?
    } else {
        None
    };
    let session_id = previous_session.unwrap_or_else(create_session_id);

    tracing::info!(user_id = %user_id, session_id = %session_id, "chat session started");
    println!("🤖 Agent CLI");
    println!("📁 当前目录: {}", working_dir.display());
    println!("🧵 会话: {} (用户 {})", session_id, user_id);
    println!("输入 'exit'、'quit' 或 'bye' 退出\n");

    let chat = ChatLoop::new(&client, working_dir).with_session(
        SessionBinding {
            store: &store,
            user_id,
            session_id,
        },
        config.session.history_turns,
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let summary = chat.run(stdin, &mut stdout).await?;
    tracing::info!(
        answered = summary.answered,
        failed = summary.failed,
        "chat session finished"
    );
    Ok(())
}

/// 启动简历批量筛选
pub async fn launch_resumes(
    config: &Config,
    folder: &Path,
    job_description: &str,
    requirements: &str,
    output: &Path,
) -> Result<()> {
    let brief = JobBrief::new(job_description, requirements)?;
    let client = LLMClient::new(config.clone())?;
    client.check_connection().await?;

    let mut timing = TimingScope::new();
    timing.start_phase("resume_screening");
    let screener = ResumeScreener::new(client, brief);
    let summary = screener
        .screen_folder(folder, &EvaluationSheet::new(output))
        .await?;
    timing.end_phase("resume_screening");

    println!(
        "\n📊 共扫描 {} 份，匹配 {} 份，不匹配 {} 份，失败 {} 份",
        summary.scanned,
        summary.shortlisted,
        summary.rejected,
        summary.failed.len()
    );
    println!("{}", timing.generate_timing_report());
    Ok(())
}

/// 启动单轮问答助手（金融、PubMed、营养）
pub async fn launch_assistant(
    config: &Config,
    persona: Persona,
    question: &str,
    output: Option<&Path>,
) -> Result<()> {
    let client = LLMClient::new(config.clone())?;
    client.check_connection().await?;

    let mut timing = TimingScope::new();
    timing.start_phase(persona.name());
    let answer = Assistant::new(client, persona).ask(question).await?;
    timing.end_phase(persona.name());

    println!("\n{}\n", answer);
    println!("{}", timing.generate_timing_report());
    if let Some(path) = output {
        write_output(path, &answer)?;
    }
    Ok(())
}

/// 启动 Hacker News 调研
pub async fn launch_hn(config: &Config, request: &str, output: Option<&Path>) -> Result<()> {
    let client = LLMClient::new(config.clone())?;
    client.check_connection().await?;

    let article = HnDigest::new(client).write(request).await?;
    let markdown = article.to_markdown();
    println!("\n{}", markdown);

    if let Some(path) = output {
        write_output(path, &markdown)?;
    }
    Ok(())
}

/// 启动 YouTube 视频总结
pub async fn launch_video_summary(
    config: &Config,
    link: &str,
    style: VideoStyle,
    output: Option<&Path>,
) -> Result<()> {
    let client = LLMClient::new(config.clone())?;
    client.check_connection().await?;

    let summarizer = VideoSummarizer::new(client, YoutubeTranscripts::new(&config.sources));
    let (summary, timing) = summarizer.summarize(link, style).await?;
    tracing::info!(
        video_id = %summary.video_id,
        transcript_chars = summary.transcript_chars,
        "video summarized"
    );

    println!("\n{}\n", summary.content);
    println!("{}", timing.generate_timing_report());
    if let Some(path) = output {
        write_output(path, &summary.content)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
