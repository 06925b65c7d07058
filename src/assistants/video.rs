use std::fmt;
use std::str::FromStr;

use crate::error::{AgentError, Result};
use crate::llm::ModelGateway;
use crate::workflow::TimingScope;
use crate::youtube::{TranscriptSource, parse_video_id};

const SUMMARY_PROMPT: &str = "You are an AI YouTube video summarizer. You are provided with the transcript of a YouTube video. Summarize the content concisely while keeping the key points and main ideas. Provide a clear and structured summary including important details, main themes and conclusions.";

const BLOG_PROMPT: &str = "You are an expert blog post writer. Craft a well-structured, engaging and informative blog post from the video transcript you are given, in a clear conversational tone for a general audience. Include a compelling introduction, clear subheadings where useful, well-developed paragraphs and a concise conclusion or call-to-action.";

/// 输出形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoStyle {
    #[default]
    Summary,
    Blog,
}

impl VideoStyle {
    fn system_prompt(&self) -> &'static str {
        match self {
            VideoStyle::Summary => SUMMARY_PROMPT,
            VideoStyle::Blog => BLOG_PROMPT,
        }
    }
}

impl fmt::Display for VideoStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoStyle::Summary => write!(f, "summary"),
            VideoStyle::Blog => write!(f, "blog"),
        }
    }
}

impl FromStr for VideoStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(VideoStyle::Summary),
            "blog" => Ok(VideoStyle::Blog),
            _ => Err(format!("Unknown video style: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoSummary {
    pub video_id: String,
    pub transcript_chars: usize,
    pub content: String,
}

/// 两步流程：字幕获取 → 生成
pub struct VideoSummarizer<G: ModelGateway, S: TranscriptSource> {
    gateway: G,
    transcripts: S,
}

impl<G: ModelGateway, S: TranscriptSource> VideoSummarizer<G, S> {
    pub fn new(gateway: G, transcripts: S) -> Self {
        Self {
            gateway,
            transcripts,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub async fn summarize(
        &self,
        link: &str,
        style: VideoStyle,
    ) -> Result<(VideoSummary, TimingScope)> {
        let video_id = parse_video_id(link)?;
        let mut timing = TimingScope::new();

        println!("🎬 获取字幕: {}", video_id);
        timing.start_phase("transcriber");
        let transcript = self.transcripts.transcript(&video_id).await?;
        timing.end_phase("transcriber");
        if transcript.trim().is_empty() {
            return Err(AgentError::EmptyOutput {
                stage: "transcriber",
                field: "transcript",
            });
        }

        println!("✍️ 正在生成 {} ...", style);
        timing.start_phase("summarizer");
        let content = self
            .gateway
            .prompt(
                style.system_prompt(),
                &format!("Here is the transcript:\n{}", transcript),
            )
            .await?;
        timing.end_phase("summarizer");
        if content.trim().is_empty() {
            return Err(AgentError::EmptyOutput {
                stage: "summarizer",
                field: "content",
            });
        }

        let summary = VideoSummary {
            video_id,
            transcript_chars: transcript.chars().count(),
            content,
        };
        Ok((summary, timing))
    }
}
