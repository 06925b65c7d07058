use super::*;
use crate::youtube::TranscriptSource;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// 记录调用方式的网关；`answer` 为空时模拟模型返回空文本
#[derive(Default)]
struct RecordingGateway {
    answer: String,
    article: Option<serde_json::Value>,
    calls: Mutex<Vec<(String, String, Option<Toolset>)>>,
}

impl RecordingGateway {
    fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<(String, String, Option<Toolset>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelGateway for RecordingGateway {
    async fn extract<T>(&self, system_prompt: &str, user_prompt: &str) -> Result<T>
    where
        T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
    {
        self.calls.lock().unwrap().push((
            system_prompt.to_string(),
            user_prompt.to_string(),
            None,
        ));
        let value = self
            .article
            .clone()
            .ok_or_else(|| AgentError::Generation("not scripted".into()))?;
        Ok(serde_json::from_value(value)?)
    }

    async fn prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push((
            system_prompt.to_string(),
            user_prompt.to_string(),
            None,
        ));
        Ok(self.answer.clone())
    }

    async fn prompt_with_tools(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        toolset: Toolset,
    ) -> Result<String> {
        self.calls.lock().unwrap().push((
            system_prompt.to_string(),
            user_prompt.to_string(),
            Some(toolset),
        ));
        Ok(self.answer.clone())
    }
}

struct FixedTranscript(&'static str);

#[async_trait]
impl TranscriptSource for FixedTranscript {
    async fn transcript(&self, video_id: &str) -> Result<String> {
        if video_id != "dQw4w9WgXcQ" {
            return Err(AgentError::InvalidInput(format!("unexpected id {}", video_id)));
        }
        Ok(self.0.to_string())
    }
}

#[tokio::test]
async fn test_personas_pick_their_tools() {
    for (persona, expected) in [
        (Persona::Finance, Some(Toolset::Research)),
        (Persona::PubMed, Some(Toolset::PubMed)),
        (Persona::Nutrition, None),
    ] {
        let assistant = Assistant::new(RecordingGateway::answering("ok"), persona);
        assert_eq!(assistant.ask("NVDA or MSFT?").await.unwrap(), "ok");

        let calls = assistant.gateway.calls();
        assert_eq!(calls.len(), 1, "{persona}");
        assert_eq!(calls[0].2, expected, "{persona}");
        assert!(calls[0].1.starts_with("Current date: "));
        assert!(calls[0].1.ends_with("NVDA or MSFT?"));
    }
}

#[tokio::test]
async fn test_blank_question_is_rejected() {
    let assistant = Assistant::new(RecordingGateway::answering("ok"), Persona::Finance);
    assert!(matches!(
        assistant.ask("  \n").await,
        Err(AgentError::InvalidInput(_))
    ));
    assert!(assistant.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_empty_answer_is_an_error() {
    let assistant = Assistant::new(RecordingGateway::answering("  "), Persona::Nutrition);
    assert!(matches!(
        assistant.ask("meal plan for a marathon runner").await,
        Err(AgentError::EmptyOutput {
            stage: "nutrition",
            ..
        })
    ));
}

#[tokio::test]
async fn test_hn_digest_researches_then_extracts() {
    let gateway = RecordingGateway {
        answer: "1. Rust 2.0 announced https://example.com/rust".into(),
        article: Some(serde_json::json!({
            "title": "Rust 2.0",
            "summary": "The top story is about Rust.",
            "reference_links": ["https://example.com/rust"]
        })),
        ..Default::default()
    };
    let digest = HnDigest::new(gateway);

    let article = digest.write("Top 2 stories on hackernews").await.unwrap();

    assert_eq!(article.reference_links, vec!["https://example.com/rust"]);
    assert!(article.to_markdown().starts_with("# Rust 2.0\n\nThe top story"));
    assert!(article.to_markdown().contains("## References\n- https://example.com/rust"));

    let calls = digest.gateway().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].2, Some(Toolset::HackerNews));
    assert!(calls[1].1.contains("Research notes:\n1. Rust 2.0 announced"));
}

#[tokio::test]
async fn test_hn_digest_stops_on_empty_notes() {
    let digest = HnDigest::new(RecordingGateway::answering(""));
    assert!(matches!(
        digest.write("top stories").await,
        Err(AgentError::EmptyOutput {
            stage: "hn_research",
            ..
        })
    ));
    assert_eq!(digest.gateway().calls().len(), 1);
}

#[tokio::test]
async fn test_video_summary_uses_transcript() {
    let summarizer = VideoSummarizer::new(
        RecordingGateway::answering("A song about commitment."),
        FixedTranscript("never gonna give you up"),
    );

    let (summary, timing) = summarizer
        .summarize("https://youtu.be/dQw4w9WgXcQ", VideoStyle::Blog)
        .await
        .unwrap();

    assert_eq!(summary.video_id, "dQw4w9WgXcQ");
    assert_eq!(summary.transcript_chars, 23);
    assert_eq!(summary.content, "A song about commitment.");
    let report = timing.generate_timing_report();
    assert!(report.contains("transcriber") && report.contains("summarizer"));

    let calls = summarizer.gateway().calls();
    assert!(calls[0].0.contains("blog post"));
    assert!(calls[0].1.ends_with("never gonna give you up"));
}

#[tokio::test]
async fn test_video_with_empty_transcript_is_not_summarized() {
    let summarizer = VideoSummarizer::new(RecordingGateway::answering("x"), FixedTranscript(" "));
    assert!(matches!(
        summarizer
            .summarize("dQw4w9WgXcQ", VideoStyle::Summary)
            .await,
        Err(AgentError::EmptyOutput {
            stage: "transcriber",
            ..
        })
    ));
    assert!(summarizer.gateway().calls().is_empty());
}

#[test]
fn test_video_style_parsing() {
    assert_eq!("BLOG".parse::<VideoStyle>().unwrap(), VideoStyle::Blog);
    assert_eq!(VideoStyle::default().to_string(), "summary");
    assert!("tweet".parse::<VideoStyle>().is_err());
}
