//! YouTube 字幕获取 - 解析观看页中的字幕轨道并下载 timedtext

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

use crate::config::SourcesConfig;
use crate::error::{AgentError, Result};

const SERVICE: &str = "YouTube";
const CAPTION_TRACKS_KEY: &str = "\"captionTracks\":";

static TEXT_SEGMENT: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?s)<text[^>]*>(.*?)</text>"));
static INLINE_TAG: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"<[^>]+>"));

fn compiled(regex: &'static LazyLock<Result<Regex, regex::Error>>) -> Result<&'static Regex> {
    regex
        .as_ref()
        .map_err(|e| AgentError::Generation(format!("invalid transcript pattern: {}", e)))
}

/// 从链接或裸ID中取出11位视频ID
pub fn parse_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    let is_id = |candidate: &str| {
        candidate.len() == 11
            && candidate
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    };
    if is_id(input) {
        return Ok(input.to_string());
    }

    let invalid = || AgentError::InvalidInput(format!("not a YouTube video link: {}", input));
    let url = reqwest::Url::parse(input).map_err(|_| invalid())?;
    let host = url.host_str().unwrap_or_default().trim_start_matches("www.");
    let mut segments = url.path_segments().into_iter().flatten();

    let candidate = match host {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "m.youtube.com" | "music.youtube.com" => match segments.next() {
            Some("watch") => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.to_string()),
            Some("shorts") | Some("embed") | Some("live") | Some("v") => {
                segments.next().map(str::to_string)
            }
            _ => None,
        },
        _ => None,
    };

    candidate.filter(|id| is_id(id)).ok_or_else(invalid)
}

/// 观看页中的一条字幕轨道
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    fn matches(&self, language: &str) -> bool {
        self.language_code == language
            || self
                .language_code
                .strip_prefix(language)
                .is_some_and(|rest| rest.starts_with('-'))
    }
}

/// 从观看页HTML中取出字幕轨道列表
pub fn caption_tracks(html: &str) -> Result<Vec<CaptionTrack>> {
    let start = html.find(CAPTION_TRACKS_KEY).ok_or_else(|| AgentError::Source {
        service: SERVICE,
        reason: "the video has no transcripts".into(),
    })?;
    let rest = &html[start + CAPTION_TRACKS_KEY.len()..];
    serde_json::Deserializer::from_str(rest)
        .into_iter::<Vec<CaptionTrack>>()
        .next()
        .ok_or_else(|| AgentError::Source {
            service: SERVICE,
            reason: "caption track list is empty".into(),
        })?
        .map_err(AgentError::from)
}

/// 按语言偏好选轨道：同一语言中人工字幕优先于自动生成
pub fn pick_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Result<&'a CaptionTrack> {
    languages
        .iter()
        .find_map(|language| {
            let matching: Vec<&CaptionTrack> =
                tracks.iter().filter(|track| track.matches(language)).collect();
            matching
                .iter()
                .find(|track| !track.is_generated())
                .or_else(|| matching.first())
                .copied()
        })
        .ok_or_else(|| AgentError::Source {
            service: SERVICE,
            reason: format!(
                "no transcript in {:?}; available: {:?}",
                languages,
                tracks.iter().map(|t| t.language_code.as_str()).collect::<Vec<_>>()
            ),
        })
}

fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// 把 timedtext XML 拼成一段纯文本
pub fn transcript_text(xml: &str) -> Result<String> {
    let segment = compiled(&TEXT_SEGMENT)?;
    let inline_tag = compiled(&INLINE_TAG)?;

    let parts: Vec<String> = segment
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            // timedtext 的正文常被转义两次
            let decoded = decode_entities(&decode_entities(m.as_str()));
            inline_tag
                .replace_all(&decoded, "")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect();
    Ok(parts.join(" "))
}

/// 字幕来源接缝，测试中以内存实现替换
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn transcript(&self, video_id: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct YoutubeTranscripts {
    http: reqwest::Client,
    languages: Vec<String>,
}

impl YoutubeTranscripts {
    pub fn new(config: &SourcesConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            languages: config.youtube_languages.clone(),
        }
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.8")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AgentError::Source {
                service: SERVICE,
                reason: format!("{} returned {}", url, status),
            });
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscripts {
    async fn transcript(&self, video_id: &str) -> Result<String> {
        let page = self
            .fetch(&format!("https://www.youtube.com/watch?v={}", video_id))
            .await?;
        let tracks = caption_tracks(&page)?;
        let track = pick_track(&tracks, &self.languages)?;
        tracing::debug!(video_id, language = %track.language_code, "downloading transcript");

        let xml = self.fetch(&track.base_url).await?;
        let text = transcript_text(&xml)?;
        if text.is_empty() {
            return Err(AgentError::Source {
                service: SERVICE,
                reason: format!("transcript for {} is empty", video_id),
            });
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_from_common_links() {
        for link in [
            "dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://m.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
        ] {
            assert_eq!(parse_video_id(link).unwrap(), "dQw4w9WgXcQ", "{link}");
        }
    }

    #[test]
    fn test_non_youtube_links_are_rejected() {
        for link in ["", "https://vimeo.com/123456", "https://www.youtube.com/watch?v=short", "not a url"] {
            assert!(
                matches!(parse_video_id(link), Err(AgentError::InvalidInput(_))),
                "{link}"
            );
        }
    }

    #[test]
    fn test_caption_tracks_are_read_from_player_response() {
        let html = r#"<script>var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=x&lang=en","name":{"simpleText":"English"},"languageCode":"en","kind":"asr"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=x&lang=bn","languageCode":"bn"}],"audioTracks":[]}}};</script>"#;

        let tracks = caption_tracks(html).unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].base_url, "https://www.youtube.com/api/timedtext?v=x&lang=en");
        assert!(tracks[0].is_generated());
        assert_eq!(tracks[1].language_code, "bn");
    }

    #[test]
    fn test_page_without_captions_is_source_error() {
        assert!(matches!(
            caption_tracks("<html>no captions here</html>"),
            Err(AgentError::Source { .. })
        ));
    }

    #[test]
    fn test_track_preference() {
        let track = |code: &str, kind: Option<&str>| CaptionTrack {
            base_url: format!("https://t/{code}"),
            language_code: code.into(),
            kind: kind.map(str::to_string),
        };
        let tracks = vec![
            track("en", Some("asr")),
            track("en-GB", None),
            track("ar", None),
        ];
        let languages = vec!["bn".to_string(), "en".to_string(), "ar".to_string()];

        // bn 不存在时退到 en，且人工字幕优先
        assert_eq!(pick_track(&tracks, &languages).unwrap().language_code, "en-GB");
        assert!(pick_track(&tracks, &["fr".to_string()]).is_err());
        assert!(!track("eng", None).matches("en"));
    }

    #[test]
    fn test_transcript_text_decodes_segments() {
        let xml = r##"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.5" dur="2.1">Hello &amp;amp; welcome</text><text start="2.6" dur="1.9">it&amp;#39;s <font color="#E5E5E5">day</font>
one</text><text start="5" dur="1"></text></transcript>"##;
        assert_eq!(transcript_text(xml).unwrap(), "Hello & welcome it's day one");
    }
}
