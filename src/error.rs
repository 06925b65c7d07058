//! 统一错误类型 - 按外部依赖划分，便于区分可重试与致命错误

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("text generation failed: {0}")]
    Generation(String),

    #[error("model provider is rate limiting requests: {0}")]
    RateLimited(String),

    #[error("model output could not be coerced into `{target}`: {reason}")]
    StructuredOutput { target: String, reason: String },

    #[error("web search failed: {0}")]
    Search(String),

    #[error("{service} request failed: {reason}")]
    Source {
        service: &'static str,
        reason: String,
    },

    #[error("WHOIS query failed: {0}")]
    Whois(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("`{operation}` timed out after {seconds:.1}s")]
    Timeout { operation: String, seconds: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage error: {0}")]
    Session(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("could not read document `{path}`: {reason}")]
    Document { path: String, reason: String },

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] csv::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("stage `{stage}` requires `{field}`, which has not been produced yet")]
    MissingField {
        stage: &'static str,
        field: &'static str,
    },

    #[error("stage `{stage}` produced an empty `{field}`")]
    EmptyOutput {
        stage: &'static str,
        field: &'static str,
    },
}

pub type Result<T, E = AgentError> = std::result::Result<T, E>;

/// 限流类错误的特征片段（统一转小写后匹配）
const RATE_LIMIT_MARKERS: [&str; 9] = [
    "status 429",
    "status code 429",
    "http 429",
    "error 429",
    "429 too many",
    "rate limit",
    "ratelimit",
    "throttl",
    "too many requests",
];

impl AgentError {
    /// 将模型服务商返回的错误归类：限流错误可重试，其余视为生成失败
    pub fn from_provider(err: impl std::fmt::Display) -> Self {
        let message = err.to_string();
        let lowered = message.to_lowercase();
        if RATE_LIMIT_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            AgentError::RateLimited(message)
        } else {
            AgentError::Generation(message)
        }
    }

    /// 是否属于可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, AgentError::RateLimited(_))
    }
}

#[cfg(test)]
mod tests {
    use super::AgentError;

    #[test]
    fn test_provider_errors_are_classified() {
        assert!(AgentError::from_provider("HTTP status 429: slow down").is_retryable());
        assert!(AgentError::from_provider("ThrottlingException: Rate exceeded").is_retryable());
        assert!(AgentError::from_provider("Too Many Requests").is_retryable());
        assert!(AgentError::from_provider("HTTP 429 Too Many Requests").is_retryable());
        assert!(!AgentError::from_provider("invalid api key").is_retryable());
        assert!(
            !AgentError::from_provider("invalid request: offset 4290 exceeds context")
                .is_retryable()
        );
        assert!(!AgentError::from_provider("model id gpt-429b not found").is_retryable());
    }

    #[test]
    fn test_only_rate_limits_are_retryable() {
        assert!(!AgentError::InvalidInput("x".into()).is_retryable());
        assert!(
            !AgentError::EmptyOutput {
                stage: "report_generator",
                field: "final_report"
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_timeouts_name_the_operation() {
        let err = AgentError::Timeout {
            operation: "sleep 5".into(),
            seconds: 1.0,
        };
        assert_eq!(err.to_string(), "`sleep 5` timed out after 1.0s");
        assert!(!err.is_retryable());
    }
}
