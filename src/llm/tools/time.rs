//! 时间查询工具

use rig::tool::Tool;
use serde::{Deserialize, Serialize};

/// 当前日期的默认格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 今天的本地日期（YYYY-MM-DD）
pub fn today() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}

/// 时间工具
#[derive(Debug, Clone, Default)]
pub struct AgentToolTime;

/// 时间查询参数
#[derive(Debug, Deserialize)]
pub struct TimeArgs {
    #[serde(rename = "format")]
    pub format: Option<String>,
}

/// 时间查询结果
#[derive(Debug, Serialize)]
pub struct TimeResult {
    pub date: String,
    pub current_time: String,
    pub utc_time: String,
    pub timestamp: i64,
}

#[derive(Debug, thiserror::Error)]
#[error("time tool error")]
pub struct TimeToolError;

impl AgentToolTime {
    pub fn new() -> Self {
        Self
    }

    fn current_time(&self, args: &TimeArgs) -> TimeResult {
        let format = args.format.as_deref().unwrap_or("%Y-%m-%d %H:%M:%S");
        let local = chrono::Local::now();
        let utc = local.with_timezone(&chrono::Utc);

        TimeResult {
            date: local.format(DATE_FORMAT).to_string(),
            current_time: local.format(format).to_string(),
            utc_time: utc.format(format).to_string(),
            timestamp: utc.timestamp(),
        }
    }
}

impl Tool for AgentToolTime {
    const NAME: &'static str = "time";

    type Error = TimeToolError;
    type Args = TimeArgs;
    type Output = TimeResult;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Get today's date (YYYY-MM-DD) together with the current local time, UTC time and Unix timestamp.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "format": {
                        "type": "string",
                        "description": "chrono format string for the time fields (default '%Y-%m-%d %H:%M:%S')"
                    }
                },
                "required": []
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...time@{:?}", args);
        Ok(self.current_time(&args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_is_iso_date() {
        let date = today();
        assert_eq!(date.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&date, DATE_FORMAT).is_ok());
    }

    #[tokio::test]
    async fn test_tool_call_uses_custom_format() {
        let tool = AgentToolTime::new();
        let result = tool
            .call(TimeArgs {
                format: Some("%Y".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(result.current_time.len(), 4);
        assert_eq!(result.date.len(), 10);
        assert!(result.timestamp > 0);
    }
}
