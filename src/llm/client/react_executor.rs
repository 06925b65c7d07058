//! ReAct执行器 - 负责执行ReAct模式的多轮对话逻辑

use rig::completion::{AssistantContent, Message, PromptError};

use super::providers::ProviderAgent;
use super::react::{ReActConfig, ReActResponse};
use crate::error::{AgentError, Result};

/// ReAct执行器
pub struct ReActExecutor;

impl ReActExecutor {
    /// 执行ReAct循环逻辑
    pub async fn execute(
        agent: &ProviderAgent,
        user_prompt: &str,
        config: &ReActConfig,
    ) -> Result<ReActResponse> {
        if config.verbose {
            println!(
                "   ♻️ 激活ReAct Agent模式，最大迭代次数: {}",
                config.max_iterations
            );
        }

        match agent.multi_turn(user_prompt, config.max_iterations).await {
            Ok(response) => {
                if config.verbose {
                    println!("   ✅ ReAct Agent任务完成");
                }

                Ok(ReActResponse::success(response, config.max_iterations))
            }
            Err(PromptError::MaxDepthError {
                max_depth,
                chat_history,
                prompt: _,
            }) => {
                tracing::warn!(max_depth, "ReAct agent stopped at max depth");

                if config.return_partial_on_max_depth {
                    let (content, tool_calls) = Self::extract_partial_result(&chat_history);

                    Ok(ReActResponse::max_depth_reached_with_history(
                        format!(
                            "{}\n\n[Note: interrupted after reaching the maximum of {} iterations]",
                            content, max_depth
                        ),
                        max_depth,
                        tool_calls,
                        chat_history.to_vec(),
                    ))
                } else {
                    Err(AgentError::Generation(format!(
                        "ReAct agent did not finish within {} iterations",
                        max_depth
                    )))
                }
            }
            Err(e) => {
                if config.verbose {
                    println!("   ❌ ReAct Agent出错: {:?}", e);
                }
                Err(AgentError::from_provider(e))
            }
        }
    }

    /// 从聊天历史中提取部分结果
    fn extract_partial_result(chat_history: &[Message]) -> (String, Vec<String>) {
        let mut tool_calls = Vec::new();

        // 最后一条带文本的助手消息
        let last_assistant_message = chat_history
            .iter()
            .rev()
            .find_map(|msg| {
                if let Message::Assistant { content, .. } = msg {
                    let text_content = content
                        .iter()
                        .filter_map(|c| {
                            if let AssistantContent::Text(text) = c {
                                Some(text.text.clone())
                            } else {
                                None
                            }
                        })
                        .collect::<Vec<_>>()
                        .join("\n");

                    if !text_content.is_empty() {
                        Some(text_content)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or_else(|| {
                "The agent was interrupted before producing a complete answer.".to_string()
            });

        for msg in chat_history {
            if let Message::Assistant { content, .. } = msg {
                for c in content.iter() {
                    if let AssistantContent::ToolCall(tool_call) = c {
                        tool_calls.push(format!(
                            "{}({})",
                            tool_call.function.name, tool_call.function.arguments
                        ));
                    }
                }
            }
        }

        (last_assistant_message, tool_calls)
    }
}
