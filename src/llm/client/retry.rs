//! 限流重试 - 指数退避加随机抖动

use rand::Rng;
use std::future::Future;
use std::time::Duration;

use crate::config::LLMConfig;
use crate::error::Result;
use crate::llm::tools::ToolActivity;

/// 重试策略
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 首次调用之外最多再尝试的次数
    pub max_retries: u32,
    /// 第一次重试前的基础等待时间
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl From<&LLMConfig> for RetryPolicy {
    fn from(config: &LLMConfig) -> Self {
        Self {
            max_retries: config.retry_attempts,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// 第 `retry` 次重试（从0开始）前的等待时间：base * 2^retry * (0.5 + U[0,1))
    pub fn delay_for(&self, retry: u32) -> Duration {
        let jitter = 0.5 + rand::rng().random::<f64>();
        let exponent = 2f64.powi(retry.min(30) as i32);
        self.base_delay.mul_f64(exponent * jitter)
    }
}

/// 对限流类错误进行重试，其余错误立即返回。
///
/// 总尝试次数最多为 `max_retries + 1`，预算耗尽后返回最后一次的错误。
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_while(policy, || true, operation).await
}

/// 用于多轮工具调用：一旦有带副作用的工具执行过，限流错误直接返回而不再重跑整个流程
pub async fn retry_before_side_effects<T, F, Fut>(
    policy: &RetryPolicy,
    activity: &ToolActivity,
    operation: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_while(
        policy,
        || {
            let idle = activity.is_idle();
            if !idle {
                tracing::warn!(
                    tool_calls = activity.count(),
                    "not retrying: side-effecting tools already ran"
                );
            }
            idle
        },
        operation,
    )
    .await
}

async fn retry_while<T, F, Fut, P>(policy: &RetryPolicy, may_retry: P, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn() -> bool,
{
    let mut retries = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(err) if err.is_retryable() && may_retry() => {
                if retries >= policy.max_retries {
                    tracing::warn!(attempts = retries + 1, "retry budget exhausted: {}", err);
                    return Err(err);
                }

                let delay = policy.delay_for(retries);
                eprintln!(
                    "⏳ 模型服务限流，{:.2}秒后重试 (第 {} / {} 次重试)",
                    delay.as_secs_f64(),
                    retries + 1,
                    policy.max_retries
                );
                tokio::time::sleep(delay).await;
                retries += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
