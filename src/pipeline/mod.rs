//! 创业想法验证流水线：澄清 → 市场调研 → 竞品分析 → 报告
//!
//! 各阶段严格串行，每个阶段接收上一阶段的状态并返回新状态；任一阶段失败即终止。

use crate::error::{AgentError, Result};
use crate::llm::ModelGateway;
use crate::workflow::TimingScope;

mod stage;
mod stages;
mod state;

pub use stage::Stage;
pub use stages::{
    CompetitorAnalyst, IdeaClarifier, MarketResearcher, ReportGenerator, render_report_context,
};
pub use state::{IdeaClarification, IdeaState, MarketResearch};

/// 按固定顺序执行的阶段列表
pub struct IdeaPipeline<G: ModelGateway> {
    gateway: G,
    stages: Vec<Box<dyn Stage<G>>>,
}

impl<G: ModelGateway> IdeaPipeline<G> {
    /// 默认的四个阶段
    pub fn new(gateway: G) -> Self {
        let stages: Vec<Box<dyn Stage<G>>> = vec![
            Box::new(IdeaClarifier) as Box<dyn Stage<G>>,
            Box::new(MarketResearcher) as Box<dyn Stage<G>>,
            Box::new(CompetitorAnalyst) as Box<dyn Stage<G>>,
            Box::new(ReportGenerator) as Box<dyn Stage<G>>,
        ];
        Self::with_stages(gateway, stages)
    }

    pub fn with_stages(gateway: G, stages: Vec<Box<dyn Stage<G>>>) -> Self {
        Self { gateway, stages }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// 校验输入后依次执行全部阶段，返回最终状态与计时信息
    pub async fn run(&self, idea: &str) -> Result<(IdeaState, TimingScope)> {
        let idea = idea.trim();
        if idea.is_empty() {
            return Err(AgentError::InvalidInput(
                "startup idea must not be empty".into(),
            ));
        }

        let mut timing = TimingScope::new();
        let mut state = IdeaState::new(idea);

        for stage in &self.stages {
            let name = stage.name();
            println!("🤖 执行 {} 阶段...", name);
            timing.start_phase(name);

            state = stage.advance(&self.gateway, state).await.inspect_err(|e| {
                tracing::error!(stage = name, "stage failed: {}", e);
            })?;

            if let Some(elapsed) = timing.end_phase(name) {
                tracing::info!(stage = name, elapsed_ms = elapsed.as_millis() as u64, "stage finished");
                println!("✓ {} 阶段完成，耗时 {:.2}秒", name, elapsed.as_secs_f64());
            }
        }

        Ok((state, timing))
    }
}
