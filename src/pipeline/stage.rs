use async_trait::async_trait;

use super::state::IdeaState;
use crate::error::Result;
use crate::llm::ModelGateway;

/// 流水线中的一个阶段：接收状态，返回多填充了一个字段的新状态
#[async_trait]
pub trait Stage<G: ModelGateway>: Send + Sync {
    fn name(&self) -> &'static str;

    async fn advance(&self, gateway: &G, state: IdeaState) -> Result<IdeaState>;
}
