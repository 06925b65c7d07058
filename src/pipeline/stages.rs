//! 创业想法验证的四个阶段

use async_trait::async_trait;

use super::stage::Stage;
use super::state::{IdeaClarification, IdeaState, MarketResearch};
use crate::error::{AgentError, Result};
use crate::llm::tools::time::today;
use crate::llm::{ModelGateway, Toolset};

const CLARIFIER_PROMPT: &str = r#"You refine startup ideas.
Given a founder's startup idea:
- assess how original it is compared with existing products and concepts,
- state the mission of the company in one or two sentences,
- list the concrete objectives of the company.
Also fill in today's date."#;

const MARKET_RESEARCH_PROMPT: &str = r#"You are a market analyst. You receive a startup idea together with the company's mission and objectives.
- Estimate the total addressable market (TAM), the serviceable available market (SAM) and the serviceable obtainable market (SOM), citing figures and sources where possible.
- Define the target customer segments and describe their characteristics.
- Use the web search tool whenever current data would improve the estimate."#;

const MARKET_EXTRACT_PROMPT: &str = r#"Convert the market research notes you are given into the requested structure.
Keep the figures, sources and reasoning from the notes; do not invent new numbers."#;

const COMPETITOR_PROMPT: &str = r#"You are a competitive intelligence analyst. You receive a startup idea and market research about it.
- Identify the existing competitors in this market.
- Perform a SWOT analysis (strengths, weaknesses, opportunities, threats) for each competitor.
- Assess how the startup could position itself relative to these competitors.
Use the web search tool to find real companies. Answer in markdown."#;

const REPORT_PROMPT: &str = r#"You receive a startup idea and all research gathered about it.
Summarise everything into a single validation report with sections for the idea, mission and objectives, market sizing, target customers, competition and a final recommendation.
Keep the tone professional and data-driven."#;

fn require<'a, T>(value: &'a Option<T>, stage: &'static str, field: &'static str) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or(AgentError::MissingField { stage, field })
}

fn non_blank(text: String, stage: &'static str, field: &'static str) -> Result<String> {
    if text.trim().is_empty() {
        Err(AgentError::EmptyOutput { stage, field })
    } else {
        Ok(text)
    }
}

/// 汇总所有前序字段，作为报告生成的上下文
pub fn render_report_context(state: &IdeaState) -> Result<String> {
    const STAGE: &str = ReportGenerator::NAME;
    let clarification = require(&state.clarification, STAGE, "clarification")?;
    let market_research = require(&state.market_research, STAGE, "market_research")?;
    let competitor_analysis = require(&state.competitor_analysis, STAGE, "competitor_analysis")?;
    if competitor_analysis.trim().is_empty() {
        return Err(AgentError::EmptyOutput {
            stage: STAGE,
            field: "competitor_analysis",
        });
    }

    Ok(format!(
        "startup_idea: {}\n\nidea_clarification:\n{}\n\nmarket_research:\n{}\n\ncompetitor_analysis_report:\n{}\n",
        state.idea, clarification, market_research, competitor_analysis
    ))
}

/// 创意澄清：结构化提取原创性、使命与目标
pub struct IdeaClarifier;

impl IdeaClarifier {
    pub const NAME: &'static str = "idea_clarifier";
}

#[async_trait]
impl<G: ModelGateway> Stage<G> for IdeaClarifier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn advance(&self, gateway: &G, mut state: IdeaState) -> Result<IdeaState> {
        let user_prompt = format!("startup_idea: {}", state.idea);
        let mut clarification: IdeaClarification =
            gateway.extract(CLARIFIER_PROMPT, &user_prompt).await?;
        if clarification.is_blank() {
            return Err(AgentError::EmptyOutput {
                stage: Self::NAME,
                field: "clarification",
            });
        }
        // 日期以本地时钟为准，不信任模型给出的值
        clarification.current_date = today();
        state.clarification = Some(clarification);
        Ok(state)
    }
}

/// 市场调研：带搜索工具的ReAct调研，再把笔记提取为结构化结果
pub struct MarketResearcher;

impl MarketResearcher {
    pub const NAME: &'static str = "market_research";
}

#[async_trait]
impl<G: ModelGateway> Stage<G> for MarketResearcher {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn advance(&self, gateway: &G, mut state: IdeaState) -> Result<IdeaState> {
        let clarification = require(&state.clarification, Self::NAME, "clarification")?;
        let user_prompt = format!(
            "startup_idea: {}\n\nidea_clarification:\n{}",
            state.idea, clarification
        );

        let notes = gateway
            .prompt_with_tools(MARKET_RESEARCH_PROMPT, &user_prompt, Toolset::Research)
            .await?;
        let notes = non_blank(notes, Self::NAME, "market_research")?;

        let extract_prompt = format!("{}\n\nresearch_notes:\n{}", user_prompt, notes);
        let research: MarketResearch = gateway
            .extract(MARKET_EXTRACT_PROMPT, &extract_prompt)
            .await?;
        if research.is_blank() {
            return Err(AgentError::EmptyOutput {
                stage: Self::NAME,
                field: "market_research",
            });
        }
        state.market_research = Some(research);
        Ok(state)
    }
}

/// 竞品分析：带搜索工具的自由文本分析
pub struct CompetitorAnalyst;

impl CompetitorAnalyst {
    pub const NAME: &'static str = "competitor_analysis";
}

#[async_trait]
impl<G: ModelGateway> Stage<G> for CompetitorAnalyst {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn advance(&self, gateway: &G, mut state: IdeaState) -> Result<IdeaState> {
        let research = require(&state.market_research, Self::NAME, "market_research")?;
        let user_prompt = format!(
            "startup_idea: {}\n\nmarket_research:\n{}",
            state.idea, research
        );

        let analysis = gateway
            .prompt_with_tools(COMPETITOR_PROMPT, &user_prompt, Toolset::Research)
            .await?;
        state.competitor_analysis = Some(non_blank(analysis, Self::NAME, "competitor_analysis")?);
        Ok(state)
    }
}

/// 报告生成：汇总全部字段，输出自由文本报告
pub struct ReportGenerator;

impl ReportGenerator {
    pub const NAME: &'static str = "report_generator";
}

#[async_trait]
impl<G: ModelGateway> Stage<G> for ReportGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn advance(&self, gateway: &G, mut state: IdeaState) -> Result<IdeaState> {
        let context = render_report_context(&state)?;
        let report = gateway.prompt(REPORT_PROMPT, &context).await?;
        state.final_report = Some(non_blank(report, Self::NAME, "final_report")?);
        Ok(state)
    }
}
