use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 创意澄清结果
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct IdeaClarification {
    /// Originality of the idea compared with existing concepts.
    pub originality: String,
    /// Mission of the company.
    pub mission: String,
    /// Objectives of the company.
    pub objectives: String,
    /// Current date (YYYY-MM-DD).
    pub current_date: String,
}

impl IdeaClarification {
    pub fn is_blank(&self) -> bool {
        [&self.originality, &self.mission, &self.objectives]
            .iter()
            .any(|field| field.trim().is_empty())
    }
}

impl fmt::Display for IdeaClarification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "originality: {}", self.originality)?;
        writeln!(f, "mission: {}", self.mission)?;
        writeln!(f, "objectives: {}", self.objectives)?;
        write!(f, "current_date: {}", self.current_date)
    }
}

/// 市场调研结果
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MarketResearch {
    /// Total addressable market (TAM).
    pub total_addressable_market: String,
    /// Serviceable available market (SAM).
    pub serviceable_available_market: String,
    /// Serviceable obtainable market (SOM).
    pub serviceable_obtainable_market: String,
    /// Target customer segments and their characteristics.
    pub target_customer_segments: String,
}

impl MarketResearch {
    pub fn is_blank(&self) -> bool {
        [
            &self.total_addressable_market,
            &self.serviceable_available_market,
            &self.serviceable_obtainable_market,
            &self.target_customer_segments,
        ]
        .iter()
        .any(|field| field.trim().is_empty())
    }
}

impl fmt::Display for MarketResearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total_addressable_market: {}", self.total_addressable_market)?;
        writeln!(
            f,
            "serviceable_available_market: {}",
            self.serviceable_available_market
        )?;
        writeln!(
            f,
            "serviceable_obtainable_market: {}",
            self.serviceable_obtainable_market
        )?;
        write!(f, "target_customer_segments: {}", self.target_customer_segments)
    }
}

/// 流水线共享的状态记录，字段从左到右依次填充
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdeaState {
    pub idea: String,
    pub clarification: Option<IdeaClarification>,
    pub market_research: Option<MarketResearch>,
    pub competitor_analysis: Option<String>,
    pub final_report: Option<String>,
}

impl IdeaState {
    pub fn new(idea: impl Into<String>) -> Self {
        Self {
            idea: idea.into(),
            clarification: None,
            market_research: None,
            competitor_analysis: None,
            final_report: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.clarification.is_some()
            && self.market_research.is_some()
            && self.competitor_analysis.is_some()
            && self.final_report.is_some()
    }
}
