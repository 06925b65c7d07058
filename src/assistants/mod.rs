//! 单Agent助手：金融问答、PubMed文献检索、营养规划，以及 Hacker News 与 YouTube 摘要

use std::fmt;

use crate::error::{AgentError, Result};
use crate::llm::tools::time::today;
use crate::llm::{ModelGateway, Toolset};

mod hackernews;
mod video;

pub use hackernews::{HnArticle, HnDigest};
pub use video::{VideoStyle, VideoSummarizer, VideoSummary};

const FINANCE_PROMPT: &str = r#"You are a financial analysis expert.

Your job is to:
1. Search the web for the latest financial news, prices and analyst coverage relevant to the question.
2. Detect trends, investor sentiment or major market movements.
3. When the user compares companies (e.g. NVDA vs Microsoft), evaluate both and give a reasoned investment suggestion.
4. Use markdown formatting, with bullet points or tables where useful.
5. Be honest: if data is limited, say so and recommend caution.

Cite the sources you used. This is not personalised financial advice."#;

const PUBMED_PROMPT: &str = r#"You are a knowledgeable and helpful medical research assistant.
When responding, search PubMed with the pubmed_search tool for relevant peer-reviewed articles.
Summarize the findings clearly and concisely in a structured format (sections or bullet points).
Make sure every answer is accurate and medically sound, and include references with article titles and PubMed links.
If PubMed returns nothing useful, say so instead of guessing."#;

const NUTRITION_PROMPT: &str = r#"You are NutriPlan Pro, a nutritional planning expert covering personalised meal planning, therapeutic diets, macro and micronutrient balancing, cultural food adaptation, budget-friendly nutrition, sports nutrition, weight management and food allergies.

Build every plan in these steps:
1. Client assessment: age, gender, height, weight, activity level, health conditions, medications, allergies, preferences and location.
2. Requirements: estimate BMR and TDEE, then set calorie, macronutrient and key micronutrient targets.
3. Regional food research: seasonal, affordable and locally available ingredients and cooking methods.
4. Meal plan: breakfast, morning snack, lunch, afternoon snack and dinner with portions, alternatives and a kcal/protein/carb/fat breakdown for each.
5. Special considerations for conditions, medication interactions and exercise timing.
6. Implementation: weekly shopping list, meal prep notes, hydration and a progress monitoring plan.

Answer in markdown titled "Personalized Nutrition Plan", with a client profile, nutritional requirements, the daily meal plan, shopping list, local alternatives, special considerations and monitoring sections. Use tables for nutrition breakdowns.
End with: "This plan is based on current nutritional science and should be reviewed by a healthcare professional.""#;

/// 助手角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    Finance,
    PubMed,
    Nutrition,
}

impl Persona {
    pub fn name(&self) -> &'static str {
        match self {
            Persona::Finance => "finance",
            Persona::PubMed => "pubmed",
            Persona::Nutrition => "nutrition",
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self {
            Persona::Finance => FINANCE_PROMPT,
            Persona::PubMed => PUBMED_PROMPT,
            Persona::Nutrition => NUTRITION_PROMPT,
        }
    }

    /// 营养规划只靠模型本身，不挂工具
    pub fn toolset(&self) -> Option<Toolset> {
        match self {
            Persona::Finance => Some(Toolset::Research),
            Persona::PubMed => Some(Toolset::PubMed),
            Persona::Nutrition => None,
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 单轮问答助手
pub struct Assistant<G: ModelGateway> {
    gateway: G,
    persona: Persona,
}

impl<G: ModelGateway> Assistant<G> {
    pub fn new(gateway: G, persona: Persona) -> Self {
        Self { gateway, persona }
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub async fn ask(&self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AgentError::InvalidInput("question must not be empty".into()));
        }
        tracing::info!(persona = %self.persona, "assistant request");

        let user_prompt = format!("Current date: {}\n\n{}", today(), question);
        let system_prompt = self.persona.system_prompt();
        let answer = match self.persona.toolset() {
            Some(toolset) => {
                self.gateway
                    .prompt_with_tools(system_prompt, &user_prompt, toolset)
                    .await?
            }
            None => self.gateway.prompt(system_prompt, &user_prompt).await?,
        };

        if answer.trim().is_empty() {
            return Err(AgentError::EmptyOutput {
                stage: self.persona.name(),
                field: "answer",
            });
        }
        Ok(answer)
    }
}

#[cfg(test)]
mod tests;
