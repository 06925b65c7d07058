//! 简历筛选：逐份读取简历，先做是否匹配的二元判定，匹配的再提取候选人画像写入表格

use std::path::Path;

use crate::error::{AgentError, Result};
use crate::llm::ModelGateway;

mod document;
mod profile;
mod sheet;

pub use document::{
    ResumeDocument, SUPPORTED_EXTENSIONS, is_supported, list_resumes, load_resume, read_resume,
};
pub use profile::{CandidateProfile, FitGrade};
pub use sheet::{EvaluationSheet, SHEET_HEADER};

const GRADE_PROMPT: &str = r#"You are an expert in evaluating resumes for applicant tracking systems.
Decide whether the candidate is a suitable match for the job description, taking any special requirements into account.
Judge relevance of skills, experience and qualifications, clarity of the content, professional presentation and overall suitability.
Set `grade` to true if the resume is a good fit for the job, otherwise false."#;

const EVALUATE_PROMPT: &str = r#"You are an expert in evaluating resumes for applicant tracking systems.
Extract the candidate's profile from the resume and assess it against the job description and any special requirements.
List the candidate's strengths for this role and the concrete gaps between the resume and the job description.
Only use information present in the resume; leave a field empty when the resume does not contain it."#;

/// 职位要求
#[derive(Debug, Clone, PartialEq)]
pub struct JobBrief {
    pub description: String,
    pub requirements: String,
}

impl JobBrief {
    pub fn new(description: impl Into<String>, requirements: impl Into<String>) -> Result<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(AgentError::InvalidInput(
                "job description must not be empty".into(),
            ));
        }
        Ok(Self {
            description,
            requirements: requirements.into(),
        })
    }

    fn render(&self, resume: &str) -> String {
        format!(
            "Resume:\n{}\n\nJob Description:\n{}\n\nSpecial Requirements (if any):\n{}",
            resume, self.description, self.requirements
        )
    }
}

/// 单份简历的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum ScreeningOutcome {
    Shortlisted(CandidateProfile),
    Rejected,
}

/// 一次批量筛选的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScreeningSummary {
    pub scanned: usize,
    pub shortlisted: usize,
    pub rejected: usize,
    pub failed: Vec<String>,
}

pub struct ResumeScreener<G: ModelGateway> {
    gateway: G,
    brief: JobBrief,
}

impl<G: ModelGateway> ResumeScreener<G> {
    pub fn new(gateway: G, brief: JobBrief) -> Self {
        Self { gateway, brief }
    }

    /// 二元判定：简历是否匹配职位
    pub async fn grade(&self, resume: &str) -> Result<bool> {
        let grade: FitGrade = self
            .gateway
            .extract(GRADE_PROMPT, &self.brief.render(resume))
            .await?;
        Ok(grade.grade)
    }

    /// 提取候选人画像
    pub async fn evaluate(&self, resume: &str) -> Result<CandidateProfile> {
        self.gateway
            .extract(EVALUATE_PROMPT, &self.brief.render(resume))
            .await
    }

    pub async fn screen(&self, document: &ResumeDocument) -> Result<ScreeningOutcome> {
        if !self.grade(&document.content).await? {
            return Ok(ScreeningOutcome::Rejected);
        }
        let profile = self.evaluate(&document.content).await?;
        Ok(ScreeningOutcome::Shortlisted(profile))
    }

    /// 处理目录下全部简历；单份失败只记录，不中断批次
    pub async fn screen_folder(
        &self,
        folder: &Path,
        sheet: &EvaluationSheet,
    ) -> Result<ScreeningSummary> {
        let files = list_resumes(folder)?;
        let mut summary = ScreeningSummary::default();
        println!("📄 发现 {} 份简历", files.len());

        for path in files {
            println!("🔍 Scanning Resume: {}", path.display());
            summary.scanned += 1;

            let outcome = match load_resume(&path).await {
                Ok(document) => self
                    .screen(&document)
                    .await
                    .map(|outcome| (document, outcome)),
                Err(e) => Err(e),
            };

            match outcome {
                Ok((document, ScreeningOutcome::Shortlisted(profile))) => {
                    sheet.append(&profile, &document.file_name)?;
                    summary.shortlisted += 1;
                    println!("✅ {} 匹配，已写入 {}", document.file_name, sheet.path().display());
                }
                Ok((document, ScreeningOutcome::Rejected)) => {
                    summary.rejected += 1;
                    println!("⏭️ {} 不匹配", document.file_name);
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), "resume screening failed: {}", e);
                    eprintln!("❌ {} 处理失败: {}", path.display(), e);
                    summary.failed.push(path.display().to_string());
                }
            }
        }

        Ok(summary)
    }
}
