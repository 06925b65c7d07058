use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 初筛结论
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FitGrade {
    /// true if the resume is a good fit for the job, otherwise false.
    pub grade: bool,
}

/// 候选人画像
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct CandidateProfile {
    /// Full name of the candidate.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// A brief summary of the candidate's professional background.
    #[serde(default)]
    pub summary: Option<String>,
    /// Educational qualifications.
    #[serde(default)]
    pub education: Vec<String>,
    /// Key technical and soft skills.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Relevant personal or professional projects.
    #[serde(default)]
    pub projects: Vec<String>,
    /// Candidate's strengths.
    #[serde(default)]
    pub strengths: Vec<String>,
    /// Gaps between the resume and the job description, e.g. missing 2 years of required experience.
    #[serde(default)]
    pub gaps: Vec<String>,
}
