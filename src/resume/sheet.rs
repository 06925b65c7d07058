use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use super::profile::CandidateProfile;
use crate::error::Result;

pub const SHEET_HEADER: [&str; 10] = [
    "name",
    "email",
    "phone",
    "summary",
    "education",
    "skills",
    "projects",
    "strengths",
    "gaps",
    "filename",
];

const LIST_SEPARATOR: &str = "; ";

/// 追加写入的CSV评估表
pub struct EvaluationSheet {
    path: PathBuf,
}

impl EvaluationSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一行；文件不存在或为空时先写表头
    pub fn append(&self, profile: &CandidateProfile, file_name: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let needs_header = std::fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record(SHEET_HEADER)?;
        }
        let lists = [
            &profile.education,
            &profile.skills,
            &profile.projects,
            &profile.strengths,
            &profile.gaps,
        ]
        .map(|items| items.join(LIST_SEPARATOR));

        let mut row = vec![
            profile.name.clone(),
            profile.email.clone(),
            profile.phone.clone(),
            profile.summary.clone().unwrap_or_default(),
        ];
        row.extend(lists);
        row.push(file_name.to_string());
        writer.write_record(&row)?;
        writer.flush()?;
        Ok(())
    }
}
