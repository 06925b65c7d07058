use std::path::{Path, PathBuf};

use crate::error::{AgentError, Result};

/// 支持的简历格式
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "txt", "md"];

/// 一份已读取的简历
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDocument {
    pub path: PathBuf,
    pub file_name: String,
    pub content: String,
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

pub fn is_supported(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// 列出目录下受支持的简历文件（不递归，按文件名排序）
pub fn list_resumes(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(AgentError::InvalidInput(format!(
            "resume folder '{}' does not exist",
            folder.display()
        )));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_file() && is_supported(&path) {
            files.push(path);
        } else {
            tracing::debug!("skipping {}", path.display());
        }
    }
    files.sort();
    Ok(files)
}

/// 读取单份简历的纯文本
pub fn read_resume(path: &Path) -> Result<ResumeDocument> {
    let document_error = |reason: String| AgentError::Document {
        path: path.display().to_string(),
        reason,
    };

    let content = match extension_of(path).as_deref() {
        Some("pdf") => {
            pdf_extract::extract_text(path).map_err(|e| document_error(e.to_string()))?
        }
        Some("txt") | Some("md") => std::fs::read_to_string(path)?,
        _ => return Err(document_error("unsupported file type".into())),
    };

    if content.trim().is_empty() {
        return Err(document_error("no text content".into()));
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(ResumeDocument {
        path: path.to_path_buf(),
        file_name,
        content,
    })
}

/// 在阻塞线程池中读取简历，PDF解析不占用异步运行时
pub async fn load_resume(path: &Path) -> Result<ResumeDocument> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_resume(&owned))
        .await
        .map_err(|e| AgentError::Document {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?
}
