//! 文件工具集 - 以 base_dir 为根的文件系统操作
//!
//! 所有公开操作都返回字符串：成功时为结果文本或JSON，失败时为 `Error ...` 形式的说明，
//! 错误不会越过这一边界。

use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

use crate::error::{AgentError, Result};

/// 文件工具集，克隆后共享同一个 base_dir
#[derive(Debug, Clone)]
pub struct FileToolkit {
    base_dir: Arc<RwLock<PathBuf>>,
}

fn to_pretty(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn epoch_secs(time: std::io::Result<SystemTime>) -> Option<f64> {
    time.ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
}

#[cfg(unix)]
fn permissions(meta: &fs::Metadata) -> Option<String> {
    use std::os::unix::fs::PermissionsExt;
    Some(format!("{:o}", meta.permissions().mode() & 0o777))
}

#[cfg(not(unix))]
fn permissions(_meta: &fs::Metadata) -> Option<String> {
    None
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

impl FileToolkit {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Arc::new(RwLock::new(base_dir.into())),
        }
    }

    /// 当前的 base_dir
    pub fn base_dir(&self) -> PathBuf {
        match self.base_dir.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_base_dir(&self, path: PathBuf) {
        match self.base_dir.write() {
            Ok(mut guard) => *guard = path,
            Err(poisoned) => *poisoned.into_inner() = path,
        }
    }

    /// 相对路径以 base_dir 为根解析，绝对路径保持不变
    fn resolve(&self, path: &str) -> PathBuf {
        self.base_dir().join(path)
    }

    /// 解析目录参数，失败时直接给出面向调用方的错误文本
    fn resolve_dir(&self, path: Option<&str>) -> std::result::Result<PathBuf, String> {
        let target = match path {
            Some(p) if !p.trim().is_empty() => self.resolve(p),
            _ => self.base_dir(),
        };
        if !target.exists() {
            return Err(format!("Error: Directory '{}' does not exist", target.display()));
        }
        if !target.is_dir() {
            return Err(format!("Error: '{}' is not a directory", target.display()));
        }
        Ok(target)
    }

    pub fn save_file(&self, contents: &str, file_name: &str, overwrite: bool) -> String {
        let path = self.resolve(file_name);
        tracing::debug!("saving contents to {}", path.display());
        let result = (|| -> Result<String> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            if path.exists() && !overwrite {
                return Ok(format!("File {} already exists", file_name));
            }
            fs::write(&path, contents)?;
            Ok(file_name.to_string())
        })();
        result.unwrap_or_else(|e| format!("Error saving to file: {}", e))
    }

    pub fn read_file(&self, file_name: &str) -> String {
        fs::read_to_string(self.resolve(file_name))
            .unwrap_or_else(|e| format!("Error reading file: {}", e))
    }

    /// base_dir 下的直接子项
    pub fn list_files(&self) -> String {
        let result = (|| -> Result<String> {
            let mut entries = fs::read_dir(self.base_dir())?
                .map(|entry| entry.map(|e| e.path().display().to_string()))
                .collect::<std::io::Result<Vec<_>>>()?;
            entries.sort();
            to_pretty(&json!(entries))
        })();
        result.unwrap_or_else(|e| format!("Error reading files: {}", e))
    }

    /// glob 模式搜索，如 `*.txt`、`**/*.rs`
    pub fn search_files(&self, pattern: &str) -> String {
        if pattern.trim().is_empty() {
            return "Error: Pattern cannot be empty".to_string();
        }
        let base = self.base_dir();
        let result = (|| -> Result<String> {
            let full = base.join(pattern);
            let paths = glob::glob(&full.to_string_lossy())
                .map_err(|e| AgentError::InvalidInput(e.to_string()))?;
            let mut files: Vec<String> = paths
                .filter_map(|p| p.ok())
                .map(|p| p.display().to_string())
                .collect();
            files.sort();
            to_pretty(&json!({
                "pattern": pattern,
                "base_directory": base.display().to_string(),
                "matches_found": files.len(),
                "files": files,
            }))
        })();
        result.unwrap_or_else(|e| format!("Error searching files with pattern '{}': {}", pattern, e))
    }

    pub fn list_directory(&self, path: Option<&str>, show_hidden: bool) -> String {
        let target = match self.resolve_dir(path) {
            Ok(target) => target,
            Err(message) => return message,
        };
        let result = (|| -> Result<String> {
            let mut items = Vec::new();
            for entry in fs::read_dir(&target)? {
                let entry = entry?;
                let item = entry.path();
                if !show_hidden && is_hidden(&item) {
                    continue;
                }
                let meta = entry.metadata()?;
                items.push(json!({
                    "name": entry.file_name().to_string_lossy(),
                    "path": item.display().to_string(),
                    "type": if meta.is_dir() { "directory" } else { "file" },
                    "size": if meta.is_file() { Some(meta.len()) } else { None },
                    "modified": epoch_secs(meta.modified()),
                    "permissions": permissions(&meta),
                }));
            }
            items.sort_by(|a, b| {
                (a["type"].as_str(), a["name"].as_str()).cmp(&(b["type"].as_str(), b["name"].as_str()))
            });
            to_pretty(&json!({
                "directory": target.display().to_string(),
                "total_items": items.len(),
                "items": items,
            }))
        })();
        result.unwrap_or_else(|e| format!("Error listing directory: {}", e))
    }

    pub fn list_directory_tree(&self, path: Option<&str>, max_depth: usize) -> String {
        let target = match self.resolve_dir(path) {
            Ok(target) => target,
            Err(message) => return message,
        };
        fn build_tree(path: &Path, depth: usize, max_depth: usize) -> Value {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            if depth > max_depth {
                return json!({ "name": name, "type": "directory", "truncated": true });
            }

            if path.is_dir() {
                let mut node = json!({
                    "name": name,
                    "path": path.display().to_string(),
                    "type": "directory",
                });
                match fs::read_dir(path) {
                    Ok(entries) => {
                        let mut children: Vec<PathBuf> = entries
                            .filter_map(|e| e.ok())
                            .map(|e| e.path())
                            .filter(|p| !is_hidden(p))
                            .collect();
                        children.sort();
                        node["children"] = children
                            .iter()
                            .map(|c| build_tree(c, depth + 1, max_depth))
                            .collect();
                    }
                    Err(_) => node["error"] = json!("Permission denied"),
                }
                node
            } else {
                json!({
                    "name": name,
                    "path": path.display().to_string(),
                    "type": "file",
                    "size": fs::metadata(path).map(|m| m.len()).ok(),
                })
            }
        }

        let result = (|| -> Result<String> {
            to_pretty(&build_tree(&target, 0, max_depth))
        })();
        result.unwrap_or_else(|e| format!("Error creating directory tree: {}", e))
    }

    pub fn create_directory(&self, dir_name: &str, parents: bool) -> String {
        let path = self.resolve(dir_name);
        let result = if parents {
            fs::create_dir_all(&path)
        } else if path.is_dir() {
            Ok(())
        } else {
            fs::create_dir(&path)
        };
        match result {
            Ok(()) => format!("Directory '{}' created successfully", dir_name),
            Err(e) => format!("Error creating directory: {}", e),
        }
    }

    /// 切换 base_dir，后续相对路径都以新目录为根
    pub fn change_directory(&self, path: &str) -> String {
        let candidate = self.resolve(path);
        if !candidate.exists() {
            return format!("Error: Directory '{}' does not exist", path);
        }
        if !candidate.is_dir() {
            return format!("Error: '{}' is not a directory", path);
        }
        match candidate.canonicalize() {
            Ok(new_base) => {
                tracing::info!(
                    "changed base directory from {} to {}",
                    self.base_dir().display(),
                    new_base.display()
                );
                let message = format!("Changed base directory to: {}", new_base.display());
                self.set_base_dir(new_base);
                message
            }
            Err(e) => format!("Error changing directory: {}", e),
        }
    }

    pub fn get_current_directory(&self) -> String {
        self.base_dir().display().to_string()
    }

    pub fn get_file_info(&self, file_name: &str) -> String {
        let path = self.resolve(file_name);
        if !path.exists() {
            return format!("Error: '{}' does not exist", file_name);
        }
        let result = (|| -> Result<String> {
            let meta = fs::metadata(&path)?;
            let mut info = json!({
                "name": path.file_name().map(|n| n.to_string_lossy().to_string()),
                "path": path.display().to_string(),
                "type": if meta.is_dir() { "directory" } else { "file" },
                "size": meta.len(),
                "created": epoch_secs(meta.created()),
                "modified": epoch_secs(meta.modified()),
                "accessed": epoch_secs(meta.accessed()),
                "permissions": permissions(&meta),
            });
            if meta.is_file() {
                info["extension"] = json!(
                    path.extension()
                        .map(|e| format!(".{}", e.to_string_lossy()))
                        .unwrap_or_default()
                );
                info["stem"] = json!(path.file_stem().map(|s| s.to_string_lossy().to_string()));
            }
            to_pretty(&info)
        })();
        result.unwrap_or_else(|e| format!("Error getting file info: {}", e))
    }

    pub fn get_directory_size(&self, dir_name: Option<&str>) -> String {
        let target = match self.resolve_dir(dir_name) {
            Ok(target) => target,
            Err(message) => return message,
        };
        let result = (|| -> Result<String> {
            let mut total_size = 0u64;
            let mut file_count = 0usize;
            let mut dir_count = 0usize;
            for entry in WalkDir::new(&target).min_depth(1) {
                let entry = entry.map_err(|e| AgentError::InvalidInput(e.to_string()))?;
                if entry.file_type().is_file() {
                    total_size += entry.metadata().map(|m| m.len()).unwrap_or(0);
                    file_count += 1;
                } else if entry.file_type().is_dir() {
                    dir_count += 1;
                }
            }
            let size_mb = (total_size as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0;
            to_pretty(&json!({
                "directory": target.display().to_string(),
                "total_size_bytes": total_size,
                "total_size_mb": size_mb,
                "file_count": file_count,
                "directory_count": dir_count,
            }))
        })();
        result.unwrap_or_else(|e| format!("Error calculating directory size: {}", e))
    }

    pub fn walk_directory(&self, path: Option<&str>, max_files: usize) -> String {
        let target = match self.resolve_dir(path) {
            Ok(target) => target,
            Err(message) => return message,
        };
        let result = (|| -> Result<String> {
            let mut items = Vec::new();
            let mut file_count = 0usize;
            for entry in WalkDir::new(&target).min_depth(1).sort_by_file_name() {
                if file_count >= max_files {
                    break;
                }
                let entry = entry.map_err(|e| AgentError::InvalidInput(e.to_string()))?;
                let item = entry.path();
                let parent = item
                    .parent()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                if entry.file_type().is_dir() {
                    items.push(json!({
                        "name": entry.file_name().to_string_lossy(),
                        "path": item.display().to_string(),
                        "type": "directory",
                        "parent": parent,
                    }));
                } else {
                    items.push(json!({
                        "name": entry.file_name().to_string_lossy(),
                        "path": item.display().to_string(),
                        "type": "file",
                        "parent": parent,
                        "size": entry.metadata().map(|m| m.len()).unwrap_or(0),
                        "extension": item.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default(),
                    }));
                    file_count += 1;
                }
            }
            to_pretty(&json!({
                "directory": target.display().to_string(),
                "total_items": items.len(),
                "truncated": file_count >= max_files,
                "items": items,
            }))
        })();
        result.unwrap_or_else(|e| format!("Error walking directory: {}", e))
    }

    pub fn find_files_by_extension(&self, extension: &str) -> String {
        let extension = if extension.starts_with('.') {
            extension.to_string()
        } else {
            format!(".{}", extension)
        };
        self.search_files(&format!("**/*{}", extension))
    }

    pub fn find_files_by_name(&self, name_pattern: &str) -> String {
        self.search_files(&format!("**/{}", name_pattern))
    }

    pub fn copy_file(&self, src: &str, dst: &str) -> String {
        let src_path = self.resolve(src);
        let dst_path = self.resolve(dst);
        if !src_path.exists() {
            return format!("Error: Source file '{}' does not exist", src);
        }
        let result = (|| -> Result<()> {
            if let Some(parent) = dst_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&src_path, &dst_path)?;
            Ok(())
        })();
        match result {
            Ok(()) => format!("File copied successfully from '{}' to '{}'", src, dst),
            Err(e) => format!("Error copying file: {}", e),
        }
    }

    pub fn move_file(&self, src: &str, dst: &str) -> String {
        let src_path = self.resolve(src);
        let dst_path = self.resolve(dst);
        if !src_path.exists() {
            return format!("Error: Source file '{}' does not exist", src);
        }
        let result = (|| -> Result<()> {
            if let Some(parent) = dst_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(&src_path, &dst_path)?;
            Ok(())
        })();
        match result {
            Ok(()) => format!("File moved successfully from '{}' to '{}'", src, dst),
            Err(e) => format!("Error moving file: {}", e),
        }
    }

    pub fn delete_file(&self, file_name: &str) -> String {
        let path = self.resolve(file_name);
        if !path.exists() {
            return format!("Error: File '{}' does not exist", file_name);
        }
        if path.is_dir() {
            return format!(
                "Error: '{}' is a directory, use delete_directory instead",
                file_name
            );
        }
        match fs::remove_file(&path) {
            Ok(()) => format!("File '{}' deleted successfully", file_name),
            Err(e) => format!("Error deleting file: {}", e),
        }
    }

    /// 非递归删除只对空目录生效
    pub fn delete_directory(&self, dir_name: &str, recursive: bool) -> String {
        let path = self.resolve(dir_name);
        if !path.exists() {
            return format!("Error: Directory '{}' does not exist", dir_name);
        }
        if !path.is_dir() {
            return format!("Error: '{}' is not a directory", dir_name);
        }
        if recursive {
            match fs::remove_dir_all(&path) {
                Ok(()) => format!("Directory '{}' and all contents deleted successfully", dir_name),
                Err(e) => format!("Error deleting directory: {}", e),
            }
        } else {
            match fs::remove_dir(&path) {
                Ok(()) => format!("Directory '{}' deleted successfully", dir_name),
                Err(e) => format!("Error deleting directory: {}", e),
            }
        }
    }

    pub fn check_path_exists(&self, path: &str) -> String {
        let target = self.resolve(path);
        let mut result = json!({
            "path": target.display().to_string(),
            "exists": target.exists(),
            "type": null,
            "readable": false,
            "writable": false,
        });

        if let Ok(meta) = fs::symlink_metadata(&target) {
            let kind = if target.is_file() {
                "file"
            } else if target.is_dir() {
                "directory"
            } else if meta.file_type().is_symlink() {
                "symlink"
            } else {
                "other"
            };
            result["type"] = json!(kind);
            result["readable"] = json!(if target.is_dir() {
                fs::read_dir(&target).is_ok()
            } else {
                fs::File::open(&target).is_ok()
            });
            result["writable"] = json!(!meta.permissions().readonly());
        }

        to_pretty(&result).unwrap_or_else(|e| format!("Error checking path: {}", e))
    }
}

#[cfg(test)]
mod tests;
