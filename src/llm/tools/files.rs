//! 文件操作工具 - 将 FileToolkit 暴露给Agent

use rig::tool::Tool;
use serde::Deserialize;

use super::ToolActivity;
use crate::files::FileToolkit;

#[derive(Debug, Clone)]
pub struct AgentToolFiles {
    toolkit: FileToolkit,
    activity: ToolActivity,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilesArgs {
    pub action: String,
    pub path: Option<String>,
    pub file_name: Option<String>,
    pub contents: Option<String>,
    pub overwrite: Option<bool>,
    pub pattern: Option<String>,
    pub extension: Option<String>,
    pub src: Option<String>,
    pub dst: Option<String>,
    pub recursive: Option<bool>,
    pub show_hidden: Option<bool>,
    pub max_depth: Option<usize>,
    pub max_files: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
#[error("file tool error: {0}")]
pub struct FilesToolError(String);

/// 会修改文件系统的操作
const MUTATING_ACTIONS: [&str; 7] = [
    "save_file",
    "create_directory",
    "change_directory",
    "copy_file",
    "move_file",
    "delete_file",
    "delete_directory",
];

pub const FILE_ACTIONS: [&str; 19] = [
    "save_file",
    "read_file",
    "list_files",
    "search_files",
    "list_directory",
    "list_directory_tree",
    "create_directory",
    "change_directory",
    "get_current_directory",
    "get_file_info",
    "get_directory_size",
    "walk_directory",
    "find_files_by_extension",
    "find_files_by_name",
    "copy_file",
    "move_file",
    "delete_file",
    "delete_directory",
    "check_path_exists",
];

fn required<'a>(value: &'a Option<String>, name: &str, action: &str) -> Result<&'a str, FilesToolError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| FilesToolError(format!("`{}` is required for {}", name, action)))
}

impl AgentToolFiles {
    pub fn new(toolkit: FileToolkit) -> Self {
        Self {
            toolkit,
            activity: ToolActivity::default(),
        }
    }

    pub fn with_activity(mut self, activity: ToolActivity) -> Self {
        self.activity = activity;
        self
    }

    pub fn dispatch(&self, args: &FilesArgs) -> Result<String, FilesToolError> {
        let files = &self.toolkit;
        let action = args.action.as_str();
        // file_name 与 path 互为别名
        let target = || {
            required(&args.file_name, "file_name", action)
                .or_else(|_| required(&args.path, "path", action))
        };

        let output = match action {
            "save_file" => files.save_file(
                args.contents.as_deref().unwrap_or_default(),
                target()?,
                args.overwrite.unwrap_or(true),
            ),
            "read_file" => files.read_file(target()?),
            "list_files" => files.list_files(),
            "search_files" => files.search_files(required(&args.pattern, "pattern", action)?),
            "list_directory" => {
                files.list_directory(args.path.as_deref(), args.show_hidden.unwrap_or(false))
            }
            "list_directory_tree" => {
                files.list_directory_tree(args.path.as_deref(), args.max_depth.unwrap_or(3))
            }
            "create_directory" => files.create_directory(target()?, true),
            "change_directory" => files.change_directory(required(&args.path, "path", action)?),
            "get_current_directory" => files.get_current_directory(),
            "get_file_info" => files.get_file_info(target()?),
            "get_directory_size" => files.get_directory_size(args.path.as_deref()),
            "walk_directory" => {
                files.walk_directory(args.path.as_deref(), args.max_files.unwrap_or(100))
            }
            "find_files_by_extension" => {
                files.find_files_by_extension(required(&args.extension, "extension", action)?)
            }
            "find_files_by_name" => {
                files.find_files_by_name(required(&args.pattern, "pattern", action)?)
            }
            "copy_file" => files.copy_file(
                required(&args.src, "src", action)?,
                required(&args.dst, "dst", action)?,
            ),
            "move_file" => files.move_file(
                required(&args.src, "src", action)?,
                required(&args.dst, "dst", action)?,
            ),
            "delete_file" => files.delete_file(target()?),
            "delete_directory" => {
                files.delete_directory(target()?, args.recursive.unwrap_or(false))
            }
            "check_path_exists" => files.check_path_exists(target()?),
            other => return Err(FilesToolError(format!("unknown action `{}`", other))),
        };
        Ok(output)
    }
}

impl Tool for AgentToolFiles {
    const NAME: &'static str = "file_tools";

    type Error = FilesToolError;
    type Args = FilesArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Work with files under the current base directory: read, save, search (glob), list, inspect, copy, move and delete files and directories, or change the base directory. Relative paths are resolved against the base directory.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "action": { "type": "string", "enum": FILE_ACTIONS, "description": "operation to perform" },
                    "path": { "type": "string", "description": "directory or file path" },
                    "file_name": { "type": "string", "description": "file name relative to the base directory" },
                    "contents": { "type": "string", "description": "contents for save_file" },
                    "overwrite": { "type": "boolean", "description": "overwrite an existing file (save_file, default true)" },
                    "pattern": { "type": "string", "description": "glob pattern such as *.txt or **/*.py (search_files, find_files_by_name)" },
                    "extension": { "type": "string", "description": "file extension such as .py (find_files_by_extension)" },
                    "src": { "type": "string", "description": "source path (copy_file, move_file)" },
                    "dst": { "type": "string", "description": "destination path (copy_file, move_file)" },
                    "recursive": { "type": "boolean", "description": "delete directory contents too (delete_directory)" },
                    "show_hidden": { "type": "boolean", "description": "include dotfiles (list_directory)" },
                    "max_depth": { "type": "integer", "description": "tree depth (list_directory_tree, default 3)" },
                    "max_files": { "type": "integer", "description": "file limit (walk_directory, default 100)" }
                },
                "required": ["action"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...file_tools@{}", args.action);
        if MUTATING_ACTIONS.contains(&args.action.as_str()) {
            self.activity.record();
        }
        self.dispatch(&args)
    }
}
