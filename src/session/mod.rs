//! 会话记录：本地用户标识文件 + SQLite中只追加的对话表

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::{AgentError, Result};

const TABLE_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS agent_sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        user_message TEXT NOT NULL,
        agent_response TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_agent_sessions_session
        ON agent_sessions(session_id);
    CREATE INDEX IF NOT EXISTS idx_agent_sessions_user
        ON agent_sessions(user_id);";

const SELECT_COLUMNS: &str =
    "SELECT id, session_id, user_id, user_message, agent_response, created_at FROM agent_sessions";

#[derive(Serialize, Deserialize)]
struct UserFile {
    user_id: String,
}

/// 读取本地保存的用户标识；文件不存在时返回 None
pub fn load_user_id(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let file: UserFile = serde_json::from_str(&content)?;
    let user_id = file.user_id.trim().to_string();
    Ok((!user_id.is_empty()).then_some(user_id))
}

/// 保存用户标识，父目录不存在时自动创建
pub fn save_user_id(path: &Path, user_id: &str) -> Result<()> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(AgentError::InvalidInput("user id must not be empty".into()));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(&UserFile {
        user_id: user_id.to_string(),
    })?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn create_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 一轮对话记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionTurn {
    pub id: i64,
    pub session_id: String,
    pub user_id: String,
    pub user_message: String,
    pub agent_response: String,
    pub created_at: String,
}

/// 会话存储
pub struct SessionStore {
    db: Mutex<Connection>,
}

impl SessionStore {
    /// 打开或创建数据库
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(path)?)
    }

    /// 内存数据库（测试用）
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(db: Connection) -> Result<Self> {
        db.execute_batch(TABLE_SCHEMA)?;
        Ok(Self { db: Mutex::new(db) })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // 连接本身没有跨调用的不变式，锁中毒时直接沿用
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 追加一轮对话
    pub fn append(
        &self,
        session_id: &str,
        user_id: &str,
        user_message: &str,
        agent_response: &str,
    ) -> Result<i64> {
        let db = self.lock();
        let now = Utc::now().to_rfc3339();
        db.execute(
            "INSERT INTO agent_sessions (session_id, user_id, user_message, agent_response, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![session_id, user_id, user_message, agent_response, now],
        )?;
        Ok(db.last_insert_rowid())
    }

    pub fn read_all(&self) -> Result<Vec<SessionTurn>> {
        self.read_sessions(None, None)
    }

    /// 按会话和/或用户过滤，按写入顺序返回
    pub fn read_sessions(
        &self,
        session_id: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<Vec<SessionTurn>> {
        let db = self.lock();
        let mut stmt = db.prepare(&format!(
            "{} WHERE (?1 IS NULL OR session_id = ?1) AND (?2 IS NULL OR user_id = ?2)
             ORDER BY id ASC",
            SELECT_COLUMNS
        ))?;
        let turns = stmt
            .query_map(rusqlite::params![session_id, user_id], row_to_turn)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(turns)
    }

    /// 用户最近一次使用的会话
    pub fn last_session_id_by_user(&self, user_id: &str) -> Result<Option<String>> {
        let db = self.lock();
        let session_id = db
            .query_row(
                "SELECT session_id FROM agent_sessions WHERE user_id = ?1
                 ORDER BY id DESC LIMIT 1",
                rusqlite::params![user_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(session_id)
    }

    /// 会话最近的 limit 轮对话，按时间正序返回
    pub fn recent_turns(&self, session_id: &str, limit: usize) -> Result<Vec<SessionTurn>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let db = self.lock();
        let mut stmt = db.prepare(&format!(
            "{} WHERE session_id = ?1 ORDER BY id DESC LIMIT ?2",
            SELECT_COLUMNS
        ))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut turns = stmt
            .query_map(rusqlite::params![session_id, limit], row_to_turn)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        turns.reverse();
        Ok(turns)
    }
}

fn row_to_turn(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionTurn> {
    Ok(SessionTurn {
        id: row.get(0)?,
        session_id: row.get(1)?,
        user_id: row.get(2)?,
        user_message: row.get(3)?,
        agent_response: row.get(4)?,
        created_at: row.get(5)?,
    })
}
