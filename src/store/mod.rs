//! Persistent memory with SQLite
//!
//! One store file backs four concerns: the append-only conversation log,
//! the content-addressed analysis cache, derived session metadata, and
//! achievement progress. The store is opened once at process start and
//! passed by reference; every mutating operation is its own transaction
//! so concurrent invocations from separate processes stay consistent.

mod schema;

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, TransactionBehavior};
use std::path::{Path, PathBuf};

use crate::achievements::Unlock;
use crate::analyzer::CodeAnalysis;
use crate::error::{Error, Result};

pub use schema::SCHEMA;

/// Version tag stored next to every cached analysis blob. Bump when the
/// serialized shape of `CodeAnalysis` changes; older rows then read as
/// cache misses instead of deserializing into a mismatched structure.
pub const ANALYSIS_SCHEMA_VERSION: i64 = 1;

/// Cap on search results.
const SEARCH_LIMIT: i64 = 20;

pub struct MemoryStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl MemoryStore {
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, path: None };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn now() -> String {
        // Fixed-precision RFC 3339 keeps lexicographic order == time order
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    // ============================================
    // CONVERSATIONS & SESSIONS
    // ============================================

    /// Append one conversation turn and touch its session's `last_used`.
    /// A session row is created on first use; `created_at`, `description`,
    /// and `mood` survive later touches.
    pub fn append_conversation(
        &mut self,
        session: &str,
        user_input: &str,
        ai_response: &str,
        context_used: &str,
        model: &str,
    ) -> Result<i64> {
        let now = Self::now();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO conversations (session_name, timestamp, user_input, ai_response, context_used, model_used)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![session, now, user_input, ai_response, context_used, model],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO sessions (name, created_at, last_used) VALUES (?1, ?2, ?2)
             ON CONFLICT(name) DO UPDATE SET last_used = excluded.last_used",
            params![session, now],
        )?;

        tx.commit()?;
        Ok(id)
    }

    /// Up to `limit` most recent turns for a session, oldest first.
    /// Prompt assembly wants chronological order, so the natural
    /// descending retrieval is reversed before returning.
    pub fn recent_context(&self, session: &str, limit: usize) -> Result<Vec<Conversation>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_name, timestamp, user_input, ai_response, context_used, model_used
             FROM conversations
             WHERE session_name = ?
             ORDER BY timestamp DESC, id DESC
             LIMIT ?",
        )?;

        let mut rows: Vec<Conversation> = stmt
            .query_map(params![session, limit as i64], map_conversation)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.reverse();
        Ok(rows)
    }

    /// Substring search over user input and responses, most recent first,
    /// optionally scoped to one session. Capped at 20 matches.
    pub fn search_conversations(
        &self,
        query: &str,
        session: Option<&str>,
    ) -> Result<Vec<Conversation>> {
        let pattern = format!("%{}%", query);
        let base = "SELECT id, session_name, timestamp, user_input, ai_response, context_used, model_used
             FROM conversations
             WHERE (user_input LIKE ?1 OR ai_response LIKE ?1)";

        let rows = match session {
            Some(name) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{} AND session_name = ?2 ORDER BY timestamp DESC, id DESC LIMIT {}",
                    base, SEARCH_LIMIT
                ))?;
                let rows = stmt
                    .query_map(params![pattern, name], map_conversation)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "{} ORDER BY timestamp DESC, id DESC LIMIT {}",
                    base, SEARCH_LIMIT
                ))?;
                let rows = stmt
                    .query_map(params![pattern], map_conversation)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };

        Ok(rows)
    }

    /// All sessions, most recently used first. `message_count` is derived
    /// by joining conversations rather than stored redundantly.
    pub fn list_sessions(&self) -> Result<Vec<SessionRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.name, s.created_at, s.last_used, s.description, s.mood,
                    COUNT(c.id) AS message_count
             FROM sessions s
             LEFT JOIN conversations c ON s.name = c.session_name
             GROUP BY s.name, s.created_at, s.last_used, s.description, s.mood
             ORDER BY s.last_used DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(SessionRow {
                name: row.get(0)?,
                created_at: row.get(1)?,
                last_used: row.get(2)?,
                description: row.get(3)?,
                mood: row.get(4)?,
                message_count: row.get(5)?,
            })
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    // ============================================
    // ANALYSIS CACHE
    // ============================================

    /// Look up a cached analysis for `path`. Hits require the stored
    /// digest to match the current one and the blob to carry the current
    /// schema version; anything else is a miss. Corrupt blobs read as
    /// misses, not errors.
    pub fn cached_analysis(&self, path: &str, digest: &str) -> Result<Option<CodeAnalysis>> {
        let row = self.conn.query_row(
            "SELECT analysis_version, analysis_data FROM code_analysis
             WHERE file_path = ? AND file_hash = ?",
            params![path, digest],
            |row| {
                let version: i64 = row.get(0)?;
                let data: String = row.get(1)?;
                Ok((version, data))
            },
        );

        match row {
            Ok((version, data)) if version == ANALYSIS_SCHEMA_VERSION => {
                Ok(serde_json::from_str(&data).ok())
            }
            Ok(_) => Ok(None),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Upsert the analysis for `path`: at most one live row per path, the
    /// new digest replacing any prior one.
    pub fn store_analysis(
        &mut self,
        path: &str,
        digest: &str,
        analysis: &CodeAnalysis,
    ) -> Result<()> {
        let data = serde_json::to_string(analysis)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO code_analysis
               (file_path, file_hash, language, lines_of_code, complexity_score,
                analysis_version, analysis_data, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(file_path) DO UPDATE SET
                 file_hash = excluded.file_hash,
                 language = excluded.language,
                 lines_of_code = excluded.lines_of_code,
                 complexity_score = excluded.complexity_score,
                 analysis_version = excluded.analysis_version,
                 analysis_data = excluded.analysis_data,
                 timestamp = excluded.timestamp",
            params![
                path,
                digest,
                analysis.language.as_str(),
                analysis.lines_of_code as i64,
                analysis.complexity_score,
                ANALYSIS_SCHEMA_VERSION,
                data,
                Self::now(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    // ============================================
    // ACHIEVEMENTS
    // ============================================

    /// Increment progress toward an achievement, creating the row on first
    /// sight and unlocking it once progress reaches the target. Returns
    /// the unlock event exactly once; unlocked achievements are frozen and
    /// further increments are no-ops.
    ///
    /// The whole read-modify-check sequence runs inside an immediate
    /// transaction, so concurrent invocations serialize on SQLite's write
    /// lock instead of racing past each other.
    pub fn increment_achievement(&mut self, name: &str, target: i64) -> Result<Option<Unlock>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT OR IGNORE INTO achievements (name, description, target) VALUES (?, ?, ?)",
            params![name, format!("Achievement: {}", name), target],
        )?;

        let changed = tx.execute(
            "UPDATE achievements SET progress = progress + 1
             WHERE name = ? AND unlocked = FALSE",
            params![name],
        )?;
        if changed == 0 {
            // Already unlocked: progress stays frozen
            tx.commit()?;
            return Ok(None);
        }

        let ready: bool = tx.query_row(
            "SELECT progress >= target FROM achievements WHERE name = ?",
            params![name],
            |row| row.get(0),
        )?;

        let unlock = if ready {
            tx.execute(
                "UPDATE achievements SET unlocked = TRUE, unlocked_at = datetime('now')
                 WHERE name = ?",
                params![name],
            )?;
            Some(Unlock {
                name: name.to_string(),
                target,
            })
        } else {
            None
        };

        tx.commit()?;
        Ok(unlock)
    }

    pub fn list_achievements(&self) -> Result<Vec<AchievementRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, description, unlocked, progress, target, unlocked_at
             FROM achievements
             ORDER BY unlocked DESC, progress DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(AchievementRow {
                name: row.get(0)?,
                description: row.get(1)?,
                unlocked: row.get(2)?,
                progress: row.get(3)?,
                target: row.get(4)?,
                unlocked_at: row.get(5)?,
            })
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    // ============================================
    // GIT ACTIVITY
    // ============================================

    /// Record that a git-related action occurred. The core never inspects
    /// repositories itself; callers supply whatever facts they have.
    pub fn record_git_activity(
        &mut self,
        repo_path: &str,
        action: &str,
        description: Option<&str>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO git_activity (repo_path, action, description, timestamp)
             VALUES (?, ?, ?, ?)",
            params![repo_path, action, description, Self::now()],
        )?;
        Ok(())
    }

    // ============================================
    // STATISTICS
    // ============================================

    pub fn memory_stats(&self) -> Result<MemoryStats> {
        let count = |sql: &str| -> Result<i64> {
            self.conn
                .query_row(sql, [], |row| row.get(0))
                .map_err(Error::from)
        };

        let database_size_bytes = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(MemoryStats {
            conversations: count("SELECT COUNT(*) FROM conversations")?,
            sessions: count("SELECT COUNT(*) FROM sessions")?,
            code_analyses: count("SELECT COUNT(*) FROM code_analysis")?,
            git_actions: count("SELECT COUNT(*) FROM git_activity")?,
            database_size_bytes,
        })
    }
}

fn map_conversation(row: &rusqlite::Row) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        session_name: row.get(1)?,
        timestamp: row.get(2)?,
        user_input: row.get(3)?,
        ai_response: row.get(4)?,
        context_used: row.get(5)?,
        model_used: row.get(6)?,
    })
}

// ============================================
// ROW TYPES
// ============================================

#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: i64,
    pub session_name: String,
    /// RFC 3339 timestamp as stored.
    pub timestamp: String,
    pub user_input: String,
    pub ai_response: String,
    pub context_used: String,
    pub model_used: String,
}

#[derive(Debug, Clone)]
pub struct SessionRow {
    pub name: String,
    pub created_at: String,
    pub last_used: String,
    pub description: Option<String>,
    pub mood: String,
    pub message_count: i64,
}

#[derive(Debug, Clone)]
pub struct AchievementRow {
    pub name: String,
    pub description: String,
    pub unlocked: bool,
    pub progress: i64,
    pub target: i64,
    pub unlocked_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MemoryStats {
    pub conversations: i64,
    pub sessions: i64,
    pub code_analyses: i64,
    pub git_actions: i64,
    pub database_size_bytes: u64,
}
