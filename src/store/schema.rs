//! SQLite schema definition
//!
//! One physical file holds conversation memory, the analysis cache,
//! session metadata, achievements, and recorded git activity.

pub const SCHEMA: &str = r#"
-- ============================================
-- CONVERSATIONS
-- ============================================

-- Append-only conversation log; rows are never updated or deleted
CREATE TABLE IF NOT EXISTS conversations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_name TEXT NOT NULL DEFAULT 'default',
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    user_input TEXT NOT NULL,
    ai_response TEXT NOT NULL,
    context_used TEXT DEFAULT '',
    model_used TEXT DEFAULT 'mistral'
);

-- ============================================
-- ANALYSIS CACHE
-- ============================================

-- One live row per file path; file_hash validates freshness and
-- analysis_version invalidates rows serialized by older extractors
CREATE TABLE IF NOT EXISTS code_analysis (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_path TEXT UNIQUE NOT NULL,
    file_hash TEXT NOT NULL,
    language TEXT,
    lines_of_code INTEGER,
    complexity_score REAL,
    analysis_version INTEGER NOT NULL DEFAULT 1,
    analysis_data TEXT,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
);

-- ============================================
-- SESSIONS
-- ============================================

-- Materialized per-session metadata; message counts are derived by
-- joining conversations, never stored
CREATE TABLE IF NOT EXISTS sessions (
    name TEXT PRIMARY KEY,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    last_used DATETIME DEFAULT CURRENT_TIMESTAMP,
    description TEXT,
    mood TEXT DEFAULT 'neutral'
);

-- ============================================
-- ACHIEVEMENTS
-- ============================================

CREATE TABLE IF NOT EXISTS achievements (
    name TEXT PRIMARY KEY,
    description TEXT NOT NULL,
    unlocked BOOLEAN DEFAULT FALSE,
    progress INTEGER DEFAULT 0,
    target INTEGER DEFAULT 100,
    unlocked_at DATETIME
);

-- ============================================
-- GIT ACTIVITY
-- ============================================

CREATE TABLE IF NOT EXISTS git_activity (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    repo_path TEXT NOT NULL,
    commit_hash TEXT,
    action TEXT,
    description TEXT,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
);

-- ============================================
-- INDEXES
-- ============================================

CREATE INDEX IF NOT EXISTS idx_conversations_session ON conversations(session_name);
CREATE INDEX IF NOT EXISTS idx_conversations_timestamp ON conversations(timestamp DESC);
CREATE INDEX IF NOT EXISTS idx_sessions_last_used ON sessions(last_used DESC);
"#;
