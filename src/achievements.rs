//! Achievement progress tracking
//!
//! Each user-facing action maps to a fixed set of named achievements.
//! Progress lives in the store; this module owns the action table and the
//! unlock event type. The core never announces unlocks itself — events
//! are returned to the caller, which decides whether to surface them.

use crate::error::Result;
use crate::store::MemoryStore;

/// Kinds of user actions that feed achievement progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    Conversation,
    CodeAnalysis,
    GitUsage,
    Learning,
}

impl ActionType {
    /// The `(achievement, target)` pairs an action advances.
    pub fn achievements(&self) -> &'static [(&'static str, i64)] {
        match self {
            ActionType::Conversation => &[("chat_master", 100), ("session_expert", 10)],
            ActionType::CodeAnalysis => &[("code_analyzer", 50), ("quality_guru", 25)],
            ActionType::GitUsage => &[("git_ninja", 25), ("commit_master", 50)],
            ActionType::Learning => &[("knowledge_seeker", 20), ("concept_master", 100)],
        }
    }
}

/// Emitted at most once per achievement, at the moment it unlocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unlock {
    pub name: String,
    pub target: i64,
}

/// Advance every achievement mapped to `action`, returning any unlocks
/// that fired.
pub fn record_action(store: &mut MemoryStore, action: ActionType) -> Result<Vec<Unlock>> {
    let mut unlocks = Vec::new();
    for (name, target) in action.achievements() {
        if let Some(unlock) = store.increment_achievement(name, *target)? {
            unlocks.push(unlock);
        }
    }
    Ok(unlocks)
}
