//! Git activity recording command implementation
//!
//! The core never inspects repositories; it only records that a
//! git-related action happened and feeds achievement progress.

use anyhow::Result;

use crate::achievements::{record_action, ActionType};
use crate::store::MemoryStore;

use super::print_unlocks;

pub fn run(
    store: &mut MemoryStore,
    action: &str,
    description: Option<String>,
    repo: Option<String>,
) -> Result<()> {
    let repo = repo.unwrap_or_else(|| ".".to_string());
    store.record_git_activity(&repo, action, description.as_deref())?;

    let unlocks = record_action(store, ActionType::GitUsage)?;
    println!("Recorded git action '{}' for {}", action, repo);
    print_unlocks(&unlocks);

    Ok(())
}
