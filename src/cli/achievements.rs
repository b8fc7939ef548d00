//! Achievements command implementation

use anyhow::Result;

use crate::store::MemoryStore;

pub fn run(store: &MemoryStore) -> Result<()> {
    let achievements = store.list_achievements()?;

    if achievements.is_empty() {
        println!("No achievements yet. Chat, analyze code, or record git activity to earn some.");
        return Ok(());
    }

    for achievement in achievements {
        let marker = if achievement.unlocked { "🏆" } else { "  " };
        println!(
            "{} {:<20} {:>4}/{:<4} {}",
            marker,
            achievement.name,
            achievement.progress,
            achievement.target,
            achievement.description,
        );
    }

    Ok(())
}
