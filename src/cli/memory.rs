//! Memory statistics command implementation

use anyhow::Result;

use crate::store::MemoryStore;

pub fn run(store: &MemoryStore) -> Result<()> {
    let stats = store.memory_stats()?;

    println!("🧠 Memory statistics");
    println!("   Conversations: {}", stats.conversations);
    println!("   Sessions:      {}", stats.sessions);
    println!("   Code analyses: {}", stats.code_analyses);
    println!("   Git actions:   {}", stats.git_actions);
    println!(
        "   Database size: {:.2} MB",
        stats.database_size_bytes as f64 / (1024.0 * 1024.0)
    );

    Ok(())
}
