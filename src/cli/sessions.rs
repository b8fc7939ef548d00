//! Sessions command implementation

use anyhow::Result;

use crate::store::MemoryStore;

pub fn run(store: &MemoryStore) -> Result<()> {
    let sessions = store.list_sessions()?;

    if sessions.is_empty() {
        println!("No sessions yet. Start one with 'savant ask --session <name> ...'");
        return Ok(());
    }

    println!(
        "{:<20} {:>8} {:<22} {:<22} {}",
        "Session", "Messages", "Last used", "Created", "Mood"
    );
    println!("{}", "-".repeat(84));

    for session in sessions {
        println!(
            "{:<20} {:>8} {:<22} {:<22} {}",
            session.name,
            session.message_count,
            short_timestamp(&session.last_used),
            short_timestamp(&session.created_at),
            session.mood,
        );
    }

    Ok(())
}

fn short_timestamp(timestamp: &str) -> String {
    // RFC 3339 → "YYYY-MM-DD HH:MM"
    if timestamp.len() >= 16 {
        format!("{} {}", &timestamp[..10], &timestamp[11..16])
    } else {
        timestamp.to_string()
    }
}
