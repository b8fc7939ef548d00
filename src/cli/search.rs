//! Search command implementation

use anyhow::Result;

use crate::store::MemoryStore;

pub fn run(store: &MemoryStore, query: &str, session: Option<String>) -> Result<()> {
    let matches = store.search_conversations(query, session.as_deref())?;

    if matches.is_empty() {
        println!("No conversations matching '{}'", query);
        return Ok(());
    }

    println!("Found {} conversation(s):\n", matches.len());
    for conversation in matches {
        println!(
            "[{}] {} ({})",
            &conversation.timestamp[..16.min(conversation.timestamp.len())],
            conversation.session_name,
            conversation.model_used,
        );
        println!("  You: {}", clip(&conversation.user_input, 100));
        println!("  AI:  {}", clip(&conversation.ai_response, 100));
        println!();
    }

    Ok(())
}

fn clip(text: &str, width: usize) -> String {
    let line = text.lines().next().unwrap_or(text);
    if line.chars().count() > width {
        let cut: String = line.chars().take(width - 3).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}
