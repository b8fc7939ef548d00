//! Ask command implementation

use anyhow::Result;

use crate::achievements::{record_action, ActionType};
use crate::backend::{auto_select_model, build_context_prompt, Backend};
use crate::config::Config;
use crate::store::MemoryStore;

use super::print_unlocks;

pub fn run(
    store: &mut MemoryStore,
    config: &Config,
    prompt: &str,
    session: &str,
    model: Option<String>,
    auto_model: bool,
) -> Result<()> {
    let model = model.unwrap_or_else(|| {
        if auto_model {
            auto_select_model(prompt).to_string()
        } else {
            config.backend.default_model.clone()
        }
    });

    let backend = Backend::new(&config.backend.url, config.backend.timeout_secs)?;
    let (full_prompt, context) =
        build_context_prompt(store, session, prompt, &model, config.chat.context_limit)?;

    // Backend failures surface as the response text for this one query;
    // the exchange is recorded either way
    let response = match backend.generate(&full_prompt, &model) {
        Ok(response) => response,
        Err(e) => format!("❌ {}", e),
    };

    store.append_conversation(session, prompt, &response, &context, &model)?;
    let unlocks = record_action(store, ActionType::Conversation)?;

    println!("{}", response);
    print_unlocks(&unlocks);
    Ok(())
}
