//! Models command implementation

use anyhow::Result;

use crate::backend::Backend;
use crate::config::Config;

pub fn run(config: &Config) -> Result<()> {
    let backend = Backend::new(&config.backend.url, config.backend.timeout_secs)?;
    let models = backend.list_models();

    println!("Available models:");
    for model in models {
        let marker = if model == config.backend.default_model {
            " (default)"
        } else {
            ""
        };
        println!("  {}{}", model, marker);
    }

    Ok(())
}
