//! AI backend client and prompt assembly
//!
//! Talks to an Ollama-compatible HTTP endpoint. Failures map to
//! displayable error strings at the call site; the backend never aborts
//! the session and a failed exchange is still recorded in history.

use std::time::Duration;

use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::store::MemoryStore;

pub const DEFAULT_MODEL: &str = "mistral";

/// Offered when the tags endpoint is unreachable.
const FALLBACK_MODELS: &[&str] = &["mistral", "codellama", "llama2"];

pub struct Backend {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl Backend {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Backend(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send a prompt to the given model and return the generated text.
    pub fn generate(&self, prompt: &str, model: &str) -> Result<String> {
        let body = json!({
            "model": model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": 0.7,
                "top_p": 0.9,
                "top_k": 40,
            }
        });

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Backend(format!(
                        "Request timed out. Model '{}' might be processing a large request.",
                        model
                    ))
                } else if e.is_connect() {
                    Error::Backend(
                        "Cannot connect to the model server. Make sure it's running with `ollama serve`"
                            .to_string(),
                    )
                } else {
                    Error::Backend(e.to_string())
                }
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::Backend(format!(
                "Model '{}' not found. Available models: {}",
                model,
                self.list_models().join(", ")
            )));
        }

        let value: Value = response
            .error_for_status()
            .map_err(|e| Error::Backend(format!("HTTP error: {}", e)))?
            .json()
            .map_err(|e| Error::Backend(format!("Malformed response: {}", e)))?;

        value
            .get("response")
            .and_then(Value::as_str)
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Backend("Response missing generated text".to_string()))
    }

    /// List models known to the server, falling back to a static set when
    /// the tags endpoint is unreachable.
    pub fn list_models(&self) -> Vec<String> {
        let tags = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .and_then(|r| r.json::<Value>());

        if let Ok(value) = tags {
            if let Some(models) = value.get("models").and_then(Value::as_array) {
                let names: Vec<String> = models
                    .iter()
                    .filter_map(|m| m.get("name").and_then(Value::as_str))
                    .map(|name| name.split(':').next().unwrap_or(name).to_string())
                    .collect();
                if !names.is_empty() {
                    return names;
                }
            }
        }

        FALLBACK_MODELS.iter().map(|m| m.to_string()).collect()
    }
}

/// Pick the model best suited to a query from keyword hints.
pub fn auto_select_model(user_input: &str) -> &'static str {
    const CODE_HINTS: &[&str] = &[
        "code",
        "function",
        "class",
        "debug",
        "algorithm",
        "programming",
        "syntax",
        "bug",
        "error",
        "compile",
        "refactor",
    ];
    const MATH_HINTS: &[&str] = &["calculate", "math", "equation", "formula", "solve"];
    const CREATIVE_HINTS: &[&str] = &["write", "story", "creative", "poem", "narrative"];

    let lower = user_input.to_lowercase();
    if CODE_HINTS.iter().any(|hint| lower.contains(hint)) {
        "codellama"
    } else if MATH_HINTS.iter().any(|hint| lower.contains(hint)) {
        "mistral"
    } else if CREATIVE_HINTS.iter().any(|hint| lower.contains(hint)) {
        "llama2"
    } else {
        DEFAULT_MODEL
    }
}

fn system_prompt_for(model: &str) -> &'static str {
    match model {
        "codellama" => {
            "You are Savant, a code analysis expert. Provide detailed technical \
             explanations of code, algorithms, and programming concepts."
        }
        "llama2" => {
            "You are Savant, a creative and analytical assistant. Help with both \
             technical and creative tasks with precision."
        }
        _ => {
            "You are Savant, a concise and helpful terminal assistant. Provide \
             clear, technical explanations."
        }
    }
}

/// Assemble the full prompt for a query: per-model system prompt plus the
/// session's recent turns rendered oldest first. Returns the prompt and
/// the context note recorded alongside the conversation.
pub fn build_context_prompt(
    store: &MemoryStore,
    session: &str,
    user_input: &str,
    model: &str,
    context_limit: usize,
) -> Result<(String, String)> {
    let recent = store.recent_context(session, context_limit)?;
    let system_prompt = system_prompt_for(model);

    if recent.is_empty() {
        let prompt = format!("{}\n\nUser: {}\nAssistant:", system_prompt, user_input);
        return Ok((prompt, String::new()));
    }

    let mut parts = vec![
        system_prompt.to_string(),
        "\nPrevious conversation context:".to_string(),
    ];
    for conversation in &recent {
        parts.push(format!("User: {}", conversation.user_input));
        parts.push(format!("Assistant: {}", conversation.ai_response));
    }
    let context = parts.join("\n");

    let prompt = format!(
        "{}\n\nCurrent question:\nUser: {}\nAssistant:",
        context, user_input
    );
    Ok((prompt, context))
}
