//! Subcommand implementations.

pub mod codes;
pub mod companies;
pub mod extract;
pub mod manuals;

use anyhow::Result;

use crate::config::Settings;
use crate::llm::OpenAiClient;

/// Build the OpenAI client from settings, failing if no key is configured.
fn openai_client(settings: &Settings) -> Result<OpenAiClient> {
    let client = OpenAiClient::new(
        settings.require_openai_key()?,
        &settings.model,
        &settings.embedding_model,
        settings.timeout,
    )?;

    Ok(match &settings.openai_base_url {
        Some(url) => client.with_base_url(url.trim_end_matches('/')),
        None => client,
    })
}
