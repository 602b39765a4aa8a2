//! Companies command - list companies matching free-text criteria.

use anyhow::{Context, Result};
use minijinja::context;
use tracing::{debug, info};

use crate::config::Settings;
use crate::llm::{LanguageModel, LlmChain, Prompt, Prompts};
use crate::search::{SearchService, SerpApiClient};

/// Code fence the company list is wrapped in.
const FENCE: &str = "```";

/// Execute the companies command.
pub fn execute(criteria: &str, settings: &Settings) -> Result<()> {
    let llm = super::openai_client(settings)?;
    let search = SerpApiClient::new(settings.require_serpapi_key()?, settings.timeout)?;
    let prompts = Prompts::new();

    let companies = find_companies(criteria, &llm, &search, &prompts)?;
    println!("{}", companies.join("\n"));
    Ok(())
}

/// Ask for a search query, run it, and have the model list matching companies.
fn find_companies(
    criteria: &str,
    llm: &dyn LanguageModel,
    search: &dyn SearchService,
    prompts: &Prompts,
) -> Result<Vec<String>> {
    let query = LlmChain::new(llm, prompts, Prompt::SearchQuery)
        .run(context! { criteria })
        .context("Failed to generate a search query")?;
    let query = clean_query(&query);
    info!(query = %query, "Searching");

    let results = search.run(&query).context("Search failed")?;
    debug!(results = %results, "Search results");

    let response = LlmChain::new(llm, prompts, Prompt::CompanyList)
        .run(context! { criteria, results })
        .context("Failed to summarize search results")?;

    fenced_lines(&response).with_context(|| {
        format!(
            "Model response has no {} fenced company list:\n{}",
            FENCE, response
        )
    })
}

/// Strip whitespace and wrapping quotes the model tends to add to queries.
fn clean_query(query: &str) -> String {
    let trimmed = query.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|q| q.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

/// Non-blank lines strictly between the first two fence lines.
///
/// The opening fence may carry a language tag (```` ```text ````).
fn fenced_lines(response: &str) -> Option<Vec<String>> {
    let lines: Vec<&str> = response.lines().map(str::trim).collect();
    let open = lines.iter().position(|l| l.starts_with(FENCE))?;
    let close = lines[open + 1..].iter().position(|l| *l == FENCE)? + open + 1;

    Some(
        lines[open + 1..close]
            .iter()
            .filter(|l| !l.is_empty())
            .map(|l| l.to_string())
            .collect(),
    )
}
