//! Extract command - answer a fixed question sheet about a product manual.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use minijinja::context;
use tracing::{info, warn};

use crate::config::Settings;
use crate::llm::{Embedder, LlmChain, OpenAiClient, Prompt, Prompts};
use crate::manual;
use crate::qa::{ChainType, Document, QaChain, VectorStore, DEFAULT_TOP_K, MANUAL_QUESTIONS};

/// Execute the extract command.
///
/// By default each question is answered from the most relevant pages with
/// the chosen chain type. With `whole`, the full manual text goes through a
/// single prompt instead.
pub fn execute(path: &Path, chain_type: ChainType, whole: bool, settings: &Settings) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("Manual not found: {}", path.display());
    }

    let client = super::openai_client(settings)?;
    let prompts = Prompts::new();

    if whole {
        analyze_whole(path, &client, &prompts)
    } else {
        analyze_with_retrieval(path, chain_type, &client, &prompts)
    }
}

/// Single-prompt analysis over the full manual text.
fn analyze_whole(path: &Path, client: &OpenAiClient, prompts: &Prompts) -> Result<()> {
    let text = manual::extract_text(path)?;
    if text.trim().is_empty() {
        warn!(path = %path.display(), "Manual has no extractable text");
    }

    let chain = LlmChain::new(client, prompts, Prompt::ManualSummary);
    let response = chain
        .run(context! { questions => MANUAL_QUESTIONS, text })
        .context("Manual analysis failed")?;

    let output = manual::output_path(path, "");
    fs::write(&output, &response)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("{}", response);
    print_saved(&output);
    Ok(())
}

/// Retrieval-based analysis: one QA chain run per question.
fn analyze_with_retrieval(
    path: &Path,
    chain_type: ChainType,
    client: &OpenAiClient,
    prompts: &Prompts,
) -> Result<()> {
    let pages = manual::load_pages(path)?;
    info!(path = %path.display(), pages = pages.len(), "Loaded manual");

    let store = VectorStore::from_documents(pages, client).context("Failed to embed manual")?;
    if store.is_empty() {
        warn!(path = %path.display(), "Manual has no extractable text");
    } else {
        info!(pages = store.len(), %chain_type, "Embedded manual pages");
    }

    let chain = QaChain::new(client, prompts, chain_type);
    let answers = answer_questions(&store, client, &chain, &MANUAL_QUESTIONS)?;

    let output = manual::output_path(path, &format!("_{}", chain_type));
    fs::write(&output, format_answers(&answers))
        .with_context(|| format!("Failed to write {}", output.display()))?;

    print_saved(&output);
    Ok(())
}

/// Answer each question from its most relevant documents.
fn answer_questions(
    store: &VectorStore,
    embedder: &dyn Embedder,
    chain: &QaChain<'_>,
    questions: &[&str],
) -> Result<Vec<String>> {
    let mut answers = Vec::with_capacity(questions.len());
    for question in questions {
        let relevant: Vec<Document> = store
            .similarity_search(embedder, question, DEFAULT_TOP_K)
            .with_context(|| format!("Retrieval failed for '{}'", question))?;
        let answer = chain
            .run(&relevant, question)
            .with_context(|| format!("{} chain failed for '{}'", chain.chain_type(), question))?;
        answers.push(answer);
    }
    Ok(answers)
}

/// Number answers one per line, starting at 1.
fn format_answers(answers: &[String]) -> String {
    answers
        .iter()
        .enumerate()
        .map(|(i, answer)| format!("{}. {}\n", i + 1, answer.trim()))
        .collect()
}

fn print_saved(path: &Path) {
    println!(
        "{} Saved to {}",
        "✓".green().bold(),
        path.display().to_string().cyan()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LanguageModel, Result as LlmResult};
    use std::cell::RefCell;

    /// Numbers its completions; embeds by PIN keyword.
    struct FakeModel {
        prompts: RefCell<Vec<String>>,
    }

    impl LanguageModel for FakeModel {
        fn complete(&self, prompt: &str) -> LlmResult<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok(format!("answer #{}", self.prompts.borrow().len()))
        }
    }

    impl Embedder for FakeModel {
        fn embed(&self, texts: &[String]) -> LlmResult<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let pin = t.to_lowercase().contains("pin") as u8 as f32;
                    vec![pin, 1.0 - pin]
                })
                .collect())
        }
    }

    #[test]
    fn test_format_answers() {
        let answers = vec!["A smart plug.\n".to_string(), "Home automation".to_string()];
        assert_eq!(format_answers(&answers), "1. A smart plug.\n2. Home automation\n");
        assert_eq!(format_answers(&[]), "");
    }

    #[test]
    fn test_answer_questions_one_chain_run_per_question() {
        let model = FakeModel {
            prompts: RefCell::new(Vec::new()),
        };
        let prompts = Prompts::new();
        let store = VectorStore::from_documents(
            vec![
                Document::new(1, "Plug in the device."),
                Document::new(2, "Default PIN: 0000"),
            ],
            &model,
        )
        .unwrap();
        let chain = QaChain::new(&model, &prompts, ChainType::Stuff);

        let answers =
            answer_questions(&store, &model, &chain, &["Default PIN", "Describe"]).unwrap();
        assert_eq!(answers, vec!["answer #1", "answer #2"]);

        // Most relevant page first in the stuffed context.
        let first = model.prompts.borrow()[0].clone();
        let pin_at = first.find("Default PIN: 0000").unwrap();
        let plug_at = first.find("Plug in the device.").unwrap();
        assert!(pin_at < plug_at);
    }
}
