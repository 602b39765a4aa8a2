//! QA chains over a set of documents.

use std::sync::OnceLock;

use minijinja::context;
use regex::Regex;
use tracing::debug;

use super::{ChainType, Document};
use crate::llm::{LanguageModel, Prompt, Prompts, Result};

/// Separator between documents stuffed into one prompt.
const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Answers a question from documents with a given combine strategy.
pub struct QaChain<'a> {
    llm: &'a dyn LanguageModel,
    prompts: &'a Prompts,
    chain_type: ChainType,
}

impl<'a> QaChain<'a> {
    pub fn new(llm: &'a dyn LanguageModel, prompts: &'a Prompts, chain_type: ChainType) -> Self {
        Self {
            llm,
            prompts,
            chain_type,
        }
    }

    pub fn chain_type(&self) -> ChainType {
        self.chain_type
    }

    /// Answer `question` using `documents`.
    ///
    /// With no documents, `stuff` still asks the model (with an empty
    /// context); the other strategies return an empty answer without calling
    /// the model.
    pub fn run(&self, documents: &[Document], question: &str) -> Result<String> {
        debug!(
            chain_type = %self.chain_type,
            documents = documents.len(),
            question,
            "Running QA chain"
        );

        match self.chain_type {
            ChainType::Stuff => self.stuff(documents, question),
            ChainType::MapReduce => self.map_reduce(documents, question),
            ChainType::MapRerank => self.map_rerank(documents, question),
            ChainType::Refine => self.refine(documents, question),
        }
    }

    fn complete(&self, prompt: Prompt, ctx: minijinja::Value) -> Result<String> {
        let rendered = self.prompts.render(prompt, ctx)?;
        self.llm.complete(&rendered)
    }

    fn stuff(&self, documents: &[Document], question: &str) -> Result<String> {
        let joined = documents
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join(DOCUMENT_SEPARATOR);

        self.complete(Prompt::QaStuff, context! { context => joined, question })
    }

    fn map_reduce(&self, documents: &[Document], question: &str) -> Result<String> {
        if documents.is_empty() {
            return Ok(String::new());
        }

        let mut summaries = Vec::with_capacity(documents.len());
        for doc in documents {
            let extract = self.complete(
                Prompt::QaMap,
                context! { context => doc.content.as_str(), question },
            )?;
            let extract = extract.trim();
            if !extract.is_empty() {
                summaries.push(extract.to_string());
            }
        }

        self.complete(Prompt::QaCombine, context! { summaries, question })
    }

    fn map_rerank(&self, documents: &[Document], question: &str) -> Result<String> {
        let mut best: Option<ScoredAnswer> = None;

        for doc in documents {
            let response = self.complete(
                Prompt::QaRerank,
                context! { context => doc.content.as_str(), question },
            )?;
            let scored = ScoredAnswer::parse(&response);
            debug!(page = doc.page, score = scored.score, "Ranked answer");

            if best.as_ref().map_or(true, |b| scored.score > b.score) {
                best = Some(scored);
            }
        }

        Ok(best.map(|b| b.answer).unwrap_or_default())
    }

    fn refine(&self, documents: &[Document], question: &str) -> Result<String> {
        let Some((first, rest)) = documents.split_first() else {
            return Ok(String::new());
        };

        let mut answer = self.complete(
            Prompt::QaRefineInitial,
            context! { context => first.content.as_str(), question },
        )?;

        for doc in rest {
            answer = self.complete(
                Prompt::QaRefine,
                context! {
                    context => doc.content.as_str(),
                    question,
                    existing_answer => answer.as_str(),
                },
            )?;
        }

        Ok(answer)
    }
}

/// An answer with the model's self-reported confidence.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScoredAnswer {
    answer: String,
    score: u32,
}

impl ScoredAnswer {
    /// Split a `... \nScore: NN` response. A missing or unreadable score is 0.
    fn parse(response: &str) -> Self {
        static SCORE_RE: OnceLock<Regex> = OnceLock::new();
        let re = SCORE_RE.get_or_init(|| {
            Regex::new(r"(?im)^\s*score:\s*(\d+)\s*$").expect("valid score regex")
        });

        let Some(caps) = re.captures_iter(response).last() else {
            return Self {
                answer: clean_answer(response),
                score: 0,
            };
        };

        let whole = caps.get(0).map_or(0..0, |m| m.range());
        // All digits, so a failed parse is an overflow.
        let score = caps[1].parse::<u32>().map_or(100, |s| s.min(100));

        Self {
            answer: clean_answer(&response[..whole.start]),
            score,
        }
    }
}

fn clean_answer(text: &str) -> String {
    let text = text.trim();
    text.strip_prefix("Helpful Answer:")
        .unwrap_or(text)
        .trim()
        .to_string()
}
