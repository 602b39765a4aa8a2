//! Prompt templates rendered with minijinja.

use minijinja::Environment;
use serde::Serialize;

use super::error::Result;
use super::LanguageModel;

/// Every prompt the tool knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Whole-manual question sheet
    ManualSummary,
    /// Criteria → web search query
    SearchQuery,
    /// Search results → fenced company list
    CompanyList,
    /// All documents in one context
    QaStuff,
    /// Per-document relevant-passage extraction
    QaMap,
    /// Final answer over mapped passages
    QaCombine,
    /// Per-document answer with a confidence score
    QaRerank,
    /// First refine step
    QaRefineInitial,
    /// Subsequent refine steps
    QaRefine,
}

impl Prompt {
    const ALL: [Prompt; 9] = [
        Prompt::ManualSummary,
        Prompt::SearchQuery,
        Prompt::CompanyList,
        Prompt::QaStuff,
        Prompt::QaMap,
        Prompt::QaCombine,
        Prompt::QaRerank,
        Prompt::QaRefineInitial,
        Prompt::QaRefine,
    ];

    fn name(self) -> &'static str {
        match self {
            Prompt::ManualSummary => "manual_summary",
            Prompt::SearchQuery => "search_query",
            Prompt::CompanyList => "company_list",
            Prompt::QaStuff => "qa_stuff",
            Prompt::QaMap => "qa_map",
            Prompt::QaCombine => "qa_combine",
            Prompt::QaRerank => "qa_rerank",
            Prompt::QaRefineInitial => "qa_refine_initial",
            Prompt::QaRefine => "qa_refine",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Prompt::ManualSummary => include_str!("../../templates/manual_summary.jinja"),
            Prompt::SearchQuery => include_str!("../../templates/search_query.jinja"),
            Prompt::CompanyList => include_str!("../../templates/company_list.jinja"),
            Prompt::QaStuff => include_str!("../../templates/qa_stuff.jinja"),
            Prompt::QaMap => include_str!("../../templates/qa_map.jinja"),
            Prompt::QaCombine => include_str!("../../templates/qa_combine.jinja"),
            Prompt::QaRerank => include_str!("../../templates/qa_rerank.jinja"),
            Prompt::QaRefineInitial => include_str!("../../templates/qa_refine_initial.jinja"),
            Prompt::QaRefine => include_str!("../../templates/qa_refine.jinja"),
        }
    }
}

/// Compiled prompt templates.
pub struct Prompts {
    env: Environment<'static>,
}

impl Default for Prompts {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompts {
    /// Load all embedded templates.
    pub fn new() -> Self {
        let mut env = Environment::new();
        for prompt in Prompt::ALL {
            env.add_template(prompt.name(), prompt.source())
                .expect("Failed to add prompt template");
        }
        Self { env }
    }

    /// Render a prompt with the given context.
    pub fn render<S: Serialize>(&self, prompt: Prompt, ctx: S) -> Result<String> {
        let template = self.env.get_template(prompt.name())?;
        Ok(template.render(ctx)?)
    }
}

/// A single templated prompt bound to a model.
pub struct LlmChain<'a> {
    llm: &'a dyn LanguageModel,
    prompts: &'a Prompts,
    prompt: Prompt,
}

impl<'a> LlmChain<'a> {
    pub fn new(llm: &'a dyn LanguageModel, prompts: &'a Prompts, prompt: Prompt) -> Self {
        Self {
            llm,
            prompts,
            prompt,
        }
    }

    /// Render the prompt and return the model's completion.
    pub fn run<S: Serialize>(&self, ctx: S) -> Result<String> {
        let rendered = self.prompts.render(self.prompt, ctx)?;
        self.llm.complete(&rendered)
    }
}
