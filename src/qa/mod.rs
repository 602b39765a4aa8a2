//! Question answering over manual pages.
//!
//! A [`VectorStore`] picks the pages most relevant to a question and a
//! [`QaChain`] combines them through the model using one of the
//! [`ChainType`] strategies.

mod chain;
mod retriever;

use std::fmt;

use clap::ValueEnum;

pub use chain::QaChain;
pub use retriever::{VectorStore, DEFAULT_TOP_K};

/// A unit of text handed to a chain, one per manual page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// 1-based page number in the source PDF
    pub page: usize,
    /// Extracted page text
    pub content: String,
}

impl Document {
    pub fn new(page: usize, content: impl Into<String>) -> Self {
        Self {
            page,
            content: content.into(),
        }
    }
}

/// How several documents are combined when answering a question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ChainType {
    /// Every document in a single prompt
    #[default]
    #[value(name = "stuff")]
    Stuff,
    /// Extract relevant text per document, then answer over the extracts
    #[value(name = "map_reduce")]
    MapReduce,
    /// Answer per document with a score, keep the best-scored answer
    #[value(name = "map_rerank")]
    MapRerank,
    /// Answer from the first document, refine with each following one
    #[value(name = "refine")]
    Refine,
}

impl ChainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainType::Stuff => "stuff",
            ChainType::MapReduce => "map_reduce",
            ChainType::MapRerank => "map_rerank",
            ChainType::Refine => "refine",
        }
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed questions asked of every manual.
pub const MANUAL_QUESTIONS: [&str; 5] = [
    "Describe the product in one sentence",
    "Potential use cases of the product",
    "Mac address or prefix of the product if any",
    "SSID/Name of the product if any.",
    "Default username / password / pin if any",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_type_cli_names() {
        for chain_type in ChainType::value_variants() {
            let parsed = ChainType::from_str(chain_type.as_str(), false).unwrap();
            assert_eq!(parsed, *chain_type);
        }
        assert!(ChainType::from_str("map-reduce", false).is_err());
        assert!(ChainType::from_str("summarize", false).is_err());
    }

    #[test]
    fn test_chain_type_display() {
        assert_eq!(ChainType::MapRerank.to_string(), "map_rerank");
        assert_eq!(ChainType::default(), ChainType::Stuff);
    }
}
