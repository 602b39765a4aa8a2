//! In-memory vector store over page embeddings.

use std::cmp::Ordering;

use tracing::debug;

use super::Document;
use crate::llm::{Embedder, Result};

/// Documents returned per query.
pub const DEFAULT_TOP_K: usize = 4;

/// Embedded documents searchable by cosine similarity.
pub struct VectorStore {
    documents: Vec<Document>,
    embeddings: Vec<Vec<f32>>,
}

impl VectorStore {
    /// Embed every non-empty document.
    pub fn from_documents(documents: Vec<Document>, embedder: &dyn Embedder) -> Result<Self> {
        let documents: Vec<Document> = documents
            .into_iter()
            .filter(|d| !d.content.trim().is_empty())
            .collect();

        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let embeddings = if texts.is_empty() {
            Vec::new()
        } else {
            embedder.embed(&texts)?
        };

        debug!(documents = documents.len(), "Built vector store");
        Ok(Self {
            documents,
            embeddings,
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Embed `query` and return the `k` most similar documents.
    pub fn similarity_search(
        &self,
        embedder: &dyn Embedder,
        query: &str,
        k: usize,
    ) -> Result<Vec<Document>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = embedder
            .embed(&[query.to_string()])?
            .into_iter()
            .next()
            .unwrap_or_default();

        Ok(self
            .top_k(&query_embedding, k)
            .into_iter()
            .cloned()
            .collect())
    }

    /// The `k` documents most similar to `query`, best first. Ties keep
    /// document order.
    pub fn top_k(&self, query: &[f32], k: usize) -> Vec<&Document> {
        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(query, e)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .map(|(i, _)| &self.documents[i])
            .collect()
    }
}

/// Cosine similarity; 0 when either vector has zero length or the
/// dimensions differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Embeds by keyword presence: [wifi, pin, ssid].
    struct KeywordEmbedder {
        calls: Cell<usize>,
    }

    impl KeywordEmbedder {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl Embedder for KeywordEmbedder {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.set(self.calls.get() + 1);
            Ok(texts
                .iter()
                .map(|t| {
                    let t = t.to_lowercase();
                    ["wi-fi", "pin", "ssid"]
                        .iter()
                        .map(|k| t.matches(k).count() as f32)
                        .collect()
                })
                .collect())
        }
    }

    fn store(embedder: &KeywordEmbedder) -> VectorStore {
        VectorStore::from_documents(
            vec![
                Document::new(1, "Wi-Fi setup. Wi-Fi band 2.4GHz."),
                Document::new(2, ""),
                Document::new(3, "Default PIN 1234, change the PIN."),
                Document::new(4, "SSID ACME-XXXX on Wi-Fi."),
                Document::new(5, "Safety warnings."),
            ],
            embedder,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_pages_not_embedded() {
        let embedder = KeywordEmbedder::new();
        let store = store(&embedder);
        assert_eq!(store.len(), 4);
        assert_eq!(embedder.calls.get(), 1);
    }

    #[test]
    fn test_similarity_search_orders_by_cosine() {
        let embedder = KeywordEmbedder::new();
        let store = store(&embedder);

        let results = store.similarity_search(&embedder, "What is the PIN?", 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].page, 3);

        let results = store.similarity_search(&embedder, "ssid", 4).unwrap();
        assert_eq!(results[0].page, 4);
        // Zero-similarity pages keep their original order at the tail.
        assert_eq!(results[1].page, 1);
        assert_eq!(results[2].page, 3);
        assert_eq!(results[3].page, 5);
    }

    #[test]
    fn test_k_larger_than_store() {
        let embedder = KeywordEmbedder::new();
        let store = store(&embedder);
        let results = store
            .similarity_search(&embedder, "wi-fi", DEFAULT_TOP_K + 10)
            .unwrap();
        assert_eq!(results.len(), 4);
    }

    #[test]
    fn test_empty_store_never_embeds_query() {
        let embedder = KeywordEmbedder::new();
        let store = VectorStore::from_documents(vec![Document::new(1, "  ")], &embedder).unwrap();
        assert!(store.is_empty());
        assert!(store.similarity_search(&embedder, "pin", 4).unwrap().is_empty());
        assert_eq!(embedder.calls.get(), 0);
    }

    #[test]
    fn test_cosine_similarity_edges() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-6);
    }
}
