//! PDF text extraction.
//!
//! Whole-document text comes from `pdf-extract`; per-page documents for
//! retrieval come from `lopdf` so page boundaries are preserved.

use std::path::Path;

use anyhow::{Context, Result};
use lopdf::Document as PdfDocument;
use tracing::{debug, warn};

use crate::qa::Document;

/// Extract the text of every page, concatenated in page order.
pub fn extract_text(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
        anyhow::anyhow!("Failed to extract text from {}: {}", path.display(), e)
    })?;
    debug!(path = %path.display(), chars = text.len(), "Extracted manual text");
    Ok(text)
}

/// Load one document per page.
///
/// Pages whose text cannot be decoded are kept as empty documents so page
/// numbers stay aligned with the PDF.
pub fn load_pages(path: &Path) -> Result<Vec<Document>> {
    let pdf = PdfDocument::load(path)
        .with_context(|| format!("Failed to parse PDF {}", path.display()))?;

    let mut documents = Vec::new();
    for page in pdf.get_pages().into_keys() {
        let content = match pdf.extract_text(&[page]) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(page, error = %e, "Failed to extract page text");
                String::new()
            }
        };
        documents.push(Document::new(page as usize, content));
    }

    debug!(path = %path.display(), pages = documents.len(), "Loaded manual pages");
    Ok(documents)
}
