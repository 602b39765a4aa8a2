//! FCC filing record types.

/// A product listed in a grantee's RSS feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Product title (usually the FCC ID followed by a short name)
    pub title: String,
    /// Free-text description from the feed
    pub description: String,
    /// Product page on fccid.io
    pub link: String,
    /// Direct link to the user manual PDF, once discovered
    pub manual: Option<String>,
}

impl Product {
    /// Create a product with no manual attached yet.
    pub fn new(title: String, description: String, link: String) -> Self {
        Self {
            title,
            description,
            link,
            manual: None,
        }
    }

    /// Whether a manual link has been attached.
    pub fn has_manual(&self) -> bool {
        self.manual.is_some()
    }
}

/// Outcome of a single PDF download attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    /// Fresh file written to disk
    Downloaded,
    /// Destination already existed, nothing fetched
    AlreadyPresent,
    /// No URL, or the response was not a PDF
    Skipped,
}
