//! HTTP client for fccid.report and fccid.io.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};

use super::parser::{
    is_pdf_content_type, parse_grantee_codes, parse_manual_page_link, parse_pdf_link,
    parse_products, pdf_file_name, resolve_href,
};
use super::types::{DownloadStatus, Product};

/// Grantee search on fccid.report.
const FCCID_REPORT_SEARCH_URL: &str = "https://fccid.report/";

/// Per-grantee RSS feeds live at `<base>/<code>.rss`.
const FCCID_IO_BASE_URL: &str = "https://fccid.io";

/// Browser user agent; both sites serve a stripped page to unknown clients.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:52.0) Gecko/20100101 Firefox/52.0";

/// Client for the FCC ID mirror sites.
pub struct FccClient {
    client: Client,
}

impl FccClient {
    /// Create a new client with the given user agent and request timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch a page body as text, failing on non-2xx responses.
    fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Request to {} failed: {}", url, response.status());
        }

        response
            .text()
            .with_context(|| format!("Failed to read body of {}", url))
    }

    /// Look up grantee codes for companies matching a keyword.
    pub fn lookup_grantee_codes(&self, company: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}?s={}",
            FCCID_REPORT_SEARCH_URL,
            urlencoding::encode(company)
        );
        let html = self.get_text(&url)?;
        let codes = parse_grantee_codes(&html);
        debug!(company, count = codes.len(), "Grantee code lookup");
        Ok(codes)
    }

    /// Fetch the raw RSS feed of a grantee's products.
    pub fn fetch_rss(&self, code: &str) -> Result<String> {
        let url = format!("{}/{}.rss", FCCID_IO_BASE_URL, code);
        self.get_text(&url)
    }

    /// Fetch and parse a grantee's product list.
    pub fn get_products(&self, code: &str) -> Result<Vec<Product>> {
        let rss = self.fetch_rss(code)?;
        parse_products(&rss).with_context(|| format!("Invalid RSS feed for grantee {}", code))
    }

    /// Follow a product page to its user manual PDF.
    ///
    /// Returns `None` when the product page has no manual exhibit, or the
    /// exhibit page has no PDF download.
    pub fn find_manual_link(&self, product_link: &str) -> Result<Option<String>> {
        let html = self.get_text(product_link)?;
        let Some(href) = parse_manual_page_link(&html) else {
            return Ok(None);
        };
        let Some(exhibit_url) = resolve_href(product_link, &href) else {
            return Ok(None);
        };

        let html = self.get_text(&exhibit_url)?;
        Ok(parse_pdf_link(&html).and_then(|pdf| resolve_href(&exhibit_url, &pdf)))
    }

    /// Collect every product of every grantee matching `company`, with
    /// manual links attached where one could be found.
    ///
    /// A grantee or product that fails to load is logged and skipped.
    pub fn collect_company_manuals(&self, company: &str) -> Result<Vec<Product>> {
        let codes = self.lookup_grantee_codes(company)?;
        info!(company, codes = codes.len(), "Found grantee codes");

        Ok(gather_products(
            &codes,
            |code| self.get_products(code),
            |link| self.find_manual_link(link),
        ))
    }

    /// Download a manual PDF into `dest`.
    ///
    /// `dest` may be a directory, in which case the file name comes from the
    /// URL. An existing destination counts as success and is never fetched
    /// or overwritten.
    pub fn download_pdf(&self, url: Option<&str>, dest: &Path) -> Result<DownloadStatus> {
        let Some(url) = url else {
            return Ok(DownloadStatus::Skipped);
        };

        let path = resolve_destination(url, dest);
        if path.exists() {
            debug!(path = %path.display(), "Manual already downloaded");
            return Ok(DownloadStatus::AlreadyPresent);
        }

        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !response.status().is_success() {
            debug!(url, status = %response.status(), "Manual download rejected");
            return Ok(DownloadStatus::Skipped);
        }

        let body = response
            .bytes()
            .with_context(|| format!("Failed to read body of {}", url))?;

        store_pdf(content_type.as_deref(), &body, &path)
    }
}

/// Fetch every grantee's products and attach manual links, accumulating
/// across all codes. Failures are logged and skipped.
fn gather_products<P, M>(codes: &[String], mut get_products: P, mut find_manual: M) -> Vec<Product>
where
    P: FnMut(&str) -> Result<Vec<Product>>,
    M: FnMut(&str) -> Result<Option<String>>,
{
    let mut all_products = Vec::new();
    for code in codes {
        let mut products = match get_products(code) {
            Ok(products) => products,
            Err(e) => {
                warn!(code = %code, error = %e, "Skipping grantee");
                continue;
            }
        };
        info!(code = %code, products = products.len(), "Found products");

        for product in &mut products {
            debug!(title = %product.title, "Getting manual");
            match find_manual(&product.link) {
                Ok(Some(manual)) => product.manual = Some(manual),
                Ok(None) => debug!(title = %product.title, "No manual listed"),
                Err(e) => warn!(title = %product.title, error = %e, "Manual lookup failed"),
            }
        }

        all_products.extend(products);
    }

    all_products
}

/// Resolve the final file path for a manual downloaded from `url`.
pub fn resolve_destination(url: &str, dest: &Path) -> PathBuf {
    if dest.is_dir() {
        dest.join(pdf_file_name(url))
    } else {
        dest.to_path_buf()
    }
}

/// Write a fetched body to `path` if it is a PDF.
pub fn store_pdf(content_type: Option<&str>, body: &[u8], path: &Path) -> Result<DownloadStatus> {
    if !is_pdf_content_type(content_type) {
        debug!(
            path = %path.display(),
            content_type = content_type.unwrap_or("<none>"),
            "Not a PDF"
        );
        return Ok(DownloadStatus::Skipped);
    }

    if path.exists() {
        return Ok(DownloadStatus::AlreadyPresent);
    }

    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(DownloadStatus::Downloaded)
}
