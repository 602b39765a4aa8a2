//! HTML and RSS parsing for the FCC ID mirror sites.
//!
//! Everything here is pure: page bodies in, extracted data out. The selectors
//! track the current markup of fccid.report and fccid.io, which neither site
//! promises to keep stable.

use anyhow::{Context, Result};
use reqwest::Url;
use scraper::{Html, Selector};
use serde::Deserialize;

use super::types::Product;

/// Search result headings on fccid.report.
const RESULT_TITLE_SELECTOR: &str = "h2.dmbs-post-title a[href]";

/// Exhibit download buttons on fccid.io.
const PDF_BUTTON_SELECTOR: &str = "a.btn.btn-info[href]";

/// Fallback file name when a URL has no usable last segment.
const DEFAULT_PDF_NAME: &str = "manual.pdf";

/// Extract grantee codes from a fccid.report search result page.
///
/// Result links look like `https://fccid.report/code/2AB3C/`; only links that
/// point at a `/code/` page are considered, and the code is the segment
/// before the trailing slash.
pub fn parse_grantee_codes(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse(RESULT_TITLE_SELECTOR).expect("valid selector");

    let mut codes = Vec::new();
    for anchor in doc.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.contains("/code/") {
            continue;
        }
        let segments: Vec<&str> = href.split('/').collect();
        if segments.len() < 2 {
            continue;
        }
        let code = segments[segments.len() - 2].trim();
        if !code.is_empty() {
            codes.push(code.to_string());
        }
    }

    codes
}

#[derive(Debug, Deserialize)]
struct RssDocument {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(default)]
    item: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
}

impl From<RssItem> for Product {
    fn from(item: RssItem) -> Self {
        Product::new(
            item.title.trim().to_string(),
            item.description.trim().to_string(),
            item.link.trim().to_string(),
        )
    }
}

/// Parse a grantee RSS feed into products, one per `<item>`.
///
/// Every returned product starts without a manual link.
pub fn parse_products(rss: &str) -> Result<Vec<Product>> {
    let doc: RssDocument = quick_xml::de::from_str(rss).context("Failed to parse RSS feed")?;
    Ok(doc.channel.item.into_iter().map(Product::from).collect())
}

/// Find the first link on a product page whose text mentions a manual.
pub fn parse_manual_page_link(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("valid selector");

    doc.select(&selector)
        .find(|a| {
            a.text()
                .collect::<String>()
                .to_lowercase()
                .contains("manual")
        })
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
}

/// Find the first exhibit download button that links to a PDF.
pub fn parse_pdf_link(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse(PDF_BUTTON_SELECTOR).expect("valid selector");

    doc.select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.contains(".pdf"))
        .map(str::to_string)
}

/// Resolve a possibly relative href against the page it came from.
pub fn resolve_href(base: &str, href: &str) -> Option<String> {
    if let Ok(url) = Url::parse(href) {
        return Some(url.to_string());
    }
    Url::parse(base)
        .ok()?
        .join(href)
        .ok()
        .map(|u| u.to_string())
}

/// Derive the on-disk file name for a downloaded manual from its URL.
///
/// The name is the last path segment plus the query string, so
/// `pdf.php?id=4001` and `pdf.php?id=4002` stay distinct. The result is a
/// single path component: separators and other unsafe characters become
/// `_`, and dot-only names fall back to a default.
pub fn pdf_file_name(url: &str) -> String {
    let (segment, query) = match Url::parse(url) {
        Ok(u) => (
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
                .unwrap_or_default(),
            u.query().map(str::to_string),
        ),
        Err(_) => {
            let without_fragment = url.split('#').next().unwrap_or_default();
            let (path, query) = match without_fragment.split_once('?') {
                Some((path, query)) => (path, Some(query.to_string())),
                None => (without_fragment, None),
            };
            (
                path.rsplit('/').next().unwrap_or_default().to_string(),
                query,
            )
        }
    };

    let mut name = percent_decode(&segment);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        name.push('_');
        name.push_str(&percent_decode(&query));
    }

    let name: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '&' | '?' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if name.trim_matches('.').trim().is_empty() {
        DEFAULT_PDF_NAME.to_string()
    } else {
        name
    }
}

fn percent_decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Check a `Content-Type` header value for `application/pdf`.
///
/// Parameters such as `; charset=binary` are ignored.
pub fn is_pdf_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"
        <html><body>
          <h2 class="dmbs-post-title"><a href="https://fccid.report/code/2AB3C/">Acme Wireless</a></h2>
          <h2 class="dmbs-post-title"><a href="https://fccid.report/2AB3C-X100/">Acme X100</a></h2>
          <h2 class="dmbs-post-title"><a href="https://fccid.report/code/Q87/">Acme Labs</a></h2>
          <h3 class="dmbs-post-title"><a href="https://fccid.report/code/ZZZ/">Wrong tag</a></h3>
        </body></html>
    "#;

    #[test]
    fn test_parse_grantee_codes_only_code_links() {
        let codes = parse_grantee_codes(SEARCH_PAGE);
        assert_eq!(codes, vec!["2AB3C".to_string(), "Q87".to_string()]);
    }

    #[test]
    fn test_parse_grantee_codes_empty_page() {
        assert!(parse_grantee_codes("<html><body>No results</body></html>").is_empty());
    }

    #[test]
    fn test_parse_products_one_per_item() {
        let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
            <rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
              <channel>
                <title>FCC ID 2AB3C</title>
                <link>https://fccid.io/2AB3C</link>
                <description>Acme filings</description>
                <atom:link href="https://fccid.io/2AB3C.rss" rel="self" type="application/rss+xml"/>
                <item>
                  <title>2AB3C-X100 Smart Plug</title>
                  <link>https://fccid.io/2AB3C-X100</link>
                  <description><![CDATA[Wi-Fi smart plug <b>2.4GHz</b>]]></description>
                </item>
                <item>
                  <title>2AB3C-CAM2 Camera</title>
                  <link>https://fccid.io/2AB3C-CAM2</link>
                  <description>Indoor camera &amp; hub</description>
                  <guid isPermaLink="true">https://fccid.io/2AB3C-CAM2</guid>
                </item>
                <item>
                  <title>2AB3C-HUB Hub</title>
                  <link>https://fccid.io/2AB3C-HUB</link>
                  <description>Zigbee hub</description>
                </item>
              </channel>
            </rss>"#;

        let products = parse_products(rss).unwrap();
        assert_eq!(products.len(), 3);
        assert!(products.iter().all(|p| p.manual.is_none()));
        assert!(products
            .iter()
            .all(|p| !p.title.is_empty() && !p.link.is_empty() && !p.description.is_empty()));
        assert_eq!(products[0].title, "2AB3C-X100 Smart Plug");
        assert_eq!(products[0].description, "Wi-Fi smart plug <b>2.4GHz</b>");
        assert_eq!(products[1].description, "Indoor camera & hub");
        assert_eq!(products[2].link, "https://fccid.io/2AB3C-HUB");
    }

    #[test]
    fn test_parse_products_missing_fields_are_empty() {
        let rss = r#"<rss version="2.0"><channel>
              <item>
                <title>2AB3C-X100 Smart Plug</title>
                <link>https://fccid.io/2AB3C-X100</link>
              </item>
              <item>
                <description>No title or link</description>
              </item>
            </channel></rss>"#;

        let products = parse_products(rss).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].title, "2AB3C-X100 Smart Plug");
        assert_eq!(products[0].description, "");
        assert_eq!(products[1].title, "");
        assert_eq!(products[1].link, "");
        assert_eq!(products[1].description, "No title or link");
        assert!(products.iter().all(|p| p.manual.is_none()));
    }

    #[test]
    fn test_parse_products_empty_channel() {
        let rss = r#"<rss version="2.0"><channel><title>Nothing</title></channel></rss>"#;
        assert!(parse_products(rss).unwrap().is_empty());
    }

    #[test]
    fn test_parse_products_rejects_garbage() {
        assert!(parse_products("<html><body>503</body></html>").is_err());
    }

    #[test]
    fn test_parse_manual_page_link_first_match() {
        let html = r#"
            <a href="/2AB3C-X100/Test-Report/1">Test Report</a>
            <a href="/2AB3C-X100/User-Manual/4001">User Manual</a>
            <a href="/2AB3C-X100/Users-Manual/4002">Users MANUAL 2</a>
        "#;
        assert_eq!(
            parse_manual_page_link(html).as_deref(),
            Some("/2AB3C-X100/User-Manual/4001")
        );
        assert_eq!(parse_manual_page_link("<a href='/x'>Photos</a>"), None);
    }

    #[test]
    fn test_parse_pdf_link_requires_button_class() {
        let html = r#"
            <a href="/a.pdf">plain link</a>
            <a class="btn btn-info" href="/2AB3C-X100/User-Manual/4001.html">HTML</a>
            <a class="btn btn-info" href="https://fccid.io/pdf.php?id=4001&x=.pdf">PDF</a>
            <a class="btn btn-info" href="/second.pdf">Second</a>
        "#;
        assert_eq!(
            parse_pdf_link(html).as_deref(),
            Some("https://fccid.io/pdf.php?id=4001&x=.pdf")
        );
        assert_eq!(parse_pdf_link("<a class='btn' href='/a.pdf'>x</a>"), None);
    }

    #[test]
    fn test_resolve_href() {
        assert_eq!(
            resolve_href("https://fccid.io/2AB3C-X100", "/2AB3C-X100/User-Manual/1").as_deref(),
            Some("https://fccid.io/2AB3C-X100/User-Manual/1")
        );
        assert_eq!(
            resolve_href("https://fccid.io/a", "https://cdn.example.com/m.pdf").as_deref(),
            Some("https://cdn.example.com/m.pdf")
        );
        assert_eq!(resolve_href("not a url", "/relative"), None);
    }

    #[test]
    fn test_pdf_file_name() {
        assert_eq!(
            pdf_file_name("https://fccid.io/2AB3C-X100/User-Manual/4001.pdf"),
            "4001.pdf"
        );
        assert_eq!(pdf_file_name("https://fccid.io/files/My%20Manual.pdf"), "My Manual.pdf");
        assert_eq!(pdf_file_name("https://fccid.io/"), DEFAULT_PDF_NAME);
        assert_eq!(pdf_file_name("/manuals/4001.pdf#page=2"), "4001.pdf");
    }

    #[test]
    fn test_pdf_file_name_keeps_query() {
        let first = pdf_file_name("https://fccid.io/pdf.php?id=4001&x=.pdf");
        let second = pdf_file_name("https://fccid.io/pdf.php?id=4002&x=.pdf");

        assert_eq!(first, "pdf.php_id=4001_x=.pdf");
        assert_eq!(second, "pdf.php_id=4002_x=.pdf");
        assert_ne!(first, second);
    }

    #[test]
    fn test_pdf_file_name_is_a_single_component() {
        let name = pdf_file_name("https://evil.example/x/..%2F..%2Fescaped.pdf");
        assert!(!name.contains('/'));
        assert_eq!(name, ".._.._escaped.pdf");

        assert!(!pdf_file_name("https://evil.example/x/..%5Cescaped.pdf").contains('\\'));
        assert_eq!(pdf_file_name("https://evil.example/x/%2E%2E"), DEFAULT_PDF_NAME);
        assert_eq!(
            pdf_file_name("https://evil.example/a.pdf?p=%2E%2E%2F%2E%2E%2Fx"),
            "a.pdf_p=.._.._x"
        );
    }

    #[test]
    fn test_is_pdf_content_type() {
        assert!(is_pdf_content_type(Some("application/pdf")));
        assert!(is_pdf_content_type(Some("Application/PDF; charset=binary")));
        assert!(!is_pdf_content_type(Some("text/html; charset=utf-8")));
        assert!(!is_pdf_content_type(None));
    }
}
