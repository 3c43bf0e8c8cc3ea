//! Best-effort HTML metadata scraping for bookmarks.
//!
//! One outbound GET per call, bounded by a fixed timeout, sent with a
//! conventional browser user-agent so fewer servers reject the request.
//! Every failure mode (network error, non-success status, no match) yields
//! `None`; callers treat absence as a normal, silent outcome.
//!
//! Extraction is a regex scan of the raw HTML rather than a full parse. That
//! tolerates malformed markup at the cost of edge cases (nested quotes,
//! unusual attribute ordering), and stays isolated behind this module so a
//! stricter parser could replace it without touching callers.

use std::time::Duration;

use regex::Regex;
use reqwest::header;

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone, Default)]
pub struct MetadataFetcher {
    client: reqwest::Client,
}

impl MetadataFetcher {
    pub fn new() -> Self {
        MetadataFetcher {
            client: reqwest::Client::new(),
        }
    }

    /// Fetch the remote page title: the `<title>` element, falling back to
    /// the `og:title` meta property.
    pub async fn fetch_title(&self, url: &str) -> Option<String> {
        let html = self.get_html(url).await?;
        extract_title(&html)
    }

    /// Fetch the remote page description: the `description` meta tag,
    /// falling back to `og:description`.
    pub async fn fetch_description(&self, url: &str) -> Option<String> {
        let html = self.get_html(url).await?;
        extract_description(&html)
    }

    async fn get_html(&self, url: &str) -> Option<String> {
        let url = normalize_url(url);
        let response = self
            .client
            .get(&url)
            .timeout(FETCH_TIMEOUT)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(|e| tracing::debug!(%url, "metadata fetch failed: {e}"))
            .ok()?;

        if !response.status().is_success() {
            tracing::debug!(%url, status = %response.status(), "metadata fetch rejected");
            return None;
        }

        response
            .text()
            .await
            .map_err(|e| tracing::debug!(%url, "metadata body read failed: {e}"))
            .ok()
    }
}

/// Prefix `https://` when the URL carries no scheme.
fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn extract_title(html: &str) -> Option<String> {
    let title = Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").unwrap();
    if let Some(caps) = title.captures(html) {
        return Some(caps[1].trim().to_string());
    }

    let og_title =
        Regex::new(r#"(?i)<meta[^>]*property=["']og:title["'][^>]*content=["']([^"']+)["']"#)
            .unwrap();
    og_title
        .captures(html)
        .map(|caps| caps[1].trim().to_string())
}

fn extract_description(html: &str) -> Option<String> {
    let description =
        Regex::new(r#"(?i)<meta[^>]*name=["']description["'][^>]*content=["']([^"']+)["']"#)
            .unwrap();
    if let Some(caps) = description.captures(html) {
        return Some(caps[1].trim().to_string());
    }

    let og_description =
        Regex::new(r#"(?i)<meta[^>]*property=["']og:description["'][^>]*content=["']([^"']+)["']"#)
            .unwrap();
    og_description
        .captures(html)
        .map(|caps| caps[1].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_title_element() {
        let html = r#"<html><head>
            <title> Example Domain </title>
            <meta property="og:title" content="Social Title">
        </head></html>"#;
        assert_eq!(extract_title(html), Some("Example Domain".to_string()));
    }

    #[test]
    fn falls_back_to_og_title() {
        let html = r#"<head><meta property="og:title" content="Social Title"></head>"#;
        assert_eq!(extract_title(html), Some("Social Title".to_string()));
    }

    #[test]
    fn title_matching_is_case_insensitive() {
        let html = "<TITLE>Loud Page</TITLE>";
        assert_eq!(extract_title(html), Some("Loud Page".to_string()));
    }

    #[test]
    fn missing_title_is_none() {
        assert_eq!(extract_title("<html><body>no head</body></html>"), None);
    }

    #[test]
    fn prefers_meta_description() {
        let html = r#"<head>
            <meta name="description" content="Plain description">
            <meta property="og:description" content="Social description">
        </head>"#;
        assert_eq!(
            extract_description(html),
            Some("Plain description".to_string())
        );
    }

    #[test]
    fn falls_back_to_og_description() {
        let html = r#"<meta property="og:description" content="Social description">"#;
        assert_eq!(
            extract_description(html),
            Some("Social description".to_string())
        );
    }

    #[test]
    fn tolerates_extra_attributes_before_content() {
        let html = r#"<meta name="description" id="meta-desc" content="Still found">"#;
        assert_eq!(extract_description(html), Some("Still found".to_string()));
    }

    #[test]
    fn missing_description_is_none() {
        assert_eq!(extract_description("<head></head>"), None);
    }

    #[test]
    fn normalize_url_adds_https() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
    }
}
