use anyhow::{Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{info, warn};

use crate::item::Item;
use crate::keywords::matches_keywords;
use crate::normalize::{truncate_chars, SUMMARY_MAX_CHARS};

/// Per-page request timeout.
pub const PAGE_TIMEOUT_SECS: u64 = 10;

/// Longest paragraph text kept from a page.
pub const PAGE_TEXT_MAX_CHARS: usize = 1500;

/// Title and paragraph text extracted from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedPage {
    pub title: String,
    pub body: String,
}

/// Pull the trimmed `<title>` text (`url` when the element is absent) and the text of every `<p>`
/// element, joined by spaces and cut to [`PAGE_TEXT_MAX_CHARS`].
pub fn extract_page(html: &str, url: &str) -> ScrapedPage {
    let document = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        })
        .unwrap_or_else(|| url.to_string());

    let mut paragraphs = Vec::new();
    if let Ok(p_selector) = Selector::parse("p") {
        for element in document.select(&p_selector) {
            let text = element
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            paragraphs.push(text);
        }
    }
    let body = truncate_chars(&paragraphs.join(" "), PAGE_TEXT_MAX_CHARS);

    ScrapedPage { title, body }
}

/// Fetches a page and extracts its title and paragraph text.
pub async fn scrape_page(client: &Client, url: &str) -> Result<ScrapedPage> {
    let response = client
        .get(url)
        .timeout(Duration::from_secs(PAGE_TIMEOUT_SECS))
        .send()
        .await
        .context("failed to fetch page")?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow::anyhow!("page fetch failed with status: {}", status));
    }

    let html = response.text().await.context("failed to read response body")?;
    Ok(extract_page(&html, url))
}

/// Optional HTML source. Only constructed when scraping is enabled, so the
/// configured page list is never touched otherwise.
pub struct HtmlScraper {
    client: Client,
    urls: Vec<String>,
}

impl HtmlScraper {
    pub fn new(client: Client, urls: Vec<String>) -> Self {
        Self { client, urls }
    }

    /// Returns a scraper when `enabled`, reading `html_sources` only in that case.
    pub fn from_config(config: &common::Config, client: &Client) -> Option<Self> {
        if !config.enable_html_scraping {
            return None;
        }
        Some(Self::new(client.clone(), config.html_sources.clone()))
    }

    /// Scrape every configured page in order. Failed pages are logged and skipped.
    pub async fn scrape_all(&self, keywords: &[String]) -> Vec<Item> {
        let mut items = Vec::new();
        for url in crate::ingestion::usable_urls(&self.urls) {
            match scrape_page(&self.client, url).await {
                Ok(page) if page.title.is_empty() && page.body.is_empty() => {
                    warn!(url = %url, "html scrape returned no content, skipping");
                }
                Ok(page) => {
                    info!(url = %url, chars = page.body.chars().count(), "scraped page");
                    items.push(page_to_item(page, url, keywords));
                }
                Err(e) => warn!(url = %url, "html scrape fail: {:#}", e),
            }
        }
        items
    }
}

/// Map a scraped page to an item. Keywords are matched against the extracted title and
/// the full page text before the summary is cut down; a blank title becomes `url`.
pub fn page_to_item(page: ScrapedPage, url: &str, keywords: &[String]) -> Item {
    let matched = matches_keywords(&format!("{}\n{}", page.title, page.body), keywords);
    let title = if page.title.is_empty() {
        url.to_string()
    } else {
        page.title
    };
    Item {
        title,
        summary: truncate_chars(&page.body, SUMMARY_MAX_CHARS),
        link: url.to_string(),
        source: url.to_string(),
        published: String::new(),
        matched,
        ai_summary: String::new(),
        ai_tags: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_and_paragraphs() {
        let html = r#"<html><head><title>  Steel Review </title></head>
            <body><h1>Ignored</h1><p>First <b>para</b>.</p><div><p>Second</p></div></body></html>"#;
        let page = extract_page(html, "https://example.com/steel");
        assert_eq!(page.title, "Steel Review");
        assert_eq!(page.body, "First para . Second");
    }

    #[test]
    fn missing_title_element_falls_back_to_url() {
        let page = extract_page("<p>Body</p>", "https://example.com/x");
        assert_eq!(page.title, "https://example.com/x");
        assert_eq!(page.body, "Body");
    }

    #[test]
    fn blank_title_becomes_url_after_matching() {
        let url = "https://example.com/hydrogen-plan";
        let page = extract_page(
            "<html><head><title>   </title></head><body><p>Steel output</p></body></html>",
            url,
        );
        assert_eq!(page.title, "");
        let item = page_to_item(page, url, &["hydrogen".to_string(), "steel".to_string()]);
        assert_eq!(item.title, url);
        assert_eq!(item.matched, vec!["steel"]);
    }

    #[test]
    fn body_is_capped() {
        let html = format!("<title>t</title><p>{}</p>", "w".repeat(3000));
        let page = extract_page(&html, "u");
        assert_eq!(page.body.chars().count(), PAGE_TEXT_MAX_CHARS);
    }

    #[test]
    fn page_item_matches_on_full_text() {
        let body = format!("{}hydrogen", "x ".repeat(600));
        let page = ScrapedPage {
            title: "Page".to_string(),
            body,
        };
        let item = page_to_item(page, "https://example.com/p", &["hydrogen".to_string()]);
        assert_eq!(item.summary.chars().count(), SUMMARY_MAX_CHARS);
        assert!(!item.summary.contains("hydrogen"));
        assert_eq!(item.matched, vec!["hydrogen"]);
        assert_eq!(item.link, "https://example.com/p");
        assert_eq!(item.source, "https://example.com/p");
        assert_eq!(item.published, "");
    }

    #[test]
    fn disabled_scraper_is_not_built() {
        let client = Client::new();
        let mut config = common::Config {
            html_sources: vec!["https://example.com".to_string()],
            ..Default::default()
        };
        assert!(HtmlScraper::from_config(&config, &client).is_none());
        config.enable_html_scraping = true;
        assert!(HtmlScraper::from_config(&config, &client).is_some());
    }
}
