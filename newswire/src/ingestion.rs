use anyhow::{Context, Result};
use feed_rs::model::{Entry, Feed};
use feed_rs::parser;
use reqwest::Client;
use tracing::{info, warn};

/// User agent sent with every request.
pub const USER_AGENT: &str = "IndustrialStrategyBot/0.1";

/// Build the shared HTTP client. Requests use the library default timeout unless
/// a caller sets one per request.
pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build reqwest client")
}

/// Fetches a feed from the given URL and parses it.
pub async fn fetch_and_parse_feed(client: &Client, url: &str) -> Result<Feed> {
    let response = client.get(url).send().await.context("failed to fetch feed")?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow::anyhow!("feed fetch failed with status: {}", status));
    }

    let bytes = response.bytes().await.context("failed to read response body")?;

    let feed = parser::parse(bytes.as_ref()).context("failed to parse feed")?;

    Ok(feed)
}

/// Entries of one feed. A feed that cannot be fetched or parsed is logged and
/// contributes nothing.
pub async fn fetch_entries(client: &Client, url: &str) -> Vec<Entry> {
    match fetch_and_parse_feed(client, url).await {
        Ok(feed) => {
            info!(url = %url, entries = feed.entries.len(), "fetched feed");
            feed.entries
        }
        Err(e) => {
            warn!(url = %url, "feed error: {:#}", e);
            Vec::new()
        }
    }
}

/// Configured source URLs with blank entries dropped and whitespace trimmed.
pub fn usable_urls(urls: &[String]) -> impl Iterator<Item = &str> {
    urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_urls() {
        let urls = vec![
            " https://a.example/feed ".to_string(),
            "".to_string(),
            "   ".to_string(),
            "https://b.example/rss".to_string(),
        ];
        let kept: Vec<&str> = usable_urls(&urls).collect();
        assert_eq!(kept, vec!["https://a.example/feed", "https://b.example/rss"]);
    }

    #[tokio::test]
    async fn unreachable_feed_yields_no_entries() {
        let client = build_http_client().expect("client");
        let entries = fetch_entries(&client, "http://127.0.0.1:9/feed.xml").await;
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn invalid_url_yields_no_entries() {
        let client = build_http_client().expect("client");
        assert!(fetch_entries(&client, "not a url").await.is_empty());
    }
}
