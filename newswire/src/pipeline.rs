use anyhow::Result;
use chrono::Utc;
use common::{Config, FilterMode, TagRule};
use reqwest::Client;
use std::sync::Arc;
use tracing::info;

use crate::enrichment::{default_tag_rules, enrich_items};
use crate::ingestion::{fetch_entries, usable_urls};
use crate::item::{Item, NewsPayload};
use crate::llm::LlmProvider;
use crate::normalize::{entry_to_item, iso_timestamp};
use crate::output::{sort_items, write_outputs, OutputPaths};
use crate::scraping::HtmlScraper;

/// One run of the aggregator: everything it needs is built once up front.
pub struct Pipeline {
    config: Config,
    client: Client,
    scraper: Option<HtmlScraper>,
    summarizer: Option<Arc<dyn LlmProvider>>,
    tag_rules: Vec<TagRule>,
}

impl Pipeline {
    pub fn new(config: Config, client: Client, summarizer: Option<Arc<dyn LlmProvider>>) -> Self {
        let scraper = HtmlScraper::from_config(&config, &client);
        let tag_rules = config.tag_rules.clone().unwrap_or_else(default_tag_rules);
        Self {
            config,
            client,
            scraper,
            summarizer,
            tag_rules,
        }
    }

    /// Items from every feed, then from every scraped page, in configured order.
    pub async fn collect_items(&self) -> Vec<Item> {
        let keywords = &self.config.keywords;
        let mut items = Vec::new();

        for url in usable_urls(&self.config.rss_sources) {
            for entry in fetch_entries(&self.client, url).await {
                items.push(entry_to_item(&entry, url, keywords));
            }
        }

        if let Some(scraper) = &self.scraper {
            items.extend(scraper.scrape_all(keywords).await);
        }

        info!("Collected {} items", items.len());
        items
    }

    /// Fetch, annotate and sort; returns the payload without writing it.
    pub async fn build_payload(&self) -> NewsPayload {
        let mut items = apply_filter(self.collect_items().await, self.config.filter_mode);
        sort_items(&mut items);
        enrich_items(
            &mut items,
            self.summarizer.as_deref(),
            &self.tag_rules,
            self.config.summary_limit(),
        )
        .await;

        NewsPayload::new(iso_timestamp(Utc::now()), self.config.keywords.clone(), items)
    }

    /// Full run: build the payload and write both output files.
    pub async fn run(&self, paths: &OutputPaths) -> Result<NewsPayload> {
        let payload = self.build_payload().await;
        write_outputs(&payload, &self.config.channel, paths).await?;
        info!(
            json = %paths.json.display(),
            rss = %paths.rss.display(),
            count = payload.count,
            "outputs written"
        );
        Ok(payload)
    }
}

pub fn apply_filter(items: Vec<Item>, mode: FilterMode) -> Vec<Item> {
    match mode {
        FilterMode::KeepAll => items,
        FilterMode::MatchedOnly => items.into_iter().filter(|i| !i.matched.is_empty()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_matches(title: &str, matched: &[&str]) -> Item {
        Item {
            title: title.to_string(),
            matched: matched.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn keep_all_keeps_unmatched_items() {
        let items = vec![with_matches("a", &["x"]), with_matches("b", &[])];
        assert_eq!(apply_filter(items, FilterMode::KeepAll).len(), 2);
    }

    #[test]
    fn matched_only_drops_unmatched_items() {
        let items = vec![with_matches("a", &["x"]), with_matches("b", &[])];
        let kept = apply_filter(items, FilterMode::MatchedOnly);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "a");
    }

    #[tokio::test]
    async fn empty_config_produces_empty_payload() {
        let config = Config {
            keywords: vec!["hydrogen".to_string()],
            ..Default::default()
        };
        let pipeline = Pipeline::new(config, Client::new(), None);
        let payload = pipeline.build_payload().await;
        assert_eq!(payload.count, 0);
        assert!(payload.items.is_empty());
        assert_eq!(payload.keywords, vec!["hydrogen"]);
        assert!(payload.generated_at.ends_with('Z'));
    }
}
