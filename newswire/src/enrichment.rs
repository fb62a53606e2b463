//! Generated summaries and heuristic topic tags.

use common::TagRule;
use std::collections::BTreeSet;
use tracing::info;

use crate::item::Item;
use crate::llm::summarizer::summarize_item;
use crate::llm::LlmProvider;

/// Built-in (substring, label) table. Substrings are lowercase.
pub const DEFAULT_TAG_RULES: &[(&str, &str)] = &[
    ("hydrogen", "Hydrogen"),
    ("net zero", "Net Zero"),
    ("net-zero", "Net Zero"),
    ("decarbon", "Net Zero"),
    ("carbon capture", "Carbon Capture"),
    ("ccus", "Carbon Capture"),
    ("steel", "Steel"),
    ("semiconductor", "Semiconductors"),
    ("chip", "Semiconductors"),
    ("battery", "Batteries"),
    ("batteries", "Batteries"),
    ("gigafactory", "Batteries"),
    ("electric vehicle", "Electric Vehicles"),
    ("offshore wind", "Offshore Wind"),
    ("wind farm", "Offshore Wind"),
    ("solar", "Solar"),
    ("nuclear", "Nuclear"),
    ("grid", "Grid"),
    ("critical mineral", "Critical Minerals"),
    ("lithium", "Critical Minerals"),
    ("supply chain", "Supply Chains"),
    ("tariff", "Trade"),
    ("export", "Trade"),
    ("manufactur", "Manufacturing"),
    ("automotive", "Automotive"),
    ("aerospace", "Aerospace"),
    ("defence", "Defence"),
    ("artificial intelligence", "AI"),
    (" ai ", "AI"),
    ("subsid", "Subsidies"),
    ("investment", "Investment"),
    ("skills", "Skills"),
    ("innovation", "Innovation"),
    ("research and development", "Innovation"),
    ("industrial strategy", "Industrial Strategy"),
];

/// The built-in tag table as owned rules.
pub fn default_tag_rules() -> Vec<TagRule> {
    DEFAULT_TAG_RULES
        .iter()
        .map(|(pattern, label)| TagRule {
            pattern: pattern.to_string(),
            label: label.to_string(),
        })
        .collect()
}

/// Sorted, de-duplicated labels whose pattern occurs in the lowercased
/// `title + " " + summary`.
pub fn heuristic_tags(title: &str, summary: &str, rules: &[TagRule]) -> Vec<String> {
    let text = format!("{} {}", title, summary).to_lowercase();
    rules
        .iter()
        .filter(|rule| !rule.pattern.is_empty() && text.contains(&rule.pattern.to_lowercase()))
        .map(|rule| rule.label.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Attach heuristic tags to every item and, when a provider is available,
/// generated summaries to the first `summary_limit` items.
pub async fn enrich_items(
    items: &mut [Item],
    provider: Option<&dyn LlmProvider>,
    rules: &[TagRule],
    summary_limit: usize,
) {
    match provider {
        Some(provider) => {
            let eligible = items.len().min(summary_limit);
            info!("Generating summaries for {} of {} items", eligible, items.len());
            for (index, item) in items.iter_mut().take(summary_limit).enumerate() {
                item.ai_summary = summarize_item(provider, index, &item.title, &item.summary).await;
            }
        }
        None => info!("summarization service unavailable; attaching heuristic tags only"),
    }

    for item in items.iter_mut() {
        item.ai_tags = heuristic_tags(&item.title, &item.summary, rules);
    }
}
