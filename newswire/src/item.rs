use serde::{Deserialize, Serialize};

/// One normalized news record, produced from a feed entry or a scraped page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    /// Markup-free, at most 1000 characters.
    pub summary: String,
    pub link: String,
    /// Feed or page URL the item came from.
    pub source: String,
    /// ISO-8601 UTC timestamp, or empty when the source gave no parseable date.
    pub published: String,
    /// Configured keywords found in title + summary, in configured order.
    pub matched: Vec<String>,
    #[serde(default)]
    pub ai_summary: String,
    #[serde(default)]
    pub ai_tags: Vec<String>,
}

/// The JSON snapshot written each run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsPayload {
    pub generated_at: String,
    pub keywords: Vec<String>,
    pub count: usize,
    pub items: Vec<Item>,
}

impl NewsPayload {
    pub fn new(generated_at: String, keywords: Vec<String>, items: Vec<Item>) -> Self {
        Self {
            generated_at,
            keywords,
            count: items.len(),
            items,
        }
    }
}
