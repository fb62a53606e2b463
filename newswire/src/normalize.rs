//! Turning feed entries and scraped pages into [`Item`]s.

use chrono::{DateTime, SecondsFormat, Utc};
use feed_rs::model::Entry;
use regex::Regex;
use std::sync::LazyLock;

use crate::item::Item;
use crate::keywords::matches_keywords;

/// Longest `summary` kept on an item.
pub const SUMMARY_MAX_CHARS: usize = 1000;

// A tag may span lines; an unclosed '<' is left as text.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// Remove everything that looks like an HTML tag.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

/// Keep at most `max` characters (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// ISO-8601 form used for `published` and `generated_at`.
pub fn iso_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Map one feed entry to an item.
///
/// `published` comes only from the parsed published/updated date; entries whose
/// date could not be parsed get an empty string.
pub fn entry_to_item(entry: &Entry, source_url: &str, keywords: &[String]) -> Item {
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.clone())
        .unwrap_or_default();

    let raw_summary = entry
        .summary
        .as_ref()
        .map(|s| s.content.as_str())
        .filter(|s| !s.is_empty())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.as_deref()))
        .unwrap_or_default();
    let summary = truncate_chars(&strip_tags(raw_summary), SUMMARY_MAX_CHARS);

    let link = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref().map_or(true, |rel| rel == "alternate"))
        .or_else(|| entry.links.first())
        .map(|l| l.href.clone())
        .unwrap_or_default();

    let published = entry
        .published
        .or(entry.updated)
        .map(iso_timestamp)
        .unwrap_or_default();

    let matched = matches_keywords(&format!("{}\n{}", title, summary), keywords);

    Item {
        title,
        summary,
        link,
        source: source_url.to_string(),
        published,
        matched,
        ai_summary: String::new(),
        ai_tags: Vec::new(),
    }
}
