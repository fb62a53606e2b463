//! Sorting, the JSON snapshot and the RSS 2.0 document.

use anyhow::{Context, Result};
use chrono::DateTime;
use common::ChannelConfig;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::item::{Item, NewsPayload};

/// Number of items carried by the RSS feed.
pub const RSS_ITEM_LIMIT: usize = 50;

/// Where a run writes its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub json: PathBuf,
    pub rss: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            json: PathBuf::from("data/news.json"),
            rss: PathBuf::from("data/feed.xml"),
        }
    }
}

impl OutputPaths {
    /// `news.json` and `feed.xml` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            json: dir.as_ref().join("news.json"),
            rss: dir.as_ref().join("feed.xml"),
        }
    }
}

/// Newest first; undated items last, keeping their relative order.
pub fn sort_items(items: &mut [Item]) {
    // ISO-8601 strings are fixed width, so string order is time order and "" sorts lowest.
    items.sort_by(|a, b| b.published.cmp(&a.published));
}

pub fn to_json(payload: &NewsPayload) -> Result<String> {
    serde_json::to_string_pretty(payload).context("failed to serialize news payload")
}

/// Render the feed from the first [`RSS_ITEM_LIMIT`] items.
pub fn render_rss(items: &[Item], channel: &ChannelConfig, generated_at: &str) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss_start = BytesStart::new("rss");
    rss_start.push_attribute(("version", "2.0"));
    writer.write_event(Event::Start(rss_start))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;
    write_text_element(&mut writer, "title", &channel.title)?;
    write_text_element(&mut writer, "link", &channel.link)?;
    write_text_element(&mut writer, "description", &channel.description)?;
    write_text_element(&mut writer, "lastBuildDate", &format_pub_date(generated_at))?;

    for item in items.iter().take(RSS_ITEM_LIMIT) {
        let description = if item.ai_summary.is_empty() {
            item.summary.as_str()
        } else {
            item.ai_summary.as_str()
        };
        let published = if item.published.is_empty() {
            generated_at
        } else {
            item.published.as_str()
        };

        writer.write_event(Event::Start(BytesStart::new("item")))?;
        write_text_element(&mut writer, "title", &item.title)?;
        write_text_element(&mut writer, "link", &item.link)?;
        write_text_element(&mut writer, "description", description)?;
        write_text_element(&mut writer, "pubDate", &format_pub_date(published))?;
        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    String::from_utf8(out).context("RSS output is not valid UTF-8")
}

fn write_text_element<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(&sanitize_text(text))))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

// Drop control characters that XML 1.0 forbids (everything below 0x20 except tab, LF, CR).
fn sanitize_text(input: &str) -> String {
    input
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || c >= '\u{20}')
        .collect()
}

/// RFC 2822 form of an ISO-8601 timestamp; anything unparseable is passed through.
pub fn format_pub_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.to_rfc2822(),
        Err(_) => raw.to_string(),
    }
}

/// Write `contents` to `path`, creating parent directories as needed.
pub async fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Write both the JSON snapshot and the RSS feed.
pub async fn write_outputs(payload: &NewsPayload, channel: &ChannelConfig, paths: &OutputPaths) -> Result<()> {
    let json = to_json(payload)?;
    write_file(&paths.json, &json).await?;

    let rss = render_rss(&payload.items, channel, &payload.generated_at)?;
    write_file(&paths.rss, &rss).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(title: &str, published: &str) -> Item {
        Item {
            title: title.to_string(),
            published: published.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn sorts_newest_first_with_undated_last() {
        let mut items = vec![
            dated("a", "2024-01-02T00:00:00Z"),
            dated("b", ""),
            dated("c", "2024-03-01T00:00:00Z"),
            dated("d", ""),
        ];
        sort_items(&mut items);
        let order: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn sort_is_stable_for_equal_dates() {
        let mut items = vec![
            dated("x", "2024-01-01T00:00:00Z"),
            dated("y", "2024-01-01T00:00:00Z"),
            dated("z", "2024-02-01T00:00:00Z"),
        ];
        sort_items(&mut items);
        let order: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(order, vec!["z", "x", "y"]);
    }

    #[test]
    fn json_keeps_non_ascii_and_round_trips() {
        let item = Item {
            title: "Énergie verte – 水素".to_string(),
            summary: "Résumé".to_string(),
            link: "https://example.com/a".to_string(),
            source: "https://example.com/feed".to_string(),
            published: "2024-01-02T03:04:05Z".to_string(),
            matched: vec!["\"net zero\"".to_string()],
            ai_summary: "short".to_string(),
            ai_tags: vec!["Hydrogen".to_string()],
        };
        let payload = NewsPayload::new(
            "2024-05-01T00:00:00Z".to_string(),
            vec!["hydrogen".to_string()],
            vec![item],
        );
        let json = to_json(&payload).expect("json");
        assert!(json.contains("Énergie verte – 水素"));
        assert!(json.contains("\n  \"generated_at\""));

        let back: NewsPayload = serde_json::from_str(&json).expect("parse back");
        assert_eq!(back, payload);
        assert_eq!(back.count, 1);
    }

    #[test]
    fn rss_escapes_and_prefers_generated_summary() {
        let items = vec![
            Item {
                title: "Steel & <Iron>".to_string(),
                link: "https://example.com/?a=1&b=2".to_string(),
                summary: "feed summary".to_string(),
                ai_summary: "generated summary".to_string(),
                published: "2024-01-02T03:04:05Z".to_string(),
                ..Default::default()
            },
            Item {
                title: "Undated\u{1}".to_string(),
                summary: "plain summary".to_string(),
                ..Default::default()
            },
        ];
        let xml = render_rss(&items, &ChannelConfig::default(), "2024-05-01T00:00:00Z").expect("rss");

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<rss version=\"2.0\">"));
        assert!(xml.contains("<title>Steel &amp; &lt;Iron&gt;</title>"));
        assert!(xml.contains("https://example.com/?a=1&amp;b=2"));
        assert!(xml.contains("<description>generated summary</description>"));
        assert!(xml.contains("<description>plain summary</description>"));
        assert!(!xml.contains("feed summary"));
        assert!(xml.contains("<pubDate>Tue, 2 Jan 2024 03:04:05 +0000</pubDate>"));
        assert!(xml.contains("<pubDate>Wed, 1 May 2024 00:00:00 +0000</pubDate>"));
        assert!(xml.contains("<lastBuildDate>Wed, 1 May 2024 00:00:00 +0000</lastBuildDate>"));
        assert!(xml.contains("<title>Undated</title>"));
    }

    #[test]
    fn rss_is_capped() {
        let items: Vec<Item> = (0..60).map(|i| dated(&format!("item {}", i), "")).collect();
        let xml = render_rss(&items, &ChannelConfig::default(), "2024-05-01T00:00:00Z").expect("rss");
        assert_eq!(xml.matches("<item>").count(), RSS_ITEM_LIMIT);
        assert!(xml.contains("item 49"));
        assert!(!xml.contains("item 50"));
    }

    #[test]
    fn unparseable_dates_pass_through() {
        assert_eq!(format_pub_date("yesterday"), "yesterday");
    }

    #[tokio::test]
    async fn writes_both_files_creating_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = OutputPaths::in_dir(dir.path().join("nested").join("data"));
        let payload = NewsPayload::new("2024-05-01T00:00:00Z".to_string(), vec![], vec![dated("a", "")]);

        write_outputs(&payload, &ChannelConfig::default(), &paths).await.expect("write");

        let json = std::fs::read_to_string(&paths.json).expect("json file");
        let back: NewsPayload = serde_json::from_str(&json).expect("parse");
        assert_eq!(back.count, 1);
        let rss = std::fs::read_to_string(&paths.rss).expect("rss file");
        assert!(rss.contains("<title>a</title>"));
    }
}
