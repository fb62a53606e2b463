// Summarizer module
use tracing::{debug, warn};

use super::LlmProvider;

/// Inputs shorter than this are not worth summarizing.
pub const MIN_INPUT_CHARS: usize = 40;
/// Longest input sent to the provider.
pub const MAX_INPUT_CHARS: usize = 900;
pub const SUMMARY_MIN_LENGTH: usize = 8;
pub const SUMMARY_MAX_LENGTH: usize = 50;

/// Text handed to the summarizer: `title. summary` on a single line.
pub fn summary_input(title: &str, summary: &str) -> String {
    format!("{}. {}", title, summary)
        .replace(['\r', '\n'], " ")
        .trim()
        .to_string()
}

/// Generate a short summary for the item at `index`.
///
/// Returns an empty string when the input is too short or the provider fails;
/// failures are logged and never propagated.
pub async fn summarize_item<P: LlmProvider + ?Sized>(
    provider: &P,
    index: usize,
    title: &str,
    summary: &str,
) -> String {
    let text = summary_input(title, summary);
    if text.chars().count() < MIN_INPUT_CHARS {
        debug!(index, "input too short for summarization, skipping");
        return String::new();
    }

    let text = crate::normalize::truncate_chars(&text, MAX_INPUT_CHARS);
    match provider
        .summarize(&text, SUMMARY_MIN_LENGTH, SUMMARY_MAX_LENGTH)
        .await
    {
        Ok(generated) => generated,
        Err(e) => {
            warn!(index, "summary generation failed for item {}: {:#}", index, e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmRequest, LlmResponse};
    use anyhow::Result;
    use std::sync::Mutex;

    /// Records every input and answers with a fixed summary, or fails.
    struct RecordingProvider {
        fail: bool,
        seen: Mutex<Vec<(String, usize, usize)>>,
    }

    impl RecordingProvider {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for RecordingProvider {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse> {
            anyhow::bail!("not used")
        }

        async fn summarize(&self, content: &str, min_length: usize, max_length: usize) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((content.to_string(), min_length, max_length));
            if self.fail {
                anyhow::bail!("model exploded");
            }
            Ok("A short summary".to_string())
        }
    }

    #[test]
    fn input_collapses_newlines() {
        assert_eq!(summary_input("Title", "line one\nline two"), "Title. line one line two");
        assert_eq!(summary_input("", ""), ".");
    }

    #[tokio::test]
    async fn short_input_is_skipped() {
        let provider = RecordingProvider::new(false);
        let out = summarize_item(&provider, 0, "Tiny", "text").await;
        assert_eq!(out, "");
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn long_input_is_truncated_and_summarized() {
        let provider = RecordingProvider::new(false);
        let body = "word ".repeat(400);
        let out = summarize_item(&provider, 3, "Headline", &body).await;
        assert_eq!(out, "A short summary");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.chars().count(), MAX_INPUT_CHARS);
        assert!(seen[0].0.starts_with("Headline. word"));
        assert_eq!((seen[0].1, seen[0].2), (8, 50));
    }

    #[tokio::test]
    async fn provider_failure_yields_empty_summary() {
        let provider = RecordingProvider::new(true);
        let out = summarize_item(&provider, 7, "A headline long enough", "and a body that pushes past forty chars").await;
        assert_eq!(out, "");
        assert_eq!(provider.seen.lock().unwrap().len(), 1);
    }
}
