/// Return the configured keywords that occur in `text`, in configured order.
///
/// Comparison is case-insensitive substring matching ("art" matches "cart").
/// A keyword wrapped in double quotes is matched as a phrase on its quote-stripped
/// content; the returned entry keeps its quotes. Blank entries never match.
pub fn matches_keywords(text: &str, keywords: &[String]) -> Vec<String> {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .filter_map(|kw| {
            let kw = kw.trim();
            let needle = needle_for(kw)?;
            haystack.contains(&needle).then(|| kw.to_string())
        })
        .collect()
}

/// Lowercased search string for a trimmed keyword, or None if it can never match.
fn needle_for(kw: &str) -> Option<String> {
    let phrase = match kw.strip_prefix('"').and_then(|k| k.strip_suffix('"')) {
        Some(inner) => inner,
        None => kw,
    };
    if phrase.trim().is_empty() {
        return None;
    }
    Some(phrase.to_lowercase())
}
